//! Source watcher: debounced notify events -> asset tasks -> reload.
//!
//! ```text
//! notify → Debouncer (timing + dedup) → AssetClass::for_changed_path → Task::run → ReloadHub
//! ```
//!
//! One thread runs every task, so task runs never overlap.

mod debouncer;

#[cfg(test)]
mod tests;

use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use crossbeam::channel::{self, Receiver};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use rustc_hash::FxHashMap;

use super::reload::{ReloadHub, ReloadMessage};
use crate::asset::AssetClass;
use crate::config::PathsConfig;
use crate::core::BuildProfile;
use crate::logger::{status_detach, status_error, status_success};
use crate::pipeline::{Task, TaskContext};
use crate::{debug, log};
use debouncer::{ChangeKind, Debouncer};

/// A live notify watcher over the source tree.
///
/// Created before the request loop starts so no edit is missed while the
/// server comes up.
pub struct SourceWatcher {
    /// Must stay alive for events to flow
    _watcher: RecommendedWatcher,
    events: Receiver<notify::Result<notify::Event>>,
    paths: PathsConfig,
}

impl SourceWatcher {
    pub fn new(paths: &PathsConfig) -> Result<Self> {
        let (tx, events) = channel::unbounded();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = tx.send(res);
        })?;

        for dir in watch_roots(paths)? {
            watcher
                .watch(&dir, RecursiveMode::Recursive)
                .with_context(|| format!("failed to watch {}", dir.display()))?;
            debug!("watch"; "watching {}", paths.relative(&dir).display());
        }

        Ok(Self {
            _watcher: watcher,
            events,
            paths: paths.clone(),
        })
    }

    /// Block until `shutdown` fires, re-running tasks for each debounced batch.
    pub fn run(self, hub: &ReloadHub, shutdown: &Receiver<()>) {
        let ctx = TaskContext::new(&self.paths, BuildProfile::Soft);
        let mut debouncer = Debouncer::new();

        loop {
            channel::select! {
                recv(shutdown) -> _ => break,
                recv(self.events) -> msg => match msg {
                    Ok(Ok(event)) => debouncer.add_event(&event),
                    Ok(Err(e)) => {
                        log!("watch"; "error: {}", e);
                        status_detach();
                    }
                    Err(_) => break,
                },
                default(debouncer.sleep_duration()) => {}
            }

            if let Some(changes) = debouncer.take_if_ready() {
                let classes = affected_classes(&changes, &self.paths);
                if let Some(reason) = rerun(&classes, &ctx) {
                    hub.broadcast(&ReloadMessage::reload(reason));
                }
            }
        }
        debug!("watch"; "stopped");
    }
}

/// The source dir, plus the fragment dir when it lives elsewhere.
///
/// A missing source dir is not fatal: its nearest existing ancestor is
/// watched instead, so sources created later are still picked up.
fn watch_roots(paths: &PathsConfig) -> Result<Vec<PathBuf>> {
    let source = paths.source_dir();
    if !source.is_dir() {
        let Some(ancestor) = source.ancestors().skip(1).find(|dir| dir.is_dir()) else {
            bail!("no existing directory above `{}` to watch", source.display());
        };
        log!("watch"; "source directory `{}` not found, watching `{}`",
            paths.relative(&source).display(), ancestor.display());
        return Ok(vec![ancestor.to_path_buf()]);
    }

    let mut roots = vec![source];
    let fragments = paths.fragments_dir();
    if fragments.is_dir() && !fragments.starts_with(&roots[0]) {
        roots.push(fragments);
    }
    Ok(roots)
}

/// Classes to re-run for a batch, each once, in build order.
fn affected_classes(
    changes: &FxHashMap<PathBuf, ChangeKind>,
    paths: &PathsConfig,
) -> BTreeSet<AssetClass> {
    changes
        .keys()
        .flat_map(|path| AssetClass::for_changed_path(path, paths))
        .collect()
}

/// Run each class's task once. Returns the reload reason when anything ran.
///
/// Failures are shown on the status line; the watcher keeps going.
fn rerun(classes: &BTreeSet<AssetClass>, ctx: &TaskContext) -> Option<String> {
    if classes.is_empty() {
        return None;
    }

    let mut done = Vec::new();
    let mut failed = false;
    for &class in classes {
        match Task::Asset(class).run(ctx) {
            Ok(files) => done.push(format!("{class} ({files})")),
            Err(e) => {
                failed = true;
                status_error(&format!("{class} failed"), &format!("{e:#}"));
            }
        }
    }

    if done.is_empty() {
        return None;
    }
    if !failed {
        status_success(&format!("rebuilt {}", done.join(", ")));
    }
    Some(
        classes
            .iter()
            .map(|class| class.name())
            .collect::<Vec<_>>()
            .join(","),
    )
}
