//! The generic read-transform-write routine shared by every asset task.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

use super::step::Asset;
use super::table::steps_for;
use crate::asset::AssetClass;
use crate::config::PathsConfig;
use crate::core::BuildProfile;

/// Everything a task needs to know about the current invocation.
#[derive(Debug, Clone, Copy)]
pub struct TaskContext<'a> {
    pub paths: &'a PathsConfig,
    pub profile: BuildProfile,
}

impl<'a> TaskContext<'a> {
    pub const fn new(paths: &'a PathsConfig, profile: BuildProfile) -> Self {
        Self { paths, profile }
    }

    pub fn output_root(&self) -> PathBuf {
        self.profile.output_root(self.paths)
    }
}

/// Run one class's task: list sources, apply its steps, write the results.
///
/// Returns the number of files written.
pub fn run_asset_task(class: AssetClass, ctx: &TaskContext) -> Result<usize> {
    let sources = class
        .collect_sources(ctx.paths)
        .with_context(|| format!("{class}: failed to list sources"))?;
    if sources.is_empty() {
        crate::debug!(class.name(); "no files match {}", source_globs(class, ctx.paths));
        return Ok(0);
    }

    let mut assets = sources
        .iter()
        .map(|path| Asset::read(path))
        .collect::<Result<Vec<_>>>()?;
    for step in steps_for(class, ctx.profile) {
        assets = step
            .apply(assets)
            .with_context(|| format!("{class} task failed"))?;
    }

    let out_dir = class.output_dir(&ctx.output_root());
    fs::create_dir_all(&out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;
    for asset in &assets {
        let dest = out_dir.join(&asset.name);
        fs::write(&dest, &asset.contents)
            .with_context(|| format!("failed to write {}", dest.display()))?;
        crate::debug!(class.name(); "{} -> {}", ctx.paths.relative(&asset.source).display(), ctx.paths.relative(&dest).display());
    }
    Ok(assets.len())
}

fn source_globs(class: AssetClass, paths: &PathsConfig) -> String {
    class
        .source_patterns()
        .iter()
        .map(|pattern| pattern.glob(paths))
        .collect::<Vec<_>>()
        .join(", ")
}
