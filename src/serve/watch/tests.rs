use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rustc_hash::FxHashMap;
use tempfile::TempDir;

use super::debouncer::{ChangeKind, DEBOUNCE_MS, Debouncer, is_temp_file};
use super::*;
use crate::utils::path::normalize_path;

fn make_paths() -> (TempDir, PathsConfig) {
    let temp = TempDir::new().unwrap();
    let root = normalize_path(temp.path());
    let mut paths = PathsConfig::default();
    paths.set_root(&root);
    fs::create_dir_all(paths.source_dir()).unwrap();
    (temp, paths)
}

fn make_event(paths: Vec<&str>, kind: notify::EventKind) -> notify::Event {
    notify::Event {
        kind,
        paths: paths.into_iter().map(PathBuf::from).collect(),
        attrs: Default::default(),
    }
}

fn modify_kind() -> notify::EventKind {
    notify::EventKind::Modify(notify::event::ModifyKind::Data(
        notify::event::DataChange::Any,
    ))
}

fn create_kind() -> notify::EventKind {
    notify::EventKind::Create(notify::event::CreateKind::File)
}

fn remove_kind() -> notify::EventKind {
    notify::EventKind::Remove(notify::event::RemoveKind::File)
}

#[test]
fn test_debouncer_empty() {
    let debouncer = Debouncer::new();
    assert!(!debouncer.is_ready());
}

#[test]
fn test_metadata_ignored() {
    let mut debouncer = Debouncer::new();
    let kind = notify::EventKind::Modify(notify::event::ModifyKind::Metadata(
        notify::event::MetadataKind::WriteTime,
    ));
    debouncer.add_event(&make_event(vec!["/tmp/a.scss"], kind));
    assert!(debouncer.changes.is_empty());
    assert!(debouncer.last_event.is_none());
}

#[test]
fn test_temp_file_ignored() {
    let mut debouncer = Debouncer::new();
    debouncer.add_event(&make_event(vec!["/tmp/real.html"], modify_kind()));
    let first_time = debouncer.last_event.unwrap();

    std::thread::sleep(Duration::from_millis(5));
    debouncer.add_event(&make_event(vec!["/tmp/.index.html.swp"], modify_kind()));
    assert_eq!(debouncer.last_event.unwrap(), first_time);
    assert_eq!(debouncer.changes.len(), 1);

    assert!(is_temp_file(Path::new("main.scss~")));
    assert!(is_temp_file(Path::new("a.js.tmp")));
    assert!(!is_temp_file(Path::new("a.js")));
}

#[test]
fn test_dedup_rules() {
    let mut debouncer = Debouncer::new();

    debouncer.add_event(&make_event(vec!["/tmp/a.js"], create_kind()));
    debouncer.add_event(&make_event(vec!["/tmp/a.js"], modify_kind()));
    assert_eq!(debouncer.changes[&PathBuf::from("/tmp/a.js")], ChangeKind::Created);

    debouncer.add_event(&make_event(vec!["/tmp/b.js"], modify_kind()));
    debouncer.add_event(&make_event(vec!["/tmp/b.js"], remove_kind()));
    assert_eq!(debouncer.changes[&PathBuf::from("/tmp/b.js")], ChangeKind::Removed);

    debouncer.add_event(&make_event(vec!["/tmp/b.js"], create_kind()));
    assert_eq!(debouncer.changes[&PathBuf::from("/tmp/b.js")], ChangeKind::Created);

    debouncer.add_event(&make_event(vec!["/tmp/a.js"], remove_kind()));
    assert!(!debouncer.changes.contains_key(&PathBuf::from("/tmp/a.js")));
}

#[test]
fn test_ready_after_window() {
    let mut debouncer = Debouncer::new();
    debouncer.add_event(&make_event(vec!["/tmp/a.css"], modify_kind()));
    assert!(debouncer.take_if_ready().is_none());
    assert!(debouncer.sleep_duration() <= Duration::from_millis(DEBOUNCE_MS));

    std::thread::sleep(Duration::from_millis(DEBOUNCE_MS + 20));
    let batch = debouncer.take_if_ready().unwrap();
    assert_eq!(batch.len(), 1);
    assert!(debouncer.changes.is_empty());
    assert!(!debouncer.is_ready());
}

#[test]
fn test_cancelled_batch_goes_idle() {
    let mut debouncer = Debouncer::new();
    debouncer.add_event(&make_event(vec!["/tmp/scratch.js"], create_kind()));
    debouncer.add_event(&make_event(vec!["/tmp/scratch.js"], remove_kind()));

    assert!(debouncer.changes.is_empty());
    assert!(debouncer.last_event.is_none());
    assert!(debouncer.sleep_duration() > Duration::from_secs(1));

    // other pending changes keep the window open
    debouncer.add_event(&make_event(vec!["/tmp/kept.css"], modify_kind()));
    debouncer.add_event(&make_event(vec!["/tmp/scratch.js"], create_kind()));
    debouncer.add_event(&make_event(vec!["/tmp/scratch.js"], remove_kind()));
    assert!(debouncer.last_event.is_some());

    std::thread::sleep(Duration::from_millis(DEBOUNCE_MS + 20));
    assert_eq!(debouncer.take_if_ready().unwrap().len(), 1);
    assert!(debouncer.sleep_duration() > Duration::from_secs(1));
}

#[test]
fn test_watch_roots_without_source_dir() {
    let temp = TempDir::new().unwrap();
    let root = normalize_path(temp.path());
    let mut paths = PathsConfig::default();
    paths.set_root(&root);

    assert_eq!(watch_roots(&paths).unwrap(), [root.clone()]);

    fs::create_dir_all(paths.source_dir()).unwrap();
    assert_eq!(watch_roots(&paths).unwrap(), [paths.source_dir()]);
}

#[test]
fn test_affected_classes_once_in_order() {
    let (_temp, paths) = make_paths();
    let src = paths.source_dir();

    let mut changes = FxHashMap::default();
    for rel in [
        "img/b.png",
        "js/a.js",
        "index.html",
        "link_templates/nav.html",
        "js/b.js",
        "README.md",
    ] {
        changes.insert(src.join(rel), ChangeKind::Modified);
    }

    let classes: Vec<_> = affected_classes(&changes, &paths).into_iter().collect();
    assert_eq!(
        classes,
        [AssetClass::Markup, AssetClass::Script, AssetClass::Image]
    );
}

#[test]
fn test_rerun_writes_and_reports() {
    let (_temp, paths) = make_paths();
    fs::create_dir_all(paths.source_dir().join("css")).unwrap();
    fs::write(paths.source_dir().join("css/a.css"), ".a{}").unwrap();
    let ctx = TaskContext::new(&paths, BuildProfile::Soft);

    let classes = BTreeSet::from([AssetClass::Css]);
    assert_eq!(rerun(&classes, &ctx).as_deref(), Some("css"));
    assert!(paths.staging_dir().join("css/a.css").is_file());

    assert_eq!(rerun(&BTreeSet::new(), &ctx), None);
}

#[test]
fn test_rerun_survives_failure() {
    let (_temp, paths) = make_paths();
    fs::create_dir_all(paths.source_dir().join("js")).unwrap();
    fs::write(paths.source_dir().join("index.html"), "@@include('gone.html')").unwrap();
    fs::write(paths.source_dir().join("js/a.js"), "var a;").unwrap();
    let ctx = TaskContext::new(&paths, BuildProfile::Soft);

    let classes = BTreeSet::from([AssetClass::Markup, AssetClass::Script]);
    assert_eq!(rerun(&classes, &ctx).as_deref(), Some("html,js"));
    assert!(paths.staging_dir().join("js/a.js").is_file());
    assert!(!paths.staging_dir().join("index.html").exists());

    let only_failing = BTreeSet::from([AssetClass::Markup]);
    assert_eq!(rerun(&only_failing, &ctx), None);
}

#[test]
fn test_missing_source_dir_is_an_error() {
    let temp = TempDir::new().unwrap();
    let mut paths = PathsConfig::default();
    paths.set_root(temp.path());
    let err = watch_roots(&paths).unwrap_err();
    assert!(err.to_string().contains("not found"));
}

#[test]
fn test_external_fragment_dir_watched() {
    let (_temp, mut paths) = make_paths();
    let (_other, other_paths) = make_paths();
    paths.fragments = other_paths.source_dir();
    let roots = watch_roots(&paths).unwrap();
    assert_eq!(roots, [paths.source_dir(), other_paths.source_dir()]);
}
