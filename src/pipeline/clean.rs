//! Removal of the previous build output for one profile.

use std::fs;
use std::io;
use std::path::Path;

use anyhow::{Context, Result};

use crate::asset::{AssetClass, pattern::has_ext};

/// Delete `<root>/*.html` and everything under each class subdirectory.
///
/// The subdirectories themselves stay. Missing paths are skipped, so
/// running this twice is the same as running it once.
pub fn clean_output(root: &Path) -> Result<usize> {
    let mut removed = 0;

    for entry in read_dir_if_exists(root)? {
        let path = entry.path();
        if entry.file_type()?.is_file() && has_ext(&path, "html") {
            remove(&path, false)?;
            removed += 1;
        }
    }

    let mut subdirs: Vec<_> = AssetClass::ALL
        .iter()
        .filter_map(|class| class.output_subdir())
        .collect();
    subdirs.dedup();

    for subdir in subdirs {
        for entry in read_dir_if_exists(&root.join(subdir))? {
            remove(&entry.path(), entry.file_type()?.is_dir())?;
            removed += 1;
        }
    }

    Ok(removed)
}

fn read_dir_if_exists(dir: &Path) -> Result<Vec<fs::DirEntry>> {
    match fs::read_dir(dir) {
        Ok(entries) => entries
            .collect::<io::Result<Vec<_>>>()
            .with_context(|| format!("failed to list {}", dir.display())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(e).with_context(|| format!("failed to list {}", dir.display())),
    }
}

fn remove(path: &Path, is_dir: bool) -> Result<()> {
    let result = if is_dir {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    match result {
        Err(e) if e.kind() != io::ErrorKind::NotFound => {
            Err(e).with_context(|| format!("failed to remove {}", path.display()))
        }
        _ => Ok(()),
    }
}
