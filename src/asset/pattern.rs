//! Source patterns: a directory plus one file extension.
//!
//! Patterns are single-level (`app/img/*.jpg`), matching what the source
//! layout expects. Extension matching ignores ASCII case.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::PathsConfig;

/// Directory a pattern is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternBase {
    /// Subdirectory of the source tree (`""` is the source root itself).
    Source(&'static str),
    /// The markup fragment directory.
    Fragments,
}

/// `<base>/*.<ext>`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourcePattern {
    pub base: PatternBase,
    pub ext: &'static str,
}

impl SourcePattern {
    pub const fn source(subdir: &'static str, ext: &'static str) -> Self {
        Self {
            base: PatternBase::Source(subdir),
            ext,
        }
    }

    pub const fn fragments(ext: &'static str) -> Self {
        Self {
            base: PatternBase::Fragments,
            ext,
        }
    }

    /// Absolute directory this pattern lists.
    pub fn dir(&self, paths: &PathsConfig) -> PathBuf {
        match self.base {
            PatternBase::Source("") => paths.source_dir(),
            PatternBase::Source(subdir) => paths.source_dir().join(subdir),
            PatternBase::Fragments => paths.fragments_dir(),
        }
    }

    /// Glob-style rendering for logs, relative to the project root.
    pub fn glob(&self, paths: &PathsConfig) -> String {
        let dir = self.dir(paths);
        let dir = paths.relative(&dir);
        format!("{}/*.{}", dir.display(), self.ext)
    }

    /// Check whether `path` is a direct child of the pattern directory with
    /// a matching extension.
    pub fn matches(&self, path: &Path, paths: &PathsConfig) -> bool {
        has_ext(path, self.ext) && path.parent() == Some(self.dir(paths).as_path())
    }

    /// List matching files, sorted by file name. A missing directory is no match.
    pub fn collect(&self, paths: &PathsConfig) -> io::Result<Vec<PathBuf>> {
        let dir = self.dir(paths);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            if entry.file_type()?.is_file() && has_ext(&path, self.ext) {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}

/// ASCII case-insensitive extension check.
pub fn has_ext(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}
