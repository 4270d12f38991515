//! `[paths]` section configuration.
//!
//! Project layout, all relative to the project root.
//!
//! # Example
//!
//! ```toml
//! [paths]
//! source = "app"                    # Source tree
//! fragments = "app/link_templates"  # Markup fragments pulled in by @@include
//! staging = "dist"                  # Output root for soft builds (served by dev)
//! production = "ProdBuild"          # Output root for hard builds
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Source and output layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    /// Project root (internal use only).
    #[serde(skip)]
    root: PathBuf,

    /// Source tree.
    pub source: PathBuf,

    /// Markup fragment directory. Watched so edits to fragments rebuild markup.
    pub fragments: PathBuf,

    /// Staging output root (soft profile).
    pub staging: PathBuf,

    /// Production output root (hard profile).
    pub production: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::new(),
            source: "app".into(),
            fragments: "app/link_templates".into(),
            staging: "dist".into(),
            production: "ProdBuild".into(),
        }
    }
}

impl PathsConfig {
    pub fn set_root(&mut self, root: &Path) {
        self.root = root.to_path_buf();
    }

    pub fn source_dir(&self) -> PathBuf {
        self.root.join(&self.source)
    }

    pub fn fragments_dir(&self) -> PathBuf {
        self.root.join(&self.fragments)
    }

    pub fn staging_dir(&self) -> PathBuf {
        self.root.join(&self.staging)
    }

    pub fn production_dir(&self) -> PathBuf {
        self.root.join(&self.production)
    }

    /// Path relative to the project root, for log lines.
    pub fn relative<'a>(&self, path: &'a Path) -> &'a Path {
        path.strip_prefix(&self.root).unwrap_or(path)
    }
}
