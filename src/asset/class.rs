//! Asset classes: what each task reads and where it writes.

use std::path::{Path, PathBuf};

use super::pattern::{SourcePattern, has_ext};
use crate::config::PathsConfig;

/// A category of source file with its own pattern and transformation chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AssetClass {
    Markup,
    Sass,
    Css,
    Script,
    Image,
}

const MARKUP: &[SourcePattern] = &[SourcePattern::source("", "html")];
const MARKUP_WATCH: &[SourcePattern] = &[
    SourcePattern::source("", "html"),
    SourcePattern::fragments("html"),
];
const SASS: &[SourcePattern] = &[SourcePattern::source("scss", "scss")];
const CSS: &[SourcePattern] = &[SourcePattern::source("css", "css")];
const SCRIPT: &[SourcePattern] = &[SourcePattern::source("js", "js")];

/// Image patterns in priority order. The first [`WEBP_SOURCE_COUNT`] are
/// the raster formats that get an extra WebP copy under the hard profile.
const IMAGE: &[SourcePattern] = &[
    SourcePattern::source("img", "jpg"),
    SourcePattern::source("img", "jpeg"),
    SourcePattern::source("img", "png"),
    SourcePattern::source("img", "jfif"),
    SourcePattern::source("img", "svg"),
    SourcePattern::source("img", "webp"),
    SourcePattern::source("img", "gif"),
];

pub const WEBP_SOURCE_COUNT: usize = 3;

impl AssetClass {
    /// Build order.
    pub const ALL: [Self; 5] = [
        Self::Markup,
        Self::Sass,
        Self::Css,
        Self::Script,
        Self::Image,
    ];

    /// Task name, as exposed on the command line.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Markup => "html",
            Self::Sass => "sass",
            Self::Css => "css",
            Self::Script => "js",
            Self::Image => "img",
        }
    }

    pub const fn source_patterns(self) -> &'static [SourcePattern] {
        match self {
            Self::Markup => MARKUP,
            Self::Sass => SASS,
            Self::Css => CSS,
            Self::Script => SCRIPT,
            Self::Image => IMAGE,
        }
    }

    /// Patterns whose changes re-run this class's task in watch mode.
    pub const fn watch_patterns(self) -> &'static [SourcePattern] {
        match self {
            Self::Markup => MARKUP_WATCH,
            other => other.source_patterns(),
        }
    }

    /// Subdirectory under the output root (`None` = the root itself).
    pub const fn output_subdir(self) -> Option<&'static str> {
        match self {
            Self::Markup => None,
            Self::Sass | Self::Css => Some("css"),
            Self::Script => Some("js"),
            Self::Image => Some("img"),
        }
    }

    pub fn output_dir(self, root: &Path) -> PathBuf {
        match self.output_subdir() {
            Some(sub) => root.join(sub),
            None => root.to_path_buf(),
        }
    }

    /// All matching source files, pattern by pattern, each sorted by name.
    pub fn collect_sources(self, paths: &PathsConfig) -> std::io::Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for pattern in self.source_patterns() {
            files.extend(pattern.collect(paths)?);
        }
        Ok(files)
    }

    /// Classes whose watch patterns match `path`, in build order.
    pub fn for_changed_path(path: &Path, paths: &PathsConfig) -> Vec<Self> {
        Self::ALL
            .into_iter()
            .filter(|class| {
                class
                    .watch_patterns()
                    .iter()
                    .any(|pattern| pattern.matches(path, paths))
            })
            .collect()
    }
}

/// Whether an image file gets an additional WebP conversion.
pub fn is_webp_source(path: &Path) -> bool {
    IMAGE[..WEBP_SOURCE_COUNT]
        .iter()
        .any(|pattern| has_ext(path, pattern.ext))
}

impl std::fmt::Display for AssetClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
