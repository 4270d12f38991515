//! Build profile selection and output routing.

use std::path::PathBuf;

use crate::config::PathsConfig;

/// Build profile, fixed once per invocation.
///
/// - `Soft`: development chains, output to the staging root
/// - `Hard`: production chains (prefix, minify, bundle), output to the production root
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BuildProfile {
    #[default]
    Soft,
    Hard,
}

impl BuildProfile {
    /// Resolve the profile from the `--hard` flag. Absence means `Soft`.
    #[inline]
    pub const fn from_flag(hard: bool) -> Self {
        if hard { Self::Hard } else { Self::Soft }
    }

    #[inline]
    pub const fn is_hard(self) -> bool {
        matches!(self, Self::Hard)
    }

    /// Label used in log lines.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Soft => "soft",
            Self::Hard => "hard",
        }
    }

    /// Output root for this profile.
    pub fn output_root(self, paths: &PathsConfig) -> PathBuf {
        match self {
            Self::Soft => paths.staging_dir(),
            Self::Hard => paths.production_dir(),
        }
    }
}

impl std::fmt::Display for BuildProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
