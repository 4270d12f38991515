//! Pipeline configuration management for `assetline.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── paths      # [paths]
//! │   └── serve      # [serve]
//! ├── types/         # Utility types
//! │   └── error      # ConfigError
//! └── mod.rs         # PipelineConfig (this file)
//! ```
//!
//! The config file is optional. Without it, every key falls back to the
//! built-in layout (`app` -> `dist` / `ProdBuild`).

pub mod section;
pub mod types;

pub use section::{PathsConfig, ServeConfig};
pub use types::ConfigError;

use crate::cli::{Cli, Commands};
use crate::utils::path::normalize_path;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::Path,
};

/// Root configuration structure representing assetline.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Source tree and output roots
    pub paths: PathsConfig,

    /// Development server settings
    pub serve: ServeConfig,
}

impl PipelineConfig {
    /// Load configuration for the given CLI invocation.
    ///
    /// The project root is `--root` or the current directory. A missing
    /// config file is not an error.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;
        let root = match &cli.root {
            Some(root) if root.is_absolute() => root.clone(),
            Some(root) => cwd.join(root),
            None => cwd,
        };
        let root = normalize_path(&root);
        let config_path = if cli.config.is_absolute() {
            cli.config.clone()
        } else {
            root.join(&cli.config)
        };

        let mut config = if config_path.is_file() {
            Self::from_path(&config_path)?
        } else {
            crate::debug!("config"; "{} not found, using defaults", config_path.display());
            Self::default()
        };

        config.paths.set_root(&root);
        config.apply_command_options(cli);
        config.validate()?;

        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// Load configuration from file path.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Apply command-specific overrides.
    fn apply_command_options(&mut self, cli: &Cli) {
        match &cli.command {
            Commands::Dev { serve } | Commands::Server { serve } => {
                if let Some(interface) = serve.interface {
                    self.serve.interface = interface;
                }
                if let Some(port) = serve.port {
                    self.serve.port = port;
                }
            }
            _ => {}
        }
    }

    /// Reject layouts where one output root would clobber another or the sources.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let paths = &self.paths;
        let staging = paths.staging_dir();
        let production = paths.production_dir();
        let source = paths.source_dir();

        if staging == production {
            return Err(ConfigError::Validation(format!(
                "`paths.staging` and `paths.production` must differ (both `{}`)",
                paths.staging.display()
            )));
        }
        for (key, output) in [("paths.staging", &staging), ("paths.production", &production)] {
            if *output == source || source.starts_with(output) {
                return Err(ConfigError::Validation(format!(
                    "`{key}` must not contain the source tree `{}`",
                    paths.source.display()
                )));
            }
        }
        Ok(())
    }
}

/// Parse a config snippet in tests.
#[cfg(test)]
pub fn test_parse_config(content: &str) -> PipelineConfig {
    PipelineConfig::from_str(content).expect("config should parse")
}
