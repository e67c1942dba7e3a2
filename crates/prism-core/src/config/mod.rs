//! Configuration management for Prism.
//!
//! Configuration is loaded from the platform config directory with defaults
//! that reproduce the reference batch: 100 images, blur kernel 55.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use crate::metrics::MetricsFormat;
use crate::pipeline::BatchLayout;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for Prism.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Batch size and file layout
    pub batch: BatchConfig,

    /// Transform parameters
    pub transform: TransformConfig,

    /// Worker topology
    pub coordinator: CoordinatorConfig,

    /// Metrics sink
    pub metrics: MetricsConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories (`~/.config/prism/config.toml` on
    /// Linux). Falls back to `~/.prism/config.toml` if detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "prism", "prism")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".prism").join("config.toml")
            })
    }

    /// Input directory with `~` expanded.
    pub fn input_dir(&self) -> PathBuf {
        expand(&self.batch.input_dir)
    }

    /// Output root with `~` expanded.
    pub fn output_root(&self) -> PathBuf {
        expand(&self.batch.output_root)
    }

    /// Metrics file path with `~` expanded.
    pub fn metrics_path(&self) -> PathBuf {
        expand(&self.metrics.path)
    }

    /// Parsed metrics record format.
    pub fn metrics_format(&self) -> Result<MetricsFormat, ConfigError> {
        MetricsFormat::parse(&self.metrics.format).ok_or_else(|| {
            ConfigError::ValidationError(format!(
                "metrics.format must be \"text\" or \"jsonl\", got {:?}",
                self.metrics.format
            ))
        })
    }

    /// Build the file layout described by the `[batch]` section.
    pub fn layout(&self) -> BatchLayout {
        BatchLayout::new(
            self.input_dir(),
            self.output_root(),
            &self.batch.file_prefix,
            &self.batch.extension,
        )
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

fn expand(path: &Path) -> PathBuf {
    let path_str = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(&path_str).into_owned())
}
