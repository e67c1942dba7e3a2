//! Sub-configuration structs with defaults matching the reference batch.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Batch layout: how many images, where they live, where outputs go.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Number of images in the batch (ordinals `1..=num_images`)
    pub num_images: u32,

    /// Directory holding `<prefix>_<ordinal:03>.<extension>` inputs
    pub input_dir: PathBuf,

    /// Directory under which `imagen_transform/` is created
    pub output_root: PathBuf,

    /// File name prefix shared by inputs and outputs
    pub file_prefix: String,

    /// File extension shared by inputs and outputs
    pub extension: String,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            num_images: 100,
            input_dir: PathBuf::from("./imagenes_bmp"),
            output_root: PathBuf::from("."),
            file_prefix: "imagen".to_string(),
            extension: "bmp".to_string(),
        }
    }
}

/// Transform settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    /// Box blur kernel width in pixels (radius = kernel / 2)
    pub blur_kernel_size: u32,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            blur_kernel_size: 55,
        }
    }
}

/// Coordinator/worker topology.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// Number of worker tasks pulling images from the coordinator
    pub workers: usize,

    /// Host identity reported in diagnostics (empty = detect)
    pub node_name: String,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            node_name: String::new(),
        }
    }
}

impl CoordinatorConfig {
    /// Resolve the node name, falling back to `$HOSTNAME` and then `localhost`.
    pub fn resolved_node_name(&self) -> String {
        if !self.node_name.is_empty() {
            return self.node_name.clone();
        }
        std::env::var("HOSTNAME")
            .ok()
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| "localhost".to_string())
    }
}

/// Metrics sink settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Append-only metrics file
    pub path: PathBuf,

    /// Record format: "text" or "jsonl"
    pub format: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("metrics_rank.txt"),
            format: "text".to_string(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_node_name_wins() {
        let config = CoordinatorConfig {
            workers: 2,
            node_name: "pc2".to_string(),
        };
        assert_eq!(config.resolved_node_name(), "pc2");
    }

    #[test]
    fn test_detected_node_name_is_never_empty() {
        let config = CoordinatorConfig::default();
        assert!(!config.resolved_node_name().is_empty());
    }
}
