//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.coordinator.workers == 0 {
            return Err(ConfigError::ValidationError(
                "coordinator.workers must be > 0".into(),
            ));
        }
        if self.transform.blur_kernel_size == 0 {
            return Err(ConfigError::ValidationError(
                "transform.blur_kernel_size must be > 0".into(),
            ));
        }
        if self.batch.file_prefix.is_empty() {
            return Err(ConfigError::ValidationError(
                "batch.file_prefix must not be empty".into(),
            ));
        }
        if self.batch.extension.is_empty() {
            return Err(ConfigError::ValidationError(
                "batch.extension must not be empty".into(),
            ));
        }
        self.metrics_format()?;
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(ConfigError::ValidationError(
                "logging.format must be \"pretty\" or \"json\"".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_passes_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_workers() {
        let mut config = Config::default();
        config.coordinator.workers = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("coordinator.workers"));
    }

    #[test]
    fn test_validate_rejects_zero_kernel() {
        let mut config = Config::default();
        config.transform.blur_kernel_size = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("blur_kernel_size"));
    }

    #[test]
    fn test_validate_accepts_empty_batch() {
        let mut config = Config::default();
        config.batch.num_images = 0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_unknown_formats() {
        let mut config = Config::default();
        config.metrics.format = "csv".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("metrics.format"));

        let mut config = Config::default();
        config.logging.format = "xml".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("logging.format"));
    }

    #[test]
    fn test_validate_rejects_empty_extension() {
        let mut config = Config::default();
        config.batch.extension.clear();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("batch.extension"));
    }
}
