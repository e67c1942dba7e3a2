//! Logging initialization.
//!
//! Uses the `tracing` ecosystem with either human-readable or JSON output.
//! Everything goes to stderr; stdout is reserved for reports.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the logging subsystem.
///
/// `level` is the default filter directive; the RUST_LOG environment
/// variable overrides it when set.
pub fn init(level: &str, json_format: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .with_ansi(true),
            )
            .init();
    }
}

/// Resolve the effective level from config and the `--verbose` flag.
pub fn effective_level(config: &prism_core::Config, verbose: bool) -> &str {
    if verbose && !matches!(config.logging.level.as_str(), "debug" | "trace") {
        "debug"
    } else {
        &config.logging.level
    }
}

/// Initialize logging with settings from the Prism configuration.
pub fn init_from_config(
    config: &prism_core::Config,
    verbose_override: bool,
    json_logs_override: bool,
) {
    let json_format = json_logs_override || config.logging.format == "json";
    init(effective_level(config, verbose_override), json_format);
}

#[cfg(test)]
mod tests {
    use super::*;
    use prism_core::Config;

    #[test]
    fn test_verbose_raises_to_debug() {
        let config = Config::default();
        assert_eq!(effective_level(&config, false), "info");
        assert_eq!(effective_level(&config, true), "debug");
    }

    #[test]
    fn test_verbose_keeps_trace() {
        let mut config = Config::default();
        config.logging.level = "trace".to_string();
        assert_eq!(effective_level(&config, true), "trace");
    }
}
