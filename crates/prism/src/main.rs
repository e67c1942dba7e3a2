//! Prism CLI - batch raster transforms with dynamic work distribution.
//!
//! Prism reads a numbered batch of images, hands them out to a pool of
//! workers on demand, writes six transformed variants per image and appends
//! one throughput record per image to a metrics file.
//!
//! # Usage
//!
//! ```bash
//! # Process the default batch of 100 images with 4 workers
//! prism run
//!
//! # Custom batch
//! prism run --input ./imagenes_bmp --workers 8 --images 20 --kernel-size 15
//!
//! # Summarize an existing metrics file
//! prism report
//!
//! # View configuration
//! prism config show
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// Prism - batch raster transforms with dynamic work distribution.
#[derive(Parser, Debug)]
#[command(name = "prism")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one batch session
    Run(cli::run::RunArgs),

    /// Summarize a metrics file
    Report(cli::report::ReportArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so config warnings go through eprintln.
    let config = match prism_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `prism config path`."
            );
            prism_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Prism v{}", prism_core::VERSION);

    match cli.command {
        Commands::Run(args) => cli::run::execute(args, config).await,
        Commands::Report(args) => cli::report::execute(args, config).await,
        Commands::Config(args) => cli::config::execute(args).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run_overrides() {
        let cli = Cli::try_parse_from([
            "prism",
            "--verbose",
            "run",
            "--workers",
            "8",
            "--images",
            "20",
            "--metrics-format",
            "jsonl",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.workers, Some(8));
                assert_eq!(args.images, Some(20));
                assert_eq!(args.metrics_format.as_deref(), Some("jsonl"));
                assert!(args.kernel_size.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
