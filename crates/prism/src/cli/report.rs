//! The `prism report` command: aggregate an existing metrics file.

use anyhow::Context;
use clap::Args;
use prism_core::metrics::read_records;
use prism_core::{Config, MetricsSummary};
use std::path::PathBuf;

/// Arguments for the `report` command.
#[derive(Args, Debug, Default)]
pub struct ReportArgs {
    /// Metrics file to read (defaults to the configured path)
    #[arg(short, long)]
    pub metrics: Option<PathBuf>,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,
}

/// Execute the report command.
pub async fn execute(args: ReportArgs, config: Config) -> anyhow::Result<()> {
    let path = args.metrics.unwrap_or_else(|| config.metrics_path());
    let summary = summarize(&path)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("Metrics file:   {}", path.display());
    println!("Images:         {}", summary.images);
    println!("Bytes read:     {}", summary.bytes_read);
    println!("Bytes written:  {}", summary.bytes_written);
    if let Some(last) = &summary.last {
        println!("Last image:     {}", last.image);
    }
    Ok(())
}

fn summarize(path: &std::path::Path) -> anyhow::Result<MetricsSummary> {
    let records = read_records(path)
        .with_context(|| format!("Failed to read metrics file {:?}", path))?;
    tracing::debug!("Read {} metrics records from {:?}", records.len(), path);
    Ok(MetricsSummary::from_records(&records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use prism_core::{MetricsFormat, MetricsRecord, MetricsSink};

    #[test]
    fn test_summarize_text_metrics() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metrics_rank.txt");
        let sink = MetricsSink::open(&path, MetricsFormat::Text).unwrap();
        for (i, name) in ["imagen_001.bmp", "imagen_002.bmp"].iter().enumerate() {
            sink.append(&MetricsRecord {
                image: name.to_string(),
                bytes_read: 100 * (i as u64 + 1),
                bytes_written: 600 * (i as u64 + 1),
            })
            .unwrap();
        }

        let summary = summarize(&path).unwrap();
        assert_eq!(summary.images, 2);
        assert_eq!(summary.bytes_read, 300);
        assert_eq!(summary.bytes_written, 1800);
        assert_eq!(summary.last.unwrap().image, "imagen_002.bmp");
    }

    #[test]
    fn test_missing_metrics_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(summarize(&dir.path().join("absent.txt")).is_err());
    }
}
