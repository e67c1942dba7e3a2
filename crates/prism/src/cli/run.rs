//! The `prism run` command: one batch session with a live progress bar.

use anyhow::Context;
use clap::Args;
use prism_core::{
    Config, Inventory, MetricsSink, ProgressEvent, Session, SessionOptions, SessionReport,
    WorkerPipeline,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Arguments for the `run` command. Every flag overrides the config file.
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Directory holding the numbered input images
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Root under which `imagen_transform/` is created
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Number of workers
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Number of images in the batch
    #[arg(short = 'n', long)]
    pub images: Option<u32>,

    /// Blur kernel size
    #[arg(short, long)]
    pub kernel_size: Option<u32>,

    /// Metrics file to append to
    #[arg(long)]
    pub metrics: Option<PathBuf>,

    /// Metrics record format: text or jsonl
    #[arg(long)]
    pub metrics_format: Option<String>,

    /// Node name reported in diagnostics
    #[arg(long, env = "PRISM_NODE")]
    pub node: Option<String>,

    /// Disable the progress bar
    #[arg(long)]
    pub no_progress: bool,

    /// Print the session report as JSON instead of a summary table
    #[arg(long)]
    pub json: bool,
}

fn apply_overrides(args: &RunArgs, config: &mut Config) {
    if let Some(input) = &args.input {
        config.batch.input_dir = input.clone();
    }
    if let Some(output) = &args.output {
        config.batch.output_root = output.clone();
    }
    if let Some(workers) = args.workers {
        config.coordinator.workers = workers;
    }
    if let Some(images) = args.images {
        config.batch.num_images = images;
    }
    if let Some(kernel_size) = args.kernel_size {
        config.transform.blur_kernel_size = kernel_size;
    }
    if let Some(metrics) = &args.metrics {
        config.metrics.path = metrics.clone();
    }
    if let Some(format) = &args.metrics_format {
        config.metrics.format = format.clone();
    }
    if let Some(node) = &args.node {
        config.coordinator.node_name = node.clone();
    }
}

/// Execute the run command.
pub async fn execute(args: RunArgs, mut config: Config) -> anyhow::Result<()> {
    apply_overrides(&args, &mut config);
    config.validate()?;

    let layout = config.layout();
    let num_images = config.batch.num_images;
    let inventory = Inventory::scan(&layout, num_images);
    if inventory.present.is_empty() {
        tracing::warn!("No input images found in {:?}", layout.input_dir());
    } else {
        tracing::info!(
            "Found {} of {} input image(s) ({:.1} MB)",
            inventory.present.len(),
            inventory.len(),
            inventory.total_bytes as f64 / 1_000_000.0
        );
    }
    if !inventory.missing.is_empty() {
        let missing: Vec<String> = inventory.missing.iter().map(|i| i.to_string()).collect();
        tracing::debug!("Missing inputs: {}", missing.join(", "));
    }

    let metrics_path = config.metrics_path();
    let sink = MetricsSink::open(&metrics_path, config.metrics_format()?)
        .with_context(|| format!("Failed to open metrics file {:?}", metrics_path))?;
    let pipeline = WorkerPipeline::new(
        layout,
        config.transform.blur_kernel_size,
        Arc::new(sink),
    );

    let options = SessionOptions {
        workers: config.coordinator.workers,
        num_images,
        node: config.coordinator.resolved_node_name(),
    };
    tracing::info!(
        "Distributing {} images across {} workers on {}",
        options.num_images,
        options.workers,
        options.node
    );

    let progress = if args.no_progress || args.json {
        indicatif::ProgressBar::hidden()
    } else {
        create_progress_bar(u64::from(num_images))
    };
    let report = Session::new(Arc::new(pipeline), options)
        .run(progress_callback(progress.clone()))
        .await?;
    progress.finish_and_clear();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report, &metrics_path);
    }

    Ok(())
}

/// Advance the bar once per image and show combined MB/s.
fn progress_callback(
    progress: indicatif::ProgressBar,
) -> impl Fn(ProgressEvent) + Send + Sync + 'static {
    let bytes = Arc::new(AtomicU64::new(0));
    move |event| {
        if let ProgressEvent::Completed { outcome, .. } = &event {
            bytes.fetch_add(
                outcome.record.bytes_read + outcome.record.bytes_written,
                Ordering::Relaxed,
            );
        }
        progress.inc(1);

        let elapsed = progress.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            let mb = bytes.load(Ordering::Relaxed) as f64 / 1_000_000.0;
            progress.set_message(format!("{:.1} MB/sec", mb / elapsed));
        }
    }
}

/// Create a progress bar for the session.
fn create_progress_bar(total: u64) -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");
    pb.set_style(style);
    pb.set_message("starting...");
    pb
}

/// Print a formatted summary table after the session.
fn print_summary(report: &SessionReport, metrics_path: &Path) {
    eprintln!();
    eprintln!("  ====================================");
    eprintln!("               Summary");
    eprintln!("  ====================================");
    eprintln!("    Completed:    {:>8}", report.completed);
    if report.skipped > 0 {
        eprintln!("    Skipped:      {:>8}", report.skipped);
    }
    eprintln!("  ------------------------------------");
    for worker in &report.workers {
        eprintln!(
            "    Worker {:<3}   {:>8} images",
            worker.worker, worker.completed
        );
    }
    eprintln!("  ------------------------------------");
    eprintln!("    Read:         {:>7.1} MB", report.bytes_read as f64 / 1_000_000.0);
    eprintln!(
        "    Written:      {:>7.1} MB",
        report.bytes_written as f64 / 1_000_000.0
    );
    eprintln!("    Duration:     {:>7.2}s", report.elapsed_secs);
    eprintln!("    Throughput:   {:>7.1} MB/sec", report.throughput_mb_s());
    eprintln!("  ====================================");
    eprintln!("    Metrics:      {}", metrics_path.display());
}
