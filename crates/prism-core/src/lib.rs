//! Prism Core - batch raster-image transforms with dynamic work distribution.
//!
//! Every image of a numbered batch is decoded once and turned into six
//! derived variants (grayscale, mirrors and a box blur) that are written next
//! to each other. Images are handed out to a pool of workers on demand, and
//! one throughput record per image is appended to a shared metrics file.
//!
//! # Architecture
//!
//! ```text
//! Coordinator → WorkItem → Decode → 6 × (Kernels → Encode) → MetricsRecord
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use prism_core::{Config, MetricsSink, Session, SessionOptions, WorkerPipeline};
//!
//! #[tokio::main]
//! async fn main() -> prism_core::Result<()> {
//!     let config = Config::load()?;
//!     let sink = MetricsSink::open(&config.metrics_path(), config.metrics_format()?)?;
//!     let pipeline = WorkerPipeline::new(
//!         config.layout(),
//!         config.transform.blur_kernel_size,
//!         Arc::new(sink),
//!     );
//!     let options = SessionOptions {
//!         workers: config.coordinator.workers,
//!         num_images: config.batch.num_images,
//!         node: config.coordinator.resolved_node_name(),
//!     };
//!     let report = Session::new(Arc::new(pipeline), options).run(|_| {}).await?;
//!     println!("{} images in {:.2} s", report.completed, report.elapsed_secs);
//!     Ok(())
//! }
//! ```

pub mod codec;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod kernels;
pub mod metrics;
pub mod pipeline;

pub use codec::{RasterHeader, RasterImage};
pub use config::Config;
pub use coordinator::{
    Assignment, ImageJob, ProgressEvent, Session, SessionOptions, SessionReport, WorkerContext,
    WorkerSummary,
};
pub use error::{ConfigError, PipelineError, PipelineResult, PrismError, ProtocolError, Result};
pub use metrics::{MetricsFormat, MetricsRecord, MetricsSink, MetricsSummary};
pub use pipeline::{BatchLayout, ImageOutcome, Inventory, Transform, WorkItem, WorkerPipeline};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
