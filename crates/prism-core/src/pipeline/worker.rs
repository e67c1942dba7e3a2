//! Per-image driver: decode once, fan out six variants, record throughput.

use rayon::prelude::*;
use serde::Serialize;
use std::sync::Arc;

use crate::codec::{self, RasterImage};
use crate::coordinator::{ImageJob, WorkerContext};
use crate::error::{PipelineError, PipelineResult};
use crate::metrics::{MetricsRecord, MetricsSink};

use super::layout::{BatchLayout, WorkItem};
use super::transform::Transform;

/// Result of processing one image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageOutcome {
    /// The image that was processed
    pub item: WorkItem,
    /// The metrics record emitted for it
    pub record: MetricsRecord,
    /// Variants encoded successfully
    pub variants_written: usize,
    /// Variants lost to encode failures
    pub variants_failed: usize,
}

/// Loads an image, derives every variant in parallel and writes them out.
pub struct WorkerPipeline {
    layout: BatchLayout,
    transforms: [Transform; 6],
    metrics: Arc<MetricsSink>,
}

impl WorkerPipeline {
    pub fn new(layout: BatchLayout, blur_kernel_size: u32, metrics: Arc<MetricsSink>) -> Self {
        Self {
            layout,
            transforms: Transform::variants(blur_kernel_size),
            metrics,
        }
    }

    pub fn layout(&self) -> &BatchLayout {
        &self.layout
    }

    /// Process one image.
    ///
    /// A missing or undecodable input returns an error and produces neither
    /// outputs nor a metrics record. A variant that cannot be written is
    /// logged and left out of `bytes_written`; the other variants proceed.
    pub fn process(&self, ctx: &WorkerContext, item: WorkItem) -> PipelineResult<ImageOutcome> {
        let path = self.layout.input_path(item);
        if !path.exists() {
            return Err(PipelineError::MissingInput {
                path,
                worker: ctx.worker,
                node: ctx.node.clone(),
            });
        }

        tracing::debug!("Worker {} -> image {} -> {}", ctx.worker, item, ctx.node);
        let source = codec::decode(&path)?;
        let header = *source.header();
        let bytes_read = source.size() as u64;

        let out_dir = self.layout.output_dir(item);
        std::fs::create_dir_all(&out_dir).map_err(|e| PipelineError::OutputDir {
            path: out_dir.clone(),
            message: e.to_string(),
        })?;

        let results: Vec<PipelineResult<u64>> = self
            .transforms
            .par_iter()
            .map(|transform| self.write_variant(&source, item, transform, &header))
            .collect();

        let mut bytes_written = 0u64;
        let mut variants_failed = 0usize;
        for result in results {
            match result {
                Ok(bytes) => bytes_written += bytes,
                Err(e) => {
                    variants_failed += 1;
                    tracing::warn!("Worker {}: {}", ctx.worker, e);
                }
            }
        }

        let record = MetricsRecord {
            image: self.layout.image_name(item),
            bytes_read,
            bytes_written,
        };
        if let Err(e) = self.metrics.append(&record) {
            tracing::error!("Worker {}: {}", ctx.worker, e);
        }

        tracing::info!(
            "Worker {} finished image {} with {} bytes written",
            ctx.worker,
            item,
            bytes_written
        );

        Ok(ImageOutcome {
            item,
            record,
            variants_written: self.transforms.len() - variants_failed,
            variants_failed,
        })
    }

    /// Derive one variant from a private copy of `source` and encode it.
    ///
    /// Returns the pixel-buffer size of the written variant.
    fn write_variant(
        &self,
        source: &RasterImage,
        item: WorkItem,
        transform: &Transform,
        header: &codec::RasterHeader,
    ) -> PipelineResult<u64> {
        let output = transform.apply(source.duplicate());
        let path = self.layout.output_path(item, transform);
        codec::encode(&path, &output, header)?;
        tracing::trace!("  {} -> {:?}", transform, path);
        Ok(output.size() as u64)
    }
}

impl ImageJob for WorkerPipeline {
    fn prepare(&self) -> PipelineResult<()> {
        let root = self.layout.transform_root();
        std::fs::create_dir_all(&root).map_err(|e| PipelineError::OutputDir {
            path: root,
            message: e.to_string(),
        })
    }

    fn run(&self, ctx: &WorkerContext, item: WorkItem) -> PipelineResult<ImageOutcome> {
        self.process(ctx, item)
    }
}
