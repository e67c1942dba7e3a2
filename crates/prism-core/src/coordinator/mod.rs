//! Dynamic work distribution across a pool of workers.
//!
//! One coordinator hands out image ordinals on demand to `W` workers. Each
//! worker pulls its next ordinal as soon as it finishes the previous one,
//! so faster workers naturally take on more of the batch.
//!
//! ```text
//! start barrier → [request → assignment → process]* → stop → end barrier
//! ```

mod protocol;
mod session;

pub use protocol::{Assignment, Coordinator, SessionState, WorkRequest};
pub use session::{
    ProgressEvent, Session, SessionOptions, SessionReport, WorkerSummary,
};

use crate::error::PipelineResult;
use crate::pipeline::{ImageOutcome, WorkItem};

/// Identity of the worker running a job.
#[derive(Debug, Clone)]
pub struct WorkerContext {
    /// Worker id in `1..=W`; the coordinator is `0`
    pub worker: usize,
    /// Name of the node the session runs on
    pub node: String,
}

/// Per-image work executed by every worker.
///
/// `run` is called from a blocking thread, so implementations may do
/// synchronous I/O and CPU-heavy work freely.
pub trait ImageJob: Send + Sync + 'static {
    /// One-time setup performed before any worker is released.
    fn prepare(&self) -> PipelineResult<()> {
        Ok(())
    }

    /// Process a single image.
    fn run(&self, ctx: &WorkerContext, item: WorkItem) -> PipelineResult<ImageOutcome>;
}
