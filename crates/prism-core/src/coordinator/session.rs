//! One batch session: a coordinator task serving `W` worker tasks.

use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, oneshot, Barrier};
use tokio::task::JoinHandle;

use crate::error::{ConfigError, PrismError, ProtocolError};
use crate::pipeline::{ImageOutcome, WorkItem};

use super::protocol::{Assignment, Coordinator, SessionState, WorkRequest};
use super::{ImageJob, WorkerContext};

/// Shape of a session.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Number of workers, excluding the coordinator
    pub workers: usize,
    /// Ordinals `1..=num_images` are distributed
    pub num_images: u32,
    /// Node name reported by every worker
    pub node: String,
}

/// Emitted once per image, as soon as a worker is done with it.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    Completed {
        worker: usize,
        outcome: ImageOutcome,
    },
    Skipped {
        worker: usize,
        item: WorkItem,
        reason: String,
    },
}

/// What one worker did during the session.
#[derive(Debug, Clone, Default, Serialize)]
pub struct WorkerSummary {
    pub worker: usize,
    pub completed: usize,
    pub skipped: usize,
    pub bytes_read: u64,
    pub bytes_written: u64,
    /// Completed images, in the order this worker processed them
    pub items: Vec<WorkItem>,
}

/// Result of a finished session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    /// Wall time from session start until every worker passed the end barrier
    pub elapsed_secs: f64,
    pub assigned: u32,
    pub completed: usize,
    pub skipped: usize,
    pub bytes_read: u64,
    pub bytes_written: u64,
    pub workers: Vec<WorkerSummary>,
}

impl SessionReport {
    /// Combined read and write throughput in MB/s.
    pub fn throughput_mb_s(&self) -> f64 {
        if self.elapsed_secs > 0.0 {
            (self.bytes_read + self.bytes_written) as f64 / 1_000_000.0 / self.elapsed_secs
        } else {
            0.0
        }
    }
}

type ProgressFn = Arc<dyn Fn(ProgressEvent) + Send + Sync>;
type WorkerHandle = (usize, JoinHandle<Result<WorkerSummary, ProtocolError>>);

/// Runs an [`ImageJob`] over a batch with pull-based work distribution.
pub struct Session<J: ImageJob> {
    job: Arc<J>,
    options: SessionOptions,
}

impl<J: ImageJob> Session<J> {
    pub fn new(job: Arc<J>, options: SessionOptions) -> Self {
        Self { job, options }
    }

    /// Run the session to completion.
    ///
    /// Per-image failures are reported through `on_progress` and counted as
    /// skipped; only a failed `prepare` or a protocol violation fails the
    /// whole session.
    pub async fn run<F>(self, on_progress: F) -> crate::Result<SessionReport>
    where
        F: Fn(ProgressEvent) + Send + Sync + 'static,
    {
        let SessionOptions {
            workers,
            num_images,
            node,
        } = self.options;
        if workers == 0 {
            return Err(ConfigError::ValidationError(
                "a session needs at least one worker".to_string(),
            )
            .into());
        }

        let start_time = Instant::now();
        tracing::debug!(
            "Starting session: {} images, {} workers on {}",
            num_images,
            workers,
            node
        );

        let job = self.job.clone();
        tokio::task::spawn_blocking(move || job.prepare())
            .await
            .map_err(|e| ProtocolError::WorkerPanicked {
                worker: 0,
                message: e.to_string(),
            })??;

        let start = Arc::new(Barrier::new(workers + 1));
        let end = Arc::new(Barrier::new(workers + 1));
        let on_progress: ProgressFn = Arc::new(on_progress);
        let (tx, mut rx) = mpsc::channel::<WorkRequest>(workers);

        let handles: Vec<WorkerHandle> = (1..=workers)
            .map(|worker| {
                let ctx = WorkerContext {
                    worker,
                    node: node.clone(),
                };
                let handle = tokio::spawn(worker_task(
                    self.job.clone(),
                    ctx,
                    tx.clone(),
                    start.clone(),
                    end.clone(),
                    on_progress.clone(),
                ));
                (worker, handle)
            })
            .collect();
        // Only workers may keep the request queue open.
        drop(tx);

        let mut coordinator = Coordinator::new(num_images, workers);
        start.wait().await;

        while coordinator.state() != SessionState::Done {
            let Some(request) = rx.recv().await else {
                return Err(disconnected(handles).await);
            };
            let assignment = match coordinator.on_request(request.worker) {
                Ok(assignment) => assignment,
                Err(e) => {
                    abort_all(&handles);
                    return Err(e.into());
                }
            };
            if request.reply.send(assignment).is_err() {
                abort_all(&handles);
                return Err(ProtocolError::WorkerPanicked {
                    worker: request.worker,
                    message: "reply channel closed before the assignment arrived".to_string(),
                }
                .into());
            }
        }

        end.wait().await;
        let elapsed_secs = start_time.elapsed().as_secs_f64();

        let mut report = SessionReport {
            elapsed_secs,
            assigned: coordinator.assigned(),
            completed: 0,
            skipped: 0,
            bytes_read: 0,
            bytes_written: 0,
            workers: Vec::with_capacity(workers),
        };
        for (worker, handle) in handles {
            let summary = handle
                .await
                .map_err(|e| ProtocolError::WorkerPanicked {
                    worker,
                    message: e.to_string(),
                })??;
            report.completed += summary.completed;
            report.skipped += summary.skipped;
            report.bytes_read += summary.bytes_read;
            report.bytes_written += summary.bytes_written;
            report.workers.push(summary);
        }

        tracing::info!("Total time (dynamic distribution): {:.2} s", elapsed_secs);
        Ok(report)
    }
}

fn abort_all(handles: &[WorkerHandle]) {
    for (_, handle) in handles {
        handle.abort();
    }
}

/// Every request sender is gone while the coordinator still expected
/// requests. Blame the first worker that died, if any did.
async fn disconnected(handles: Vec<WorkerHandle>) -> PrismError {
    let mut error = ProtocolError::SessionClosed(0);
    for (worker, handle) in handles {
        if !handle.is_finished() {
            handle.abort();
            continue;
        }
        match handle.await {
            Err(e) => {
                if matches!(error, ProtocolError::SessionClosed(_)) {
                    error = ProtocolError::WorkerPanicked {
                        worker,
                        message: e.to_string(),
                    };
                }
            }
            Ok(Err(e)) => {
                if matches!(error, ProtocolError::SessionClosed(_)) {
                    error = e;
                }
            }
            Ok(Ok(_)) => {}
        }
    }
    error.into()
}

async fn worker_task<J: ImageJob>(
    job: Arc<J>,
    ctx: WorkerContext,
    requests: mpsc::Sender<WorkRequest>,
    start: Arc<Barrier>,
    end: Arc<Barrier>,
    on_progress: ProgressFn,
) -> Result<WorkerSummary, ProtocolError> {
    start.wait().await;
    let summary = pull_work(&job, &ctx, requests, &on_progress).await;
    end.wait().await;
    summary
}

/// REQUESTING → (WORKING → REQUESTING)* → STOPPED
///
/// Takes the request sender by value so it is dropped as soon as this
/// worker stops.
async fn pull_work<J: ImageJob>(
    job: &Arc<J>,
    ctx: &WorkerContext,
    requests: mpsc::Sender<WorkRequest>,
    on_progress: &ProgressFn,
) -> Result<WorkerSummary, ProtocolError> {
    let mut summary = WorkerSummary {
        worker: ctx.worker,
        ..Default::default()
    };

    loop {
        let (reply, response) = oneshot::channel();
        requests
            .send(WorkRequest {
                worker: ctx.worker,
                reply,
            })
            .await
            .map_err(|_| ProtocolError::SessionClosed(ctx.worker))?;

        let item = match response
            .await
            .map_err(|_| ProtocolError::ReplyDropped(ctx.worker))?
        {
            Assignment::Work(item) => item,
            Assignment::Stop => break,
        };

        let task_job = job.clone();
        let task_ctx = ctx.clone();
        let result = tokio::task::spawn_blocking(move || task_job.run(&task_ctx, item)).await;

        let event = match result {
            Ok(Ok(outcome)) => {
                summary.completed += 1;
                summary.bytes_read += outcome.record.bytes_read;
                summary.bytes_written += outcome.record.bytes_written;
                summary.items.push(item);
                ProgressEvent::Completed {
                    worker: ctx.worker,
                    outcome,
                }
            }
            Ok(Err(e)) => {
                tracing::warn!("{}", e);
                summary.skipped += 1;
                ProgressEvent::Skipped {
                    worker: ctx.worker,
                    item,
                    reason: e.to_string(),
                }
            }
            Err(e) => {
                tracing::error!("Worker {} failed on image {}: {}", ctx.worker, item, e);
                summary.skipped += 1;
                ProgressEvent::Skipped {
                    worker: ctx.worker,
                    item,
                    reason: e.to_string(),
                }
            }
        };
        on_progress(event);
    }

    tracing::debug!(
        "Worker {} stopped after {} images",
        ctx.worker,
        summary.completed + summary.skipped
    );
    Ok(summary)
}
