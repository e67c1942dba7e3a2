//! Coordinator-side state machine of the pull-based assignment protocol.
//!
//! Workers ask for work one request at a time; the coordinator answers each
//! request with the next ordinal while any remain, and with a stop signal
//! afterwards. The reply tag is the only way a worker learns it is done.

use tokio::sync::oneshot;

use crate::error::ProtocolError;
use crate::pipeline::WorkItem;

/// Reply to a work request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assignment {
    /// Process this image, then ask again
    Work(WorkItem),
    /// No work remains; the worker must stop
    Stop,
}

/// A worker's request, carrying the channel its reply goes back on.
#[derive(Debug)]
pub struct WorkRequest {
    pub worker: usize,
    pub reply: oneshot::Sender<Assignment>,
}

/// Coordinator session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Unassigned ordinals remain
    Assigning,
    /// Every ordinal is assigned; some workers have not been stopped yet
    Draining,
    /// Every worker has been stopped
    Done,
}

/// Assignment cursor plus the set of workers still active.
///
/// Only the coordinator task touches this, so it needs no locking.
#[derive(Debug, Clone)]
pub struct Coordinator {
    total: u32,
    next: u64,
    active: usize,
    stopped: Vec<bool>,
}

impl Coordinator {
    /// A session over ordinals `1..=total` served to workers `1..=workers`.
    pub fn new(total: u32, workers: usize) -> Self {
        Self {
            total,
            next: 1,
            active: workers,
            stopped: vec![false; workers],
        }
    }

    pub fn state(&self) -> SessionState {
        if self.next <= u64::from(self.total) {
            SessionState::Assigning
        } else if self.active > 0 {
            SessionState::Draining
        } else {
            SessionState::Done
        }
    }

    /// Workers that have not yet received a stop signal.
    pub fn active_workers(&self) -> usize {
        self.active
    }

    /// Ordinals handed out so far.
    pub fn assigned(&self) -> u32 {
        (self.next - 1) as u32
    }

    /// Answer a request from `worker`.
    pub fn on_request(&mut self, worker: usize) -> Result<Assignment, ProtocolError> {
        let workers = self.stopped.len();
        if worker == 0 || worker > workers {
            return Err(ProtocolError::UnknownWorker { worker, workers });
        }
        if self.stopped[worker - 1] {
            return Err(ProtocolError::StoppedWorkerRequested(worker));
        }

        if self.next <= u64::from(self.total) {
            let item = WorkItem::new(self.next as u32);
            self.next += 1;
            tracing::trace!("Assigned image {} to worker {}", item, worker);
            Ok(Assignment::Work(item))
        } else {
            self.stopped[worker - 1] = true;
            self.active -= 1;
            tracing::trace!(
                "Stopped worker {} ({} still active)",
                worker,
                self.active
            );
            Ok(Assignment::Stop)
        }
    }
}
