//! Shared runtime view of the job.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};
use std::time::Duration;

use tokio::time::Instant;

use vtrans_core::{Job, JobId, JobStatus};

/// Single source of truth for the job's status.
///
/// Cloning is cheap and every clone observes the same job. Reads take a short
/// read lock and never wait on the timer or on webhook delivery.
#[derive(Debug, Clone)]
pub struct JobState {
    inner: Arc<RwLock<Job>>,
    started: Instant,
}

impl JobState {
    pub fn new(job: Job) -> Self {
        Self {
            inner: Arc::new(RwLock::new(job)),
            started: Instant::now(),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Job> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn job_id(&self) -> JobId {
        self.read().id()
    }

    pub fn status(&self) -> JobStatus {
        self.read().status()
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Settle the job if its duration has elapsed and it is still pending.
    ///
    /// `draw` is only evaluated when the transition actually happens. Returns
    /// the new terminal status, or `None` if nothing changed.
    pub(crate) fn settle_if_due(&self, draw: impl FnOnce() -> f64) -> Option<JobStatus> {
        let elapsed = self.elapsed();
        let mut job = self.inner.write().unwrap_or_else(PoisonError::into_inner);

        if !job.is_due(elapsed) {
            return None;
        }

        job.settle(draw()).ok()
    }
}
