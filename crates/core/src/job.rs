//! The translation job and its write-once terminal transition.

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::error::{DomainError, DomainResult};
use crate::id::JobId;
use crate::status::JobStatus;

/// The single simulated translation job of a server instance.
#[derive(Debug, Clone)]
pub struct Job {
    id: JobId,
    status: JobStatus,
    created_at: DateTime<Utc>,
    configured_duration: Duration,
    error_probability: f64,
}

impl Job {
    /// Create a pending job.
    ///
    /// `error_probability` must lie in `[0, 1]`.
    pub fn new(configured_duration: Duration, error_probability: f64) -> DomainResult<Self> {
        if !(0.0..=1.0).contains(&error_probability) {
            return Err(DomainError::validation(format!(
                "error probability must be within [0, 1], got {error_probability}"
            )));
        }

        Ok(Self {
            id: JobId::new(),
            status: JobStatus::Pending,
            created_at: Utc::now(),
            configured_duration,
            error_probability,
        })
    }

    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn configured_duration(&self) -> Duration {
        self.configured_duration
    }

    pub fn error_probability(&self) -> f64 {
        self.error_probability
    }

    /// Whether the job should settle now, given the time elapsed since start.
    pub fn is_due(&self, elapsed: Duration) -> bool {
        self.status == JobStatus::Pending && elapsed >= self.configured_duration
    }

    /// Outcome for a uniform draw in `[0, 1)`.
    pub fn outcome_for(&self, draw: f64) -> JobStatus {
        if draw < self.error_probability {
            JobStatus::Error
        } else {
            JobStatus::Completed
        }
    }

    /// Move the job to its terminal status using `draw`.
    ///
    /// Succeeds exactly once; afterwards the status is frozen and every call
    /// fails with [`DomainError::InvariantViolation`].
    pub fn settle(&mut self, draw: f64) -> DomainResult<JobStatus> {
        if self.status.is_terminal() {
            return Err(DomainError::invariant(format!(
                "job {} already settled as {}",
                self.id, self.status
            )));
        }

        self.status = self.outcome_for(draw);
        Ok(self.status)
    }
}
