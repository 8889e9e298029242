//! Service wiring for the HTTP layer.
//!
//! `AppServices` is built once in `main` (or per test server) and handed to
//! every handler through an axum `Extension`.

use std::sync::{Arc, Mutex, PoisonError};

use anyhow::Context;
use tokio::task::JoinHandle;

use vtrans_core::{Job, JobStatus};
use vtrans_infra::{DeliveryOutcome, HttpWebhookSender, JobCoordinator, ServerConfig};

pub struct AppServices {
    coordinator: Arc<JobCoordinator>,
    timer: Mutex<Option<JoinHandle<DeliveryOutcome>>>,
}

impl AppServices {
    /// Create the job and start its timer on the current tokio runtime.
    pub fn start(config: &ServerConfig) -> anyhow::Result<Self> {
        config.validate()?;

        let duration = config.resolve_job_duration();
        let job = Job::new(duration, config.error_probability)?;
        let sender = HttpWebhookSender::new(config.request_timeout)
            .context("failed to build webhook HTTP client")?;

        let coordinator = Arc::new(JobCoordinator::new(job, sender, config.retry_policy()));
        let timer = coordinator.spawn(coordinator.timer(config.time_unit));

        tracing::info!(
            job_id = %coordinator.job_id(),
            duration_ms = duration.as_millis() as u64,
            error_probability = config.error_probability,
            retry_attempts = config.retry_attempts,
            "translation job started"
        );

        Ok(Self {
            coordinator,
            timer: Mutex::new(Some(timer)),
        })
    }

    pub fn coordinator(&self) -> &JobCoordinator {
        &self.coordinator
    }

    pub fn status(&self) -> JobStatus {
        self.coordinator.status()
    }

    /// Stop the background timer (and any delivery it is running).
    pub fn shutdown(&self) {
        let handle = self
            .timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            handle.abort();
            tracing::info!(job_id = %self.coordinator.job_id(), "status timer stopped");
        }
    }
}

impl Drop for AppServices {
    fn drop(&mut self) {
        self.shutdown();
    }
}
