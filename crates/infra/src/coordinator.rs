//! Wiring of job state, webhook registry and dispatcher.
//!
//! Two paths can end in a delivery:
//! - the timer path: the job settles, waits for a registration, delivers;
//! - the registration path: a registration arrives after the job settled and
//!   triggers its own delivery so the registrant is not left waiting.
//!
//! Both funnel into [`NotificationDispatcher::deliver`], whose claim guard
//! lets exactly one sequence run.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::info;

use vtrans_core::{DomainResult, Job, JobId, JobStatus, WebhookRegistration};

use crate::jobs::{JobState, RetryPolicy, StatusTimer};
use crate::webhooks::{
    DeliveryOutcome, HttpWebhookSender, NotificationDispatcher, WebhookRegistry, WebhookSender,
};

/// What `register_webhook` did.
#[derive(Debug)]
pub struct RegistrationReceipt {
    pub registration: WebhookRegistration,
    /// Delivery started because the job had already settled.
    pub triggered_delivery: Option<JoinHandle<DeliveryOutcome>>,
}

/// Owns everything a server instance shares between its handlers and its
/// background timer.
#[derive(Debug)]
pub struct JobCoordinator<S = HttpWebhookSender> {
    state: JobState,
    registry: Arc<WebhookRegistry>,
    dispatcher: Arc<NotificationDispatcher<S>>,
}

impl<S: WebhookSender> JobCoordinator<S> {
    pub fn new(job: Job, sender: S, policy: RetryPolicy) -> Self {
        let job_id = job.id();
        let state = JobState::new(job);
        let registry = Arc::new(WebhookRegistry::new());
        let dispatcher = Arc::new(NotificationDispatcher::new(
            job_id,
            registry.clone(),
            sender,
            policy,
        ));

        Self {
            state,
            registry,
            dispatcher,
        }
    }

    pub fn job_id(&self) -> JobId {
        self.state.job_id()
    }

    /// Current status; never blocks on the timer or on delivery.
    pub fn status(&self) -> JobStatus {
        self.state.status()
    }

    pub fn state(&self) -> &JobState {
        &self.state
    }

    pub fn registry(&self) -> &WebhookRegistry {
        &self.registry
    }

    pub fn dispatcher(&self) -> &NotificationDispatcher<S> {
        &self.dispatcher
    }

    /// Timer bound to this coordinator's job.
    pub fn timer(&self, tick: std::time::Duration) -> StatusTimer {
        StatusTimer::new(self.state.clone(), tick)
    }

    /// Register (or replace) the webhook target.
    ///
    /// Returns immediately. If the job already settled and nothing was
    /// delivered yet, a delivery is spawned on the current runtime.
    pub fn register_webhook(&self, raw_target: &str) -> DomainResult<RegistrationReceipt> {
        let registration = WebhookRegistration::new(raw_target)?;

        // Store and signal before looking at the status: if the timer settles
        // in between, its own path sees the registration.
        self.registry.register(registration.clone());

        let status = self.state.status();
        let triggered_delivery = if status.is_terminal() && !self.dispatcher.is_delivered() {
            info!(job_id = %self.job_id(), status = %status, "late registration; triggering delivery");
            let dispatcher = self.dispatcher.clone();
            Some(tokio::spawn(async move { dispatcher.deliver(status).await }))
        } else {
            None
        };

        Ok(RegistrationReceipt {
            registration,
            triggered_delivery,
        })
    }

    /// Timer path: settle, wait for a registration (unbounded), deliver.
    pub async fn run(&self, mut timer: StatusTimer) -> DeliveryOutcome {
        let status = timer.run_until_settled().await;

        if !self.registry.is_registered() {
            info!(job_id = %self.job_id(), status = %status, "job settled; waiting for a webhook registration");
        }
        self.registry.wait_for_registration().await;

        self.dispatcher.deliver(status).await
    }

    /// Spawn [`JobCoordinator::run`] as a background task.
    pub fn spawn(self: &Arc<Self>, timer: StatusTimer) -> JoinHandle<DeliveryOutcome> {
        let this = self.clone();
        tokio::spawn(async move { this.run(timer).await })
    }
}
