//! Guarded delivery of the terminal status.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{error, info, warn};

use vtrans_core::{DeliveryGuard, JobId, JobStatus, NotificationRecord};

use crate::jobs::RetryPolicy;

use super::registry::WebhookRegistry;
use super::sender::WebhookSender;

/// Why a `deliver` call did not run a delivery sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NotTerminal,
    NoTarget,
    AlreadyDelivered,
    InFlight,
    Exhausted,
}

/// Result of a `deliver` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered { attempts: u32 },
    Exhausted { attempts: u32 },
    Skipped(SkipReason),
}

impl DeliveryOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, DeliveryOutcome::Delivered { .. })
    }
}

/// Pushes the job's terminal status to the registered target, at most once.
///
/// Concurrent callers race for a single claim on the [`NotificationRecord`];
/// losers return [`DeliveryOutcome::Skipped`] immediately.
pub struct NotificationDispatcher<S> {
    job_id: JobId,
    registry: Arc<WebhookRegistry>,
    sender: S,
    policy: RetryPolicy,
    record: Mutex<NotificationRecord>,
}

impl<S: WebhookSender> NotificationDispatcher<S> {
    pub fn new(job_id: JobId, registry: Arc<WebhookRegistry>, sender: S, policy: RetryPolicy) -> Self {
        Self {
            job_id,
            registry,
            sender,
            policy,
            record: Mutex::new(NotificationRecord::new()),
        }
    }

    fn record_mut(&self) -> MutexGuard<'_, NotificationRecord> {
        self.record.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn record(&self) -> NotificationRecord {
        self.record_mut().clone()
    }

    pub fn is_delivered(&self) -> bool {
        self.record_mut().delivered()
    }

    /// Deliver `status` to the current webhook target.
    ///
    /// Runs up to `policy.max_attempts` attempts, sleeping
    /// `policy.delay_for_attempt(i)` after failed attempt `i`. Every attempt
    /// targets whatever is registered at that moment.
    pub async fn deliver(&self, status: JobStatus) -> DeliveryOutcome {
        let job_id = self.job_id;

        if !status.is_terminal() {
            warn!(job_id = %job_id, status = %status, "refusing to deliver non-terminal status");
            return DeliveryOutcome::Skipped(SkipReason::NotTerminal);
        }

        if self.registry.current_target().is_none() {
            info!(job_id = %job_id, "no webhook registered; delivery skipped");
            return DeliveryOutcome::Skipped(SkipReason::NoTarget);
        }

        let skip = match self.record_mut().try_claim() {
            DeliveryGuard::Claimed => None,
            DeliveryGuard::AlreadyDelivered => Some(SkipReason::AlreadyDelivered),
            DeliveryGuard::InFlight => Some(SkipReason::InFlight),
            DeliveryGuard::Exhausted => Some(SkipReason::Exhausted),
        };
        if let Some(reason) = skip {
            info!(job_id = %job_id, reason = ?reason, "delivery skipped");
            return DeliveryOutcome::Skipped(reason);
        }

        for attempt in 1..=self.policy.max_attempts {
            let Some(target) = self.registry.current_target() else {
                self.record_mut().release();
                return DeliveryOutcome::Skipped(SkipReason::NoTarget);
            };

            self.record_mut().record_attempt();

            match self.sender.send(&target, status).await {
                Ok(ack) if ack.is_success() => {
                    self.record_mut().mark_delivered();
                    info!(
                        job_id = %job_id,
                        target = %target,
                        status = %status,
                        attempt,
                        "webhook delivered"
                    );
                    return DeliveryOutcome::Delivered { attempts: attempt };
                }
                Ok(ack) => {
                    warn!(
                        job_id = %job_id,
                        target = %target,
                        attempt,
                        status_code = ack.status_code,
                        "webhook rejected"
                    );
                }
                Err(e) => {
                    warn!(job_id = %job_id, target = %target, attempt, error = %e, "webhook send failed");
                }
            }

            if self.policy.should_retry(attempt) {
                tokio::time::sleep(self.policy.delay_for_attempt(attempt)).await;
            }
        }

        let attempts = {
            let mut record = self.record_mut();
            record.mark_exhausted();
            record.attempts_made()
        };
        error!(job_id = %job_id, attempts, "webhook delivery exhausted; giving up");
        DeliveryOutcome::Exhausted { attempts }
    }
}

impl<S> std::fmt::Debug for NotificationDispatcher<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationDispatcher")
            .field("job_id", &self.job_id)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
