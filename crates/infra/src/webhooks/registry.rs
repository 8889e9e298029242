//! The single webhook slot of a job.

use std::sync::{PoisonError, RwLock};

use tracing::info;
use url::Url;

use vtrans_core::WebhookRegistration;

use super::signal::RegistrationSignal;

/// Holds at most one registration; a new registration replaces the old one.
#[derive(Debug, Default)]
pub struct WebhookRegistry {
    current: RwLock<Option<WebhookRegistration>>,
    signal: RegistrationSignal,
}

impl WebhookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `registration` and fire the registration signal.
    ///
    /// Returns the registration it replaced, if any.
    pub fn register(&self, registration: WebhookRegistration) -> Option<WebhookRegistration> {
        let target = registration.callback_target().clone();
        let previous = self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(registration);

        let first = self.signal.set();
        info!(
            target = %target,
            replaced = previous.is_some(),
            first_registration = first,
            "webhook registered"
        );

        previous
    }

    pub fn current(&self) -> Option<WebhookRegistration> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn current_target(&self) -> Option<Url> {
        self.current().map(|r| r.callback_target().clone())
    }

    pub fn is_registered(&self) -> bool {
        self.signal.is_set()
    }

    /// Wait for the first registration (returns at once if one exists).
    pub async fn wait_for_registration(&self) {
        self.signal.wait().await;
    }
}
