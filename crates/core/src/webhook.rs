//! Webhook registrations.

use chrono::{DateTime, Utc};
use url::Url;

use crate::error::{DomainError, DomainResult};

/// A callback target registered by a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookRegistration {
    callback_target: Url,
    registered_at: DateTime<Utc>,
}

impl WebhookRegistration {
    /// Validate `raw` and build a registration stamped with the current time.
    ///
    /// The target must be a non-empty absolute `http` or `https` URL.
    pub fn new(raw: &str) -> DomainResult<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("webhook_url must not be empty"));
        }

        let url = Url::parse(trimmed)
            .map_err(|e| DomainError::validation(format!("webhook_url is not a valid URL: {e}")))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(DomainError::validation(format!(
                "webhook_url must use http or https, got {}",
                url.scheme()
            )));
        }

        Ok(Self {
            callback_target: url,
            registered_at: Utc::now(),
        })
    }

    pub fn callback_target(&self) -> &Url {
        &self.callback_target
    }

    pub fn registered_at(&self) -> DateTime<Utc> {
        self.registered_at
    }
}
