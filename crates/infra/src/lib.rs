//! Infrastructure layer: the running job, webhook delivery, configuration.

pub mod config;
pub mod coordinator;
pub mod jobs;
pub mod webhooks;

pub use config::{lookup_parsed, ConfigError, ServerConfig, TranslationLength};
pub use coordinator::{JobCoordinator, RegistrationReceipt};
pub use jobs::{JobState, RetryPolicy, StatusTimer};
pub use webhooks::{
    Acknowledgement, DeliveryOutcome, HttpWebhookSender, NotificationDispatcher,
    RegistrationSignal, SendError, SkipReason, WebhookRegistry, WebhookSender,
};
