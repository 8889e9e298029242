//! Webhook registration and delivery.
//!
//! - `WebhookRegistry`: at most one callback target, last registration wins
//! - `RegistrationSignal`: one-shot "somebody registered" signal
//! - `WebhookSender`: transport seam (reqwest in production)
//! - `NotificationDispatcher`: bounded, guarded delivery of the terminal status

pub mod dispatcher;
pub mod registry;
pub mod sender;
pub mod signal;

pub use dispatcher::{DeliveryOutcome, NotificationDispatcher, SkipReason};
pub use registry::WebhookRegistry;
pub use sender::{Acknowledgement, HttpWebhookSender, SendError, WebhookPayload, WebhookSender};
pub use signal::RegistrationSignal;
