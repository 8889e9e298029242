//! Clients of the translation status server.
//!
//! - [`PollingClient`]: asks `GET /status` until the job settles
//! - [`WebhookClient`]: registers a callback and receives `POST /webhook`

pub mod config;
pub mod error;
pub mod polling;
pub mod webhook;

pub use config::{ClientConfig, ClientMode};
pub use error::ClientError;
pub use polling::PollingClient;
pub use webhook::WebhookClient;
