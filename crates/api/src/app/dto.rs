use serde::{Deserialize, Serialize};

use vtrans_core::JobStatus;

// -------------------------
// Request DTOs
// -------------------------

/// Form body of `POST /register_webhook`.
#[derive(Debug, Deserialize)]
pub struct RegisterWebhookForm {
    #[serde(default)]
    pub webhook_url: Option<String>,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusResponse {
    pub status: JobStatus,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
