//! `vtrans-core`: domain model of the simulated translation job.
//!
//! This crate contains **pure domain** types (no I/O, no runtime): the job
//! status state machine, webhook registrations and the notification record.

pub mod error;
pub mod id;
pub mod job;
pub mod notification;
pub mod status;
pub mod webhook;

pub use error::{DomainError, DomainResult};
pub use id::JobId;
pub use job::Job;
pub use notification::{DeliveryGuard, NotificationRecord};
pub use status::{JobStatus, StatusReport};
pub use webhook::WebhookRegistration;
