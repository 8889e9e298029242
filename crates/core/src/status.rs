//! Job status and the fail-closed status payload parser.

use core::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DomainError;

/// Status of the translation job.
///
/// `Pending` is the only non-terminal state.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    #[default]
    Pending,
    Completed,
    Error,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobStatus::Pending)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Completed => "completed",
            JobStatus::Error => "error",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(JobStatus::Pending),
            "completed" => Some(JobStatus::Completed),
            "error" => Some(JobStatus::Error),
            _ => None,
        }
    }
}

impl core::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
            .ok_or_else(|| DomainError::validation(format!("unknown job status: {s:?}")))
    }
}

/// Result of reading a status out of a JSON payload.
///
/// Status bodies come from the network, so the parser never guesses: callers
/// decide what a missing or unknown value means via [`StatusReport::known`]
/// (ignore it) or [`StatusReport::or_error`] (fail closed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusReport {
    Known(JobStatus),
    Missing,
    Unrecognized(String),
}

impl StatusReport {
    /// Field names accepted for the status, in priority order.
    ///
    /// `result` is what older servers used for `GET /status`.
    const FIELDS: [&'static str; 2] = ["status", "result"];

    pub fn from_value(body: &Value) -> Self {
        let Some(raw) = Self::FIELDS.iter().find_map(|f| body.get(*f)) else {
            return StatusReport::Missing;
        };

        match raw.as_str() {
            Some(s) => match JobStatus::parse(s) {
                Some(status) => StatusReport::Known(status),
                None => StatusReport::Unrecognized(s.to_string()),
            },
            None => StatusReport::Unrecognized(raw.to_string()),
        }
    }

    /// Parse raw bytes; a body that is not JSON counts as missing.
    pub fn from_slice(bytes: &[u8]) -> Self {
        match serde_json::from_slice::<Value>(bytes) {
            Ok(v) => Self::from_value(&v),
            Err(_) => StatusReport::Missing,
        }
    }

    pub fn known(&self) -> Option<JobStatus> {
        match self {
            StatusReport::Known(s) => Some(*s),
            _ => None,
        }
    }

    /// Fail-closed interpretation: anything not understood is an error.
    pub fn or_error(&self) -> JobStatus {
        self.known().unwrap_or(JobStatus::Error)
    }
}
