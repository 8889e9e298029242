//! Strongly-typed identifiers.

use uuid::Uuid;

/// Identifier of the translation job served by one server instance.
///
/// There is only ever one job per process; the id exists so log lines from
/// the timer, the dispatcher and the HTTP handlers can be correlated.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct JobId(Uuid);

impl JobId {
    /// Create a new identifier (UUIDv7, time-ordered).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for JobId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}
