//! Errors raised by the job model.

use thiserror::Error;

pub type DomainResult<T> = Result<T, DomainError>;

/// Failures that follow from the input alone; retrying them never helps.
///
/// Network and runtime failures live in the infra and client crates.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Rejected input: a webhook URL, an error probability, a status name.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The job was asked to change after it settled.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_the_detail() {
        let err = DomainError::invariant("job already settled as error");
        assert_eq!(err.to_string(), "invariant violated: job already settled as error");
    }
}
