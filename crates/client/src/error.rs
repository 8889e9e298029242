use thiserror::Error;

use vtrans_infra::ConfigError;

/// Client-side failures.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server could not be reached within the retry budget.
    #[error("server unreachable after {attempts} attempts: {last_error}")]
    Connectivity { attempts: u32, last_error: String },

    /// The server answered a registration with a non-success status.
    #[error("webhook registration rejected ({status}): {body}")]
    Registration { status: u16, body: String },

    /// A single request failed at the transport level (not retried).
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("could not serve webhook receiver: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
