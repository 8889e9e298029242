//! Client configuration (defaults overridable via `VTRANS_*` variables).

use std::str::FromStr;
use std::time::Duration;

use vtrans_infra::{lookup_parsed, ConfigError, RetryPolicy};

/// How the binary waits for the job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ClientMode {
    #[default]
    Poll,
    Webhook,
}

impl FromStr for ClientMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "poll" | "polling" => Ok(ClientMode::Poll),
            "webhook" => Ok(ClientMode::Webhook),
            other => Err(format!("expected poll or webhook, got {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub server_url: String,
    /// Wait between polls while the job is pending, in time-units.
    pub polling_interval: u64,
    /// Attempts per status fetch before giving up.
    pub max_retries: u32,
    pub webhook_host: String,
    pub webhook_port: u16,
    pub time_unit: Duration,
    pub request_timeout: Duration,
    pub mode: ClientMode,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:8000".to_string(),
            polling_interval: 5,
            max_retries: 5,
            webhook_host: "localhost".to_string(),
            webhook_port: 8001,
            time_unit: Duration::from_secs(1),
            request_timeout: Duration::from_secs(10),
            mode: ClientMode::Poll,
        }
    }
}

impl ClientConfig {
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            ..Default::default()
        }
    }

    pub fn with_webhook(mut self, host: impl Into<String>, port: u16) -> Self {
        self.webhook_host = host.into();
        self.webhook_port = port;
        self
    }

    pub fn with_polling_interval(mut self, units: u64) -> Self {
        self.polling_interval = units;
        self
    }

    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    pub fn with_time_unit(mut self, unit: Duration) -> Self {
        self.time_unit = unit;
        self
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let d = Self::default();

        Ok(Self {
            server_url: lookup_parsed(&lookup, "VTRANS_SERVER_URL")?
                .map(|u: String| u.trim_end_matches('/').to_string())
                .unwrap_or(d.server_url),
            polling_interval: lookup_parsed(&lookup, "VTRANS_POLLING_INTERVAL")?.unwrap_or(d.polling_interval),
            max_retries: lookup_parsed(&lookup, "VTRANS_MAX_RETRIES")?.unwrap_or(d.max_retries),
            webhook_host: lookup_parsed(&lookup, "VTRANS_WEBHOOK_HOST")?.unwrap_or(d.webhook_host),
            webhook_port: lookup_parsed(&lookup, "VTRANS_WEBHOOK_PORT")?.unwrap_or(d.webhook_port),
            time_unit: lookup_parsed(&lookup, "VTRANS_TIME_UNIT_MS")?
                .map(Duration::from_millis)
                .unwrap_or(d.time_unit),
            request_timeout: lookup_parsed(&lookup, "VTRANS_REQUEST_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(d.request_timeout),
            mode: lookup_parsed(&lookup, "VTRANS_CLIENT_MODE")?.unwrap_or(d.mode),
        })
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::status_polling(self.max_retries, self.time_unit)
    }

    pub fn polling_interval(&self) -> Duration {
        self.time_unit.saturating_mul(self.polling_interval.min(u32::MAX as u64) as u32)
    }

    /// URL the server should call back.
    pub fn webhook_url(&self) -> String {
        format!("http://{}:{}/webhook", self.webhook_host, self.webhook_port)
    }
}
