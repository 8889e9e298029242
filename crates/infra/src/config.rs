//! Server configuration.
//!
//! Values come from construction-time defaults, optionally overridden by
//! `VTRANS_*` environment variables (see [`ServerConfig::from_env`]).

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use rand::Rng;
use thiserror::Error;

use crate::jobs::RetryPolicy;

/// Configuration error (fatal at startup).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    pub fn invalid(key: &'static str, value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            value: value.into(),
            reason: reason.into(),
        }
    }
}

/// How long the simulated translation takes, in time-units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TranslationLength {
    Fixed(u64),
    /// Drawn uniformly from `[min, max]` once at startup.
    Between { min: f64, max: f64 },
}

impl TranslationLength {
    pub fn resolve(&self, time_unit: Duration, rng: &mut impl Rng) -> Duration {
        match *self {
            TranslationLength::Fixed(units) => time_unit.saturating_mul(units.min(u32::MAX as u64) as u32),
            TranslationLength::Between { min, max } => {
                let units = if max > min { rng.random_range(min..=max) } else { min };
                units_to_duration(time_unit, units).unwrap_or(Duration::MAX)
            }
        }
    }
}

/// `units` time-units as a `Duration`; `None` for negative, NaN or
/// unrepresentable values.
fn units_to_duration(time_unit: Duration, units: f64) -> Option<Duration> {
    Duration::try_from_secs_f64(time_unit.as_secs_f64() * units).ok()
}

/// Server configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub error_probability: f64,
    pub length_of_translation: TranslationLength,
    pub retry_attempts: u32,
    /// Length of one time-unit (timer tick, backoff step).
    pub time_unit: Duration,
    /// Per-request timeout for webhook calls.
    pub request_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
            error_probability: 0.1,
            length_of_translation: TranslationLength::Fixed(20),
            retry_attempts: 5,
            time_unit: Duration::from_secs(1),
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl ServerConfig {
    pub fn with_error_probability(mut self, p: f64) -> Self {
        self.error_probability = p;
        self
    }

    pub fn with_length_of_translation(mut self, units: u64) -> Self {
        self.length_of_translation = TranslationLength::Fixed(units);
        self
    }

    pub fn with_delay_range(mut self, min: f64, max: f64) -> Self {
        self.length_of_translation = TranslationLength::Between { min, max };
        self
    }

    pub fn with_retry_attempts(mut self, attempts: u32) -> Self {
        self.retry_attempts = attempts;
        self
    }

    pub fn with_time_unit(mut self, unit: Duration) -> Self {
        self.time_unit = unit;
        self
    }

    pub fn with_bind_addr(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary variable lookup (tests pass a map).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let min_delay: Option<f64> = lookup_parsed(&lookup, "VTRANS_MIN_DELAY")?;
        let max_delay: Option<f64> = lookup_parsed(&lookup, "VTRANS_MAX_DELAY")?;
        let length_of_translation = match (min_delay, max_delay) {
            (Some(min), Some(max)) => TranslationLength::Between { min, max },
            (None, None) => TranslationLength::Fixed(
                lookup_parsed(&lookup, "VTRANS_LENGTH_OF_TRANSLATION")?.unwrap_or(20),
            ),
            _ => {
                return Err(ConfigError::invalid(
                    "VTRANS_MIN_DELAY",
                    "",
                    "VTRANS_MIN_DELAY and VTRANS_MAX_DELAY must be set together",
                ));
            }
        };

        let config = Self {
            bind_addr: lookup_parsed(&lookup, "VTRANS_BIND_ADDR")?.unwrap_or(defaults.bind_addr),
            error_probability: lookup_parsed(&lookup, "VTRANS_ERROR_PROBABILITY")?
                .unwrap_or(defaults.error_probability),
            length_of_translation,
            retry_attempts: lookup_parsed(&lookup, "VTRANS_RETRY_ATTEMPTS")?.unwrap_or(defaults.retry_attempts),
            time_unit: lookup_parsed(&lookup, "VTRANS_TIME_UNIT_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.time_unit),
            request_timeout: lookup_parsed(&lookup, "VTRANS_REQUEST_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.error_probability) {
            return Err(ConfigError::invalid(
                "VTRANS_ERROR_PROBABILITY",
                self.error_probability.to_string(),
                "must be within [0, 1]",
            ));
        }

        if self.time_unit.is_zero() {
            return Err(ConfigError::invalid("VTRANS_TIME_UNIT_MS", "0", "must be positive"));
        }

        if let TranslationLength::Between { min, max } = self.length_of_translation {
            let range = format!("{min}..{max}");
            if !min.is_finite() || !max.is_finite() || min < 0.0 || max < min {
                return Err(ConfigError::invalid(
                    "VTRANS_MAX_DELAY",
                    range,
                    "expected finite 0 <= min <= max",
                ));
            }
            if units_to_duration(self.time_unit, max).is_none() {
                return Err(ConfigError::invalid("VTRANS_MAX_DELAY", range, "delay is too long"));
            }
        }

        Ok(())
    }

    /// Duration of the job for this process (draws once for a delay range).
    pub fn resolve_job_duration(&self) -> Duration {
        self.length_of_translation
            .resolve(self.time_unit, &mut rand::rng())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::webhook_delivery(self.retry_attempts, self.time_unit)
    }
}

/// Look up `key` and parse it; unset or blank values are `None`.
pub fn lookup_parsed<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::invalid(key, raw, e.to_string())),
    }
}
