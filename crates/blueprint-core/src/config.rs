//! Application configuration.
//!
//! Loaded from environment variables (and a `.env` file when present) using
//! the `config` and `dotenvy` crates. Variables use the `BLUEPRINT` prefix and
//! `__` between nested keys:
//!
//! - `BLUEPRINT__HTTP__BASE_URL=https://api.example.com/v1` -> `http.base_url`
//! - `BLUEPRINT__USE_CASE__IDLE_DELAY_MS=250` -> `use_case.idle_delay_ms`
//! - `BLUEPRINT__RETRY__MAX_ATTEMPTS=5` -> `retry.max_attempts`
//!
//! Every value has a default, so an empty environment is a valid configuration.

use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;

use crate::app::{ExecutionPolicy, RetryPolicy};

const ENV_PREFIX: &str = "BLUEPRINT";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub use_case: UseCaseConfig,

    #[serde(default)]
    pub retry: RetrySettings,
}

/// HTTP client settings.
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Sent as `Authorization: Bearer ...` when set.
    #[serde(default)]
    pub bearer_token: Option<String>,
}

/// Use case lifecycle settings.
#[derive(Debug, Clone, Deserialize)]
pub struct UseCaseConfig {
    /// Pause between the terminal callback and `idle`.
    #[serde(default = "default_idle_delay_ms")]
    pub idle_delay_ms: u64,

    #[serde(default)]
    pub policy: ExecutionPolicy,
}

/// Caller-side retry settings.
#[derive(Debug, Clone, Deserialize)]
pub struct RetrySettings {
    #[serde(default = "default_retry_base_delay_ms")]
    pub base_delay_ms: u64,

    #[serde(default = "default_retry_multiplier")]
    pub multiplier: f64,

    #[serde(default = "default_retry_max_attempts")]
    pub max_attempts: u32,
}

fn default_base_url() -> String {
    "http://localhost:8080/".to_string()
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_user_agent() -> String {
    concat!("blueprint/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_idle_delay_ms() -> u64 {
    100
}

fn default_retry_base_delay_ms() -> u64 {
    500
}

fn default_retry_multiplier() -> f64 {
    2.0
}

fn default_retry_max_attempts() -> u32 {
    3
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
            user_agent: default_user_agent(),
            bearer_token: None,
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for UseCaseConfig {
    fn default() -> Self {
        Self {
            idle_delay_ms: default_idle_delay_ms(),
            policy: ExecutionPolicy::default(),
        }
    }
}

impl UseCaseConfig {
    pub fn idle_delay(&self) -> Duration {
        Duration::from_millis(self.idle_delay_ms)
    }
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            base_delay_ms: default_retry_base_delay_ms(),
            multiplier: default_retry_multiplier(),
            max_attempts: default_retry_max_attempts(),
        }
    }
}

impl RetrySettings {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            base_delay: Duration::from_millis(self.base_delay_ms),
            multiplier: self.multiplier,
            max_attempts: self.max_attempts,
        }
    }
}

impl AppConfig {
    /// Load configuration from `.env` (if present) and the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_environment(None)
    }

    /// Load from an explicit variable map instead of the process environment.
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, ConfigError> {
        Self::from_environment(Some(vars))
    }

    fn from_environment(vars: Option<HashMap<String, String>>) -> Result<Self, ConfigError> {
        let config = config::Config::builder()
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true)
                    .source(vars),
            )
            .build()?
            .try_deserialize()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.http.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("http.base_url must not be empty".into()));
        }
        if self.http.timeout_ms == 0 {
            return Err(ConfigError::Invalid("http.timeout_ms must be positive".into()));
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::Invalid("retry.max_attempts must be at least 1".into()));
        }
        if !self.retry.multiplier.is_finite() || self.retry.multiplier < 1.0 {
            return Err(ConfigError::Invalid("retry.multiplier must be >= 1.0".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let config = AppConfig::from_vars(HashMap::new()).unwrap();
        assert_eq!(config.http.timeout_ms, 30_000);
        assert_eq!(config.use_case.idle_delay(), Duration::from_millis(100));
        assert_eq!(config.use_case.policy, ExecutionPolicy::Concurrent);
        assert_eq!(config.retry.max_attempts, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn nested_values_are_read_from_prefixed_vars() {
        let config = AppConfig::from_vars(vars(&[
            ("BLUEPRINT__HTTP__BASE_URL", "https://api.example.com/v1"),
            ("BLUEPRINT__HTTP__TIMEOUT_MS", "5000"),
            ("BLUEPRINT__USE_CASE__IDLE_DELAY_MS", "250"),
            ("BLUEPRINT__USE_CASE__POLICY", "cancel_previous"),
            ("BLUEPRINT__RETRY__MAX_ATTEMPTS", "5"),
        ]))
        .unwrap();

        assert_eq!(config.http.base_url, "https://api.example.com/v1");
        assert_eq!(config.http.timeout(), Duration::from_secs(5));
        assert_eq!(config.use_case.idle_delay_ms, 250);
        assert_eq!(config.use_case.policy, ExecutionPolicy::CancelPrevious);
        assert_eq!(config.retry.policy().max_attempts, 5);
    }

    #[test]
    fn validation_rejects_zero_attempts() {
        let mut config = AppConfig::default();
        config.retry.max_attempts = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }
}
