//! Engine configuration.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Environment variable overriding [`EngineConfig::lock_timeout`].
pub const LOCK_TIMEOUT_ENV: &str = "SIFT_LOCK_TIMEOUT_MS";

const DEFAULT_LOCK_TIMEOUT_MS: u64 = 2_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{name} must be a number of milliseconds, got {value:?}")]
    InvalidEnv { name: &'static str, value: String },

    #[error("lock timeout must be greater than zero")]
    ZeroLockTimeout,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawEngineConfig")]
pub struct EngineConfig {
    /// Longest wait for a contended lock before giving up with a conflict.
    pub lock_timeout: Duration,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawEngineConfig {
    #[serde(default = "default_lock_timeout_ms")]
    lock_timeout_ms: u64,
}

fn default_lock_timeout_ms() -> u64 {
    DEFAULT_LOCK_TIMEOUT_MS
}

impl From<RawEngineConfig> for EngineConfig {
    fn from(raw: RawEngineConfig) -> Self {
        Self {
            lock_timeout: Duration::from_millis(raw.lock_timeout_ms),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lock_timeout: Duration::from_millis(DEFAULT_LOCK_TIMEOUT_MS),
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Apply overrides from the process environment.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(value) = lookup(LOCK_TIMEOUT_ENV) {
            let ms: u64 = value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                name: LOCK_TIMEOUT_ENV,
                value: value.clone(),
            })?;
            self.lock_timeout = Duration::from_millis(ms);
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lock_timeout.is_zero() {
            return Err(ConfigError::ZeroLockTimeout);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_defaults_missing_fields() {
        let config = EngineConfig::from_json("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.lock_timeout, Duration::from_secs(2));
    }

    #[test]
    fn json_sets_lock_timeout() {
        let config = EngineConfig::from_json(r#"{"lock_timeout_ms": 150}"#).unwrap();
        assert_eq!(config.lock_timeout, Duration::from_millis(150));
    }

    #[test]
    fn json_rejects_unknown_fields() {
        let err = EngineConfig::from_json(r#"{"lock_timeout": 1}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn env_override_replaces_value() {
        let config = EngineConfig::default()
            .with_overrides(|name| (name == LOCK_TIMEOUT_ENV).then(|| "75".to_string()))
            .unwrap();
        assert_eq!(config.lock_timeout, Duration::from_millis(75));
    }

    #[test]
    fn env_override_must_be_numeric() {
        let err = EngineConfig::default()
            .with_overrides(|_| Some("soon".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { .. }));
    }

    #[test]
    fn zero_timeout_is_invalid() {
        let config = EngineConfig {
            lock_timeout: Duration::ZERO,
        };
        assert!(matches!(config.validate(), Err(ConfigError::ZeroLockTimeout)));
    }
}
