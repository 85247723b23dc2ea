//! Central module for application-wide configuration settings.
//!
//! Settings are read from environment variables: server port, the external
//! backend base URL, the OAuth client identifier, the deployment environment
//! and the cache invalidation policy. The URL and client id are opaque strings
//! and are passed through unvalidated.

use std::{env, fmt::Display, str::FromStr, time::Duration};

use thiserror::Error;
use tracing::info;

use crate::services::invalidation::{FailurePolicy, InvalidationStrategy};

pub const PORT: &str = "FITCOACH_PORT";
pub const API_URL: &str = "FITCOACH_API_URL";
pub const OAUTH_CLIENT_ID: &str = "FITCOACH_OAUTH_CLIENT_ID";
pub const ENVIRONMENT: &str = "FITCOACH_ENV";
pub const INVALIDATION_STRATEGY: &str = "FITCOACH_INVALIDATION_STRATEGY";
pub const INVALIDATION_MAX_ATTEMPTS: &str = "FITCOACH_INVALIDATION_MAX_ATTEMPTS";
pub const INVALIDATION_BASE_DELAY_MS: &str = "FITCOACH_INVALIDATION_BASE_DELAY_MS";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid {key} value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => Err(format!("unknown environment {other}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub api_url: String,
    pub oauth_client_id: String,
    pub environment: Environment,
    pub invalidation: FailurePolicy,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let strategy: InvalidationStrategy = try_load(&lookup, INVALIDATION_STRATEGY, "await")?;
        let max_attempts: u32 = try_load(&lookup, INVALIDATION_MAX_ATTEMPTS, "5")?;
        let base_delay_ms: u64 = try_load(&lookup, INVALIDATION_BASE_DELAY_MS, "500")?;

        Ok(Self {
            port: try_load(&lookup, PORT, "3000")?,
            api_url: try_load(&lookup, API_URL, "http://localhost:8000")?,
            oauth_client_id: try_load(&lookup, OAUTH_CLIENT_ID, "")?,
            environment: try_load(&lookup, ENVIRONMENT, "development")?,
            invalidation: FailurePolicy::for_strategy(
                strategy,
                max_attempts,
                Duration::from_millis(base_delay_ms),
            ),
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}

fn try_load<F, T>(lookup: &F, key: &'static str, default: &str) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    let value = lookup(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default:?}");
        default.to_string()
    });

    value.parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        value,
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = Config::from_lookup(lookup(&[])).unwrap();

        assert_eq!(config.port, 3000);
        assert_eq!(config.api_url, "http://localhost:8000");
        assert_eq!(config.oauth_client_id, "");
        assert!(!config.is_production());
        assert_eq!(config.invalidation, FailurePolicy::default());
    }

    #[test]
    fn reads_every_variable() {
        let config = Config::from_lookup(lookup(&[
            (PORT, "8080"),
            (API_URL, "https://api.fitcoach.test/"),
            (OAUTH_CLIENT_ID, "client-123.apps"),
            (ENVIRONMENT, "production"),
            (INVALIDATION_STRATEGY, "backoff"),
            (INVALIDATION_MAX_ATTEMPTS, "3"),
            (INVALIDATION_BASE_DELAY_MS, "250"),
        ]))
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.api_url, "https://api.fitcoach.test/");
        assert_eq!(config.oauth_client_id, "client-123.apps");
        assert!(config.is_production());
        assert_eq!(config.invalidation.strategy, InvalidationStrategy::ExponentialBackoff);
        assert_eq!(config.invalidation.max_attempts, 3);
        assert_eq!(config.invalidation.delays, vec![Duration::from_millis(250)]);
    }

    #[test]
    fn malformed_port_is_rejected() {
        let err = Config::from_lookup(lookup(&[(PORT, "eighty")])).unwrap_err();
        let ConfigError::Invalid { key, value, .. } = err;

        assert_eq!(key, PORT);
        assert_eq!(value, "eighty");
    }

    #[test]
    fn unknown_environment_is_rejected() {
        assert!(Config::from_lookup(lookup(&[(ENVIRONMENT, "staging")])).is_err());
    }
}
