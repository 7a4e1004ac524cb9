//! Runtime configuration.
//!
//! Defaults match the catalog backend's development setup. Every field can be
//! overridden from the environment with [`SyncConfig::from_env`], or the whole
//! struct deserialized from whatever format the embedding application uses.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::collection::OrderingPolicy;
use crate::transport::http::DEFAULT_API_URL;

pub const ENV_API_URL: &str = "MOVIE_SYNC_API_URL";
pub const ENV_PAGE_SIZE: &str = "MOVIE_SYNC_PAGE_SIZE";
pub const ENV_DEBOUNCE_MS: &str = "MOVIE_SYNC_DEBOUNCE_MS";
pub const ENV_TIMEOUT_MS: &str = "MOVIE_SYNC_TIMEOUT_MS";
pub const ENV_ORDERING: &str = "MOVIE_SYNC_ORDERING";

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("{var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub api_url: String,
    pub page_size: u32,
    pub debounce_ms: u64,
    pub request_timeout_ms: u64,
    pub ordering: OrderingPolicy,
    pub channel_capacity: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            page_size: 10,
            debounce_ms: 300,
            request_timeout_ms: 30_000,
            ordering: OrderingPolicy::Strict,
            channel_capacity: 32,
        }
    }
}

impl SyncConfig {
    /// Defaults overlaid with any `MOVIE_SYNC_*` variables that are set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(url) = lookup(ENV_API_URL) {
            config.api_url = url;
        }
        if let Some(v) = lookup(ENV_PAGE_SIZE) {
            config.page_size = parse(ENV_PAGE_SIZE, &v)?;
        }
        if let Some(v) = lookup(ENV_DEBOUNCE_MS) {
            config.debounce_ms = parse(ENV_DEBOUNCE_MS, &v)?;
        }
        if let Some(v) = lookup(ENV_TIMEOUT_MS) {
            config.request_timeout_ms = parse(ENV_TIMEOUT_MS, &v)?;
        }
        if let Some(v) = lookup(ENV_ORDERING) {
            config.ordering = v.parse().map_err(|reason| ConfigError::Invalid {
                var: ENV_ORDERING,
                reason,
            })?;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::Invalid {
                var: ENV_PAGE_SIZE,
                reason: "must be at least 1".into(),
            });
        }
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                var: ENV_TIMEOUT_MS,
                reason: "must be at least 1".into(),
            });
        }
        if self.channel_capacity == 0 {
            return Err(ConfigError::Invalid {
                var: "channel_capacity",
                reason: "must be at least 1".into(),
            });
        }
        Ok(())
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

fn parse<T: std::str::FromStr>(var: &'static str, value: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        var,
        reason: e.to_string(),
    })
}
