//! Client configuration.
//!
//! Defaults, then an optional TOML document, then `TODOLIST_*` environment
//! variables, each layer overriding the previous one.

use std::env;

use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://social-network.samuraijs.com/api/1.1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid value for {name}: {value}")]
    InvalidEnv { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ClientConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    /// Defaults overridden by the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env_overrides(|name| env::var(name).ok())
    }

    /// Apply `TODOLIST_API_URL`, `TODOLIST_API_KEY` and
    /// `TODOLIST_TIMEOUT_SECS` from `lookup` on top of `self`.
    pub fn with_env_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(url) = lookup("TODOLIST_API_URL") {
            self.base_url = url;
        }
        if let Some(key) = lookup("TODOLIST_API_KEY") {
            self.api_key = Some(key);
        }
        if let Some(raw) = lookup("TODOLIST_TIMEOUT_SECS") {
            self.timeout_secs = raw.parse().map_err(|_| ConfigError::InvalidEnv {
                name: "TODOLIST_TIMEOUT_SECS",
                value: raw,
            })?;
        }
        Ok(self)
    }
}
