//! Credential and client configuration loading.
//!
//! Configuration is read once before any client exists and never changes
//! afterwards. Two sources are supported: a TOML file with a `[trello]`
//! table, and `TRELLO_*` environment variables.
//!
//! ```toml
//! [trello]
//! key = "0123abcd"
//! token = "ATTA..."
//! base_url = "https://api.trello.com/1/"   # optional
//! min_interval_ms = 100                     # optional
//! timeout_secs = 30                         # optional
//! ```

use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::rate_limit::DEFAULT_MIN_INTERVAL;

pub const DEFAULT_BASE_URL: &str = "https://api.trello.com/1/";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub const ENV_KEY: &str = "TRELLO_KEY";
pub const ENV_TOKEN: &str = "TRELLO_TOKEN";
pub const ENV_BASE_URL: &str = "TRELLO_BASE_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("missing configuration value: {0}")]
    Missing(&'static str),
}

/// API key, token and the endpoint they are valid for.
///
/// Neither key nor token is validated locally; the service rejects bad ones.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub key: String,
    pub token: String,
    pub base_url: String,
}

impl Credentials {
    pub fn new(key: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            token: token.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("key", &self.key)
            .field("token", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Everything needed to build a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub credentials: Credentials,
    pub min_interval: Duration,
    pub timeout: Duration,
}

#[derive(Deserialize)]
struct ConfigFile {
    trello: Option<TrelloSection>,
}

#[derive(Deserialize)]
struct TrelloSection {
    key: Option<String>,
    token: Option<String>,
    base_url: Option<String>,
    min_interval_ms: Option<u64>,
    timeout_secs: Option<u64>,
}

impl Config {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            min_interval: DEFAULT_MIN_INTERVAL,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(raw)?;
        let section = file.trello.ok_or(ConfigError::Missing("trello"))?;

        let key = section.key.ok_or(ConfigError::Missing("trello.key"))?;
        let token = section.token.ok_or(ConfigError::Missing("trello.token"))?;
        let mut credentials = Credentials::new(key, token);
        if let Some(base_url) = section.base_url {
            credentials.base_url = base_url;
        }

        Ok(Self {
            credentials,
            min_interval: section
                .min_interval_ms
                .map_or(DEFAULT_MIN_INTERVAL, Duration::from_millis),
            timeout: section.timeout_secs.map_or(DEFAULT_TIMEOUT, Duration::from_secs),
        })
    }

    /// Read `TRELLO_KEY`, `TRELLO_TOKEN` and optionally `TRELLO_BASE_URL`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let key = lookup(ENV_KEY).ok_or(ConfigError::Missing(ENV_KEY))?;
        let token = lookup(ENV_TOKEN).ok_or(ConfigError::Missing(ENV_TOKEN))?;
        let mut credentials = Credentials::new(key, token);
        if let Some(base_url) = lookup(ENV_BASE_URL) {
            credentials.base_url = base_url;
        }
        Ok(Self::new(credentials))
    }
}
