use serde::Deserialize;
use shared::config::Listener;
use thiserror::Error;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://proxy01.yamanashi.dev";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("invalid listener: {0}")]
    Listener(#[from] shared::config::ValidationError),

    #[error("Upstream timeout cannot be 0")]
    InvalidTimeout,

    #[error("Upstream base URL must be http or https: {0}")]
    UnsupportedScheme(String),
}

/// Event API configuration
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub listener: Listener,
    #[serde(default)]
    pub upstream: UpstreamConfig,
}

impl Config {
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.listener.validate()?;
        self.upstream.validate()
    }
}

/// Where the connpass compatible events API lives.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct UpstreamConfig {
    /// Base URL, `/events/` is appended. The official API is
    /// `https://connpass.com/api/v2`.
    #[serde(default = "default_base_url")]
    pub base_url: Url,
    /// Applies to the whole upstream request, including reading the body.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        UpstreamConfig {
            base_url: default_base_url(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl UpstreamConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        match self.base_url.scheme() {
            "http" | "https" => Ok(()),
            other => Err(ValidationError::UnsupportedScheme(other.to_string())),
        }
    }
}

fn default_base_url() -> Url {
    Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid")
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
