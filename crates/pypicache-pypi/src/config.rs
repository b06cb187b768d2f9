//! Upstream index configuration.
//!
//! Defaults point at the public PyPI. Override via environment variables or
//! explicit construction for tests and private mirrors.

use url::Url;

/// Default upstream package index.
pub const DEFAULT_INDEX_URL: &str = "https://pypi.org/";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for talking to an upstream package index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PyPiConfig {
    /// Index root. Always ends with `/`.
    pub index_url: Url,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl PyPiConfig {
    /// Point at `index_url` with the default timeout.
    pub fn new(index_url: Url) -> Self {
        Self {
            index_url: with_trailing_slash(index_url),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Parse `raw` as the index root.
    pub fn from_url_str(raw: &str) -> Result<Self, ConfigError> {
        let url = Url::parse(raw)
            .map_err(|e| ConfigError::InvalidUrl(raw.to_string(), e.to_string()))?;
        Ok(Self::new(url))
    }

    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `PYPI_INDEX_URL` (default: `https://pypi.org/`)
    /// - `PYPI_TIMEOUT_SECS` (default: 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            index_url: with_trailing_slash(env_url("PYPI_INDEX_URL", DEFAULT_INDEX_URL)?),
            timeout_secs: std::env::var("PYPI_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        })
    }

    /// Replace the timeout.
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

fn env_url(var: &str, default: &str) -> Result<Url, ConfigError> {
    let raw = std::env::var(var).unwrap_or_else(|_| default.to_string());
    Url::parse(&raw).map_err(|e| ConfigError::InvalidUrl(var.to_string(), e.to_string()))
}

/// Relative joins against the index root only work when it ends with `/`.
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
}
