//! # Client Configuration
//!
//! Where the backend lives and how the client identifies itself.
//!
//! ## Usage
//!
//! ```
//! use etiket::config::ClientConfig;
//!
//! let config = ClientConfig::new("http://printer-host:5000/").unwrap();
//! assert_eq!(config.endpoint("/api/label/print"), "http://printer-host:5000/api/label/print");
//! ```

use reqwest::Url;

use crate::error::EtiketError;

/// Environment variable that overrides the backend base URL.
pub const BACKEND_URL_ENV: &str = "ETIKET_BACKEND_URL";

/// Backend address used when nothing else is configured.
pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:5000";

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL without a trailing slash (e.g., "http://127.0.0.1:5000")
    pub base_url: String,
    /// User agent sent with every request
    pub user_agent: String,
}

impl ClientConfig {
    /// Build a configuration for the given backend URL.
    ///
    /// The URL must be absolute http(s); trailing slashes are dropped.
    pub fn new(base_url: &str) -> Result<Self, EtiketError> {
        let trimmed = base_url.trim().trim_end_matches('/');
        let url = Url::parse(trimmed)
            .map_err(|e| EtiketError::Config(format!("invalid backend URL '{}': {}", base_url, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(EtiketError::Config(format!(
                "backend URL must be http or https, got '{}'",
                url.scheme()
            )));
        }
        Ok(Self {
            base_url: trimmed.to_string(),
            user_agent: format!("etiket/{}", env!("CARGO_PKG_VERSION")),
        })
    }

    /// Configuration from `ETIKET_BACKEND_URL`, or the default address.
    pub fn from_env() -> Result<Self, EtiketError> {
        match std::env::var(BACKEND_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => Self::new(&url),
            _ => Self::new(DEFAULT_BACKEND_URL),
        }
    }

    /// Absolute URL for an API path.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BACKEND_URL.to_string(),
            user_agent: format!("etiket/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}
