use std::time::Duration;

use serde::Deserialize;

/// Default base URL for the Mailgun API (US region).
pub const DEFAULT_API_URL: &str = "https://api.mailgun.net/v3";

/// Configuration for the Mailgun backend.
///
/// # Example
///
/// ```toml
/// [mailgun]
/// api_key = "key-..."
/// api_url = "https://api.eu.mailgun.net/v3"
/// timeout_seconds = 10
/// ```
#[derive(Clone, Deserialize)]
pub struct MailgunConfig {
    /// Mailgun private API key, sent as the Basic-auth password for user `api`.
    pub api_key: String,

    /// Base URL for the Mailgun API. Override this for the EU region or for
    /// testing against a mock server.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_owned()
}

fn default_timeout_seconds() -> u64 {
    30
}

impl std::fmt::Debug for MailgunConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailgunConfig")
            .field("api_key", &"[REDACTED]")
            .field("api_url", &self.api_url)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

impl MailgunConfig {
    /// Create a new configuration with the given API key.
    ///
    /// Uses the default Mailgun API base URL (`https://api.mailgun.net/v3`).
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_url: default_api_url(),
            timeout_seconds: default_timeout_seconds(),
        }
    }

    /// Override the API base URL.
    #[must_use]
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    /// Override the request timeout.
    #[must_use]
    pub fn with_timeout_seconds(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// The API base URL, always ending with `/`.
    pub fn normalized_api_url(&self) -> String {
        if self.api_url.ends_with('/') {
            self.api_url.clone()
        } else {
            format!("{}/", self.api_url)
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}
