//! Client configuration.

use serde::{Deserialize, Serialize};

/// Base URL used when nothing else is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:4000";

/// Environment variable that overrides the configured base URL.
pub const API_URL_ENV: &str = "TASKLANE_API_URL";

/// Per-request timeout used when the config file does not set one.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Contents of `config.toml`.
///
/// Every field is optional on disk; missing values fall back to defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the task API, without a trailing slash.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Timeout applied to each request, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config: ClientConfig = toml::from_str("").unwrap();
        assert_eq!(config, ClientConfig::default());

        let config: ClientConfig = toml::from_str(r#"api_url = "https://todo.example.com""#).unwrap();
        assert_eq!(config.api_url, "https://todo.example.com");
        assert_eq!(config.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
    }
}
