//! Configuration service implementation.
//!
//! Loads the client configuration from `config.toml` once and resolves the
//! effective API base URL against the command line and environment.

use std::sync::{Arc, PoisonError, RwLock};

use tasklane_core::config::{ClientConfig, DEFAULT_API_URL, DEFAULT_REQUEST_TIMEOUT_SECS};
use tasklane_core::{Result, TasklaneError};
use tracing::{debug, warn};
use url::Url;

use crate::paths::TasklanePaths;
use crate::storage::AtomicTomlFile;

/// Configuration service that loads and caches the client configuration.
#[derive(Clone)]
pub struct ConfigService {
    paths: TasklanePaths,
    config: Arc<RwLock<Option<ClientConfig>>>,
}

impl ConfigService {
    /// Creates a service reading `config.toml` under `paths`.
    ///
    /// Nothing is read until the first call to [`ConfigService::get_config`].
    pub fn new(paths: TasklanePaths) -> Self {
        Self {
            paths,
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Returns the file configuration, loading it on first access.
    ///
    /// A missing file yields the defaults. An unreadable one is logged and
    /// also yields the defaults.
    pub fn get_config(&self) -> ClientConfig {
        {
            let cached = self.config.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(config) = cached.as_ref() {
                return config.clone();
            }
        }

        let loaded = match self.load_config() {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %e, "Failed to read config file; using defaults");
                ClientConfig::default()
            }
        };

        let mut cached = self.config.write().unwrap_or_else(PoisonError::into_inner);
        *cached = Some(loaded.clone());
        loaded
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        let mut cached = self.config.write().unwrap_or_else(PoisonError::into_inner);
        *cached = None;
    }

    /// Returns the effective configuration with the base URL resolved.
    ///
    /// `flag` is the command line value and `env` the environment value;
    /// both take precedence over the file. A zero timeout falls back to the
    /// default.
    pub fn resolve(&self, flag: Option<&str>, env: Option<&str>) -> Result<ClientConfig> {
        let mut config = self.get_config();
        config.api_url = resolve_api_url(flag, env, &config)?;
        if config.request_timeout_secs == 0 {
            warn!(
                default = DEFAULT_REQUEST_TIMEOUT_SECS,
                "request_timeout_secs must be positive; using the default"
            );
            config.request_timeout_secs = DEFAULT_REQUEST_TIMEOUT_SECS;
        }
        Ok(config)
    }

    fn load_config(&self) -> Result<ClientConfig> {
        let path = self.paths.config_file()?;
        let file = AtomicTomlFile::<ClientConfig>::new(path);
        match file.load()? {
            Some(config) => {
                debug!(path = %file.path().display(), "Loaded config file");
                Ok(config)
            }
            None => Ok(ClientConfig::default()),
        }
    }
}

/// Picks the base URL: command line, then environment, then config file,
/// then the built-in default. Blank values are skipped.
///
/// The chosen URL must be absolute http(s); trailing slashes are removed.
pub fn resolve_api_url(
    flag: Option<&str>,
    env: Option<&str>,
    config: &ClientConfig,
) -> Result<String> {
    let chosen = [flag, env, Some(config.api_url.as_str())]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|candidate| !candidate.is_empty())
        .unwrap_or(DEFAULT_API_URL);

    normalize_api_url(chosen)
}

fn normalize_api_url(raw: &str) -> Result<String> {
    let url = Url::parse(raw)
        .map_err(|e| TasklaneError::config(format!("Invalid API URL '{}': {}", raw, e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(TasklaneError::config(format!(
            "API URL '{}' must use http or https",
            raw
        )));
    }

    Ok(raw.trim_end_matches('/').to_string())
}
