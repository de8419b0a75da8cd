//! Wiring shared by every command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tasklane_application::{Route, SessionManager, TaskListController, resolve};
use tasklane_core::config::API_URL_ENV;
use tasklane_infrastructure::{
    ConfigService, HttpRemoteClient, PersistedSessionStore, TasklanePaths,
};
use tracing::debug;

/// Flags that apply to every subcommand.
pub struct GlobalOptions {
    pub api_url: Option<String>,
    pub data_dir: Option<PathBuf>,
}

pub struct AppContext {
    pub session: Arc<SessionManager>,
    pub tasks: TaskListController,
}

impl AppContext {
    /// Resolves configuration once and connects the session and task list
    /// to the API.
    pub fn build(options: &GlobalOptions) -> Result<Self> {
        let paths = TasklanePaths::new(options.data_dir.as_deref());

        let env_url = std::env::var(API_URL_ENV).ok();
        let config = ConfigService::new(paths.clone())
            .resolve(options.api_url.as_deref(), env_url.as_deref())
            .context("Failed to resolve the API URL")?;
        debug!(api_url = %config.api_url, "Resolved configuration");

        let remote = Arc::new(HttpRemoteClient::from_config(&config)?);
        let store = Arc::new(
            PersistedSessionStore::open(&paths).context("Failed to locate the session file")?,
        );

        let session = Arc::new(SessionManager::new(remote.clone(), store));
        let tasks = TaskListController::new(remote, session.clone());

        Ok(Self { session, tasks })
    }

    /// Where a request for `route` ends up with the current session.
    pub fn land_on(&self, route: Route) -> Route {
        resolve(&route, self.session.is_authenticated())
    }
}
