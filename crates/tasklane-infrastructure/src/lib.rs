pub mod config_service;
pub mod dto;
pub mod http_client;
pub mod paths;
pub mod persisted_session_store;
pub mod storage;

pub use crate::config_service::ConfigService;
pub use crate::http_client::HttpRemoteClient;
pub use crate::paths::TasklanePaths;
pub use crate::persisted_session_store::PersistedSessionStore;
pub use crate::storage::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
