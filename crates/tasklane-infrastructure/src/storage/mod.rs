//! Storage layer for atomic file operations and durable key-value entries.

mod atomic_toml;
mod key_value;

pub use atomic_toml::AtomicTomlFile;
pub use key_value::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
