//! # Storage Layer
//!
//! Durable key-value storage, snapshot formats and configuration.
//!
//! ## Storage Layout
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Tasks | Versioned JSON snapshot | `{data_dir}/todo-storage.json` |
//! | Preferences | JSON | `{data_dir}/ui-storage.json` |
//! | Config | TOML | `{config_dir}/config.toml` |
//!
//! ## Concurrency Safety
//!
//! - [`FileStore`] takes `fs2` locks while reading and writing
//! - All writes are atomic (temp file + rename)
//!
//! ## Key Types
//!
//! - [`KeyValueStore`] - The storage primitive the stores persist through
//! - [`FileStore`] / [`MemoryStore`] - Its two implementations
//! - [`Config`] - User configuration

mod config;
mod kv;
mod schema;

pub use config::{Config, ConfigError, OutputFormat, DATA_DIR_ENV};
pub use kv::{FileStore, KeyValueStore, MemoryStore, StorageError};
pub use schema::{
    decode_preferences, decode_tasks, encode_preferences, encode_tasks, SchemaError,
    PREFERENCES_KEY, SCHEMA_VERSION, TASKS_KEY,
};
