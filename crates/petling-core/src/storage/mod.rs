pub mod database;
pub mod memory;

pub use database::{ActionRecord, Database, Stats};
pub use memory::MemoryStore;

use std::path::PathBuf;

use crate::error::StoreError;

/// Durable key-value store contract.
///
/// Two logical keys drive the quiet-time gate (`quiet_window`,
/// `quiet_deadline`); the session snapshot lives under a third. Reads return
/// `None` for missing keys; callers treat malformed payloads as missing.
pub trait StateStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn delete(&self, key: &str) -> Result<(), StoreError>;
}

impl<T: StateStore + ?Sized> StateStore for &T {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        (**self).delete(key)
    }
}

/// Returns `~/.config/petling[-dev]/` based on PETLING_ENV.
///
/// Set PETLING_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if the home directory cannot be determined or if
/// creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("PETLING_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("petling-dev")
    } else {
        base_dir.join("petling")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
