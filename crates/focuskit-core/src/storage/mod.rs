mod config;
pub mod database;
pub mod kv;

pub use config::{Config, LoggingConfig, NotificationsConfig, TimerConfig};
pub use database::SqliteStore;
pub use kv::{load_json, save_json, KeyValueStore, MemoryStore, StoreKey};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns the data directory, creating it if needed.
///
/// `FOCUSKIT_DATA_DIR` wins when set. Otherwise `~/.config/focuskit/`, or
/// `~/.config/focuskit-dev/` when `FOCUSKIT_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("FOCUSKIT_DATA_DIR") {
        Some(explicit) => PathBuf::from(explicit),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("FOCUSKIT_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("focuskit-dev")
            } else {
                base_dir.join("focuskit")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
