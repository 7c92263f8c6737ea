//! Key-value persistence contract.
//!
//! Every persisted value lives under one [`StoreKey`] and is stored as JSON
//! bytes. Reads and writes through [`load_json`] / [`save_json`] never fail
//! loudly: a missing, unreadable or corrupt value comes back as `None`, and a
//! failed write is logged and reported as `false`.

use std::collections::HashMap;
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use crate::error::StoreError;

/// Every key the application persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    LastSessionDuration,
    LastSessionDate,
    CurrentStreak,
    BestStreak,
    FocusedDays,
    Routines,
    Habits,
    /// Serialized focus-timer cycle driver between CLI invocations.
    FocusTimer,
}

impl StoreKey {
    pub const ALL: [StoreKey; 8] = [
        StoreKey::LastSessionDuration,
        StoreKey::LastSessionDate,
        StoreKey::CurrentStreak,
        StoreKey::BestStreak,
        StoreKey::FocusedDays,
        StoreKey::Routines,
        StoreKey::Habits,
        StoreKey::FocusTimer,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StoreKey::LastSessionDuration => "last_session_duration",
            StoreKey::LastSessionDate => "last_session_date",
            StoreKey::CurrentStreak => "current_streak",
            StoreKey::BestStreak => "best_streak",
            StoreKey::FocusedDays => "focused_days",
            StoreKey::Routines => "routines",
            StoreKey::Habits => "habits",
            StoreKey::FocusTimer => "focus_timer",
        }
    }
}

impl std::fmt::Display for StoreKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: StoreKey) -> Result<Option<Vec<u8>>, StoreError>;

    fn set(&self, key: StoreKey, value: &[u8]) -> Result<(), StoreError>;

    fn delete(&self, key: StoreKey) -> Result<(), StoreError>;
}

/// Read and decode a value, falling back to `None` on any failure.
pub fn load_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: StoreKey) -> Option<T> {
    let bytes = match store.get(key) {
        Ok(Some(bytes)) => bytes,
        Ok(None) => return None,
        Err(err) => {
            warn!(%key, error = %err, "store read failed, using default");
            return None;
        }
    };
    match serde_json::from_slice(&bytes) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(%key, error = %err, "stored value is corrupt, using default");
            None
        }
    }
}

/// Encode and write a value. Returns whether the write landed.
pub fn save_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: StoreKey,
    value: &T,
) -> bool {
    let bytes = match serde_json::to_vec(value) {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!(%key, error = %err, "could not encode value, not saved");
            return false;
        }
    };
    match store.set(key, &bytes) {
        Ok(()) => true,
        Err(err) => {
            warn!(%key, error = %err, "store write failed, keeping in-memory state");
            false
        }
    }
}

/// Process-local store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<StoreKey, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: StoreKey) -> Result<Option<Vec<u8>>, StoreError> {
        let values = self.values.lock().map_err(|_| StoreError::Locked)?;
        Ok(values.get(&key).cloned())
    }

    fn set(&self, key: StoreKey, value: &[u8]) -> Result<(), StoreError> {
        let mut values = self.values.lock().map_err(|_| StoreError::Locked)?;
        values.insert(key, value.to_vec());
        Ok(())
    }

    fn delete(&self, key: StoreKey) -> Result<(), StoreError> {
        let mut values = self.values.lock().map_err(|_| StoreError::Locked)?;
        values.remove(&key);
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Store whose every call fails.
    #[derive(Debug, Default)]
    pub struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: StoreKey) -> Result<Option<Vec<u8>>, StoreError> {
            Err(StoreError::QueryFailed("disk unavailable".into()))
        }

        fn set(&self, _key: StoreKey, _value: &[u8]) -> Result<(), StoreError> {
            Err(StoreError::QueryFailed("disk unavailable".into()))
        }

        fn delete(&self, _key: StoreKey) -> Result<(), StoreError> {
            Err(StoreError::QueryFailed("disk unavailable".into()))
        }
    }
}
