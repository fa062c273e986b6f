//! Best-effort persistence of chats and settings.
//!
//! Every read falls back to an empty or default value and every write
//! failure is logged; nothing here returns an error to the caller.

pub mod store;
pub mod timestamp;


use std::error::Error as StdError;
use std::fmt;
use std::io;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::core::chat::Chat;
use crate::core::settings::Settings;

pub use store::{FileStore, KeyValueStore, MemoryStore};

pub const CHATS_KEY: &str = "ai_chats";
pub const SETTINGS_KEY: &str = "ai_settings";

/// Failures while moving a record in or out of the key-value store.
#[derive(Debug)]
pub enum StorageError {
    /// The backend could not read or write the key.
    Io { key: String, source: io::Error },

    /// The value could not be encoded as JSON.
    Encode {
        key: String,
        source: serde_json::Error,
    },

    /// The stored value is not the JSON shape we expect.
    Malformed {
        key: String,
        source: serde_json::Error,
    },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Io { key, source } => write!(f, "Failed to access '{key}': {source}"),
            StorageError::Encode { key, source } => {
                write!(f, "Failed to encode '{key}': {source}")
            }
            StorageError::Malformed { key, source } => {
                write!(f, "Stored value for '{key}' is malformed: {source}")
            }
        }
    }
}

impl StdError for StorageError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            StorageError::Io { source, .. } => Some(source),
            StorageError::Encode { source, .. } | StorageError::Malformed { source, .. } => {
                Some(source)
            }
        }
    }
}

pub struct Persistence<S> {
    store: S,
}

impl<S: KeyValueStore> Persistence<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn save_chats(&self, chats: &[Chat]) {
        if let Err(err) = self.write_json(CHATS_KEY, chats) {
            warn!(error = %err, "failed to save chats");
        }
    }

    pub fn load_chats(&self) -> Vec<Chat> {
        match self.read_json::<Vec<Chat>>(CHATS_KEY) {
            Ok(Some(chats)) => {
                debug!(count = chats.len(), "loaded chats");
                chats
            }
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!(error = %err, "failed to load chats, starting empty");
                Vec::new()
            }
        }
    }

    pub fn save_settings(&self, settings: &Settings) {
        if let Err(err) = self.write_json(SETTINGS_KEY, settings) {
            warn!(error = %err, "failed to save settings");
        }
    }

    pub fn load_settings(&self) -> Settings {
        match self.read_json::<Settings>(SETTINGS_KEY) {
            Ok(Some(settings)) => settings,
            Ok(None) => Settings::default(),
            Err(err) => {
                warn!(error = %err, "failed to load settings, using defaults");
                Settings::default()
            }
        }
    }

    fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let encoded = serde_json::to_string(value).map_err(|source| StorageError::Encode {
            key: key.to_string(),
            source,
        })?;
        self.store
            .set(key, &encoded)
            .map_err(|source| StorageError::Io {
                key: key.to_string(),
                source,
            })
    }

    fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        let Some(raw) = self.store.get(key).map_err(|source| StorageError::Io {
            key: key.to_string(),
            source,
        })?
        else {
            return Ok(None);
        };

        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StorageError::Malformed {
                key: key.to_string(),
                source,
            })
    }
}
