//! Key-value storage policy.
//!
//! Picks the backend at startup and provides typed helpers on top of the
//! string-valued [`KeyValueStore`] contract.
//!
//! ```ignore
//! let store = open_storage(&config).await;
//! store.set_object(keys::USER, &user)?;
//! let user: Option<User> = store.get_object(keys::USER)?;
//! ```

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::adapters::{EncryptedFileStore, JsonFileBackend, MirroredStore};
use crate::error::StorageError;
use crate::startup::ClientConfig;
use crate::traits::KeyValueStore;

/// Keys shared by every component that touches the store.
pub mod keys {
    /// Bearer token of the current session.
    pub const AUTH_TOKEN: &str = "auth_token";
    /// JSON-serialized user record of the current session.
    pub const USER: &str = "user";
    pub const THEME: &str = "theme";
    pub const LANGUAGE: &str = "language";
}

/// Typed JSON helpers for any [`KeyValueStore`].
pub trait KeyValueStoreExt {
    /// Serialize `value` to JSON and store it under `key`.
    fn set_object<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError>;

    /// Read and deserialize the JSON value under `key`.
    ///
    /// `Ok(None)` when the key is absent; [`StorageError::Serialization`]
    /// when the stored text is not a valid `T`.
    fn get_object<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStoreExt for S {
    fn set_object<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let json = serde_json::to_string(value).map_err(|e| StorageError::Serialization {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        self.set(key, json.into())
    }

    fn get_object<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        let Some(raw) = self.get_string(key) else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| StorageError::Serialization {
                key: key.to_string(),
                message: e.to_string(),
            })
    }
}

/// The backend chosen at startup.
#[derive(Debug, Clone)]
pub enum StorageBackend {
    Encrypted(Arc<EncryptedFileStore>),
    Mirrored(Arc<MirroredStore>),
}

impl StorageBackend {
    /// The backend behind the shared [`KeyValueStore`] contract.
    pub fn store(&self) -> Arc<dyn KeyValueStore> {
        match self {
            StorageBackend::Encrypted(store) => store.clone() as Arc<dyn KeyValueStore>,
            StorageBackend::Mirrored(store) => store.clone() as Arc<dyn KeyValueStore>,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, StorageBackend::Mirrored(_))
    }

    /// Wait for pending writes to reach the device. The encrypted store
    /// writes through, so only the fallback has anything to wait for.
    pub async fn flush(&self) -> Result<(), StorageError> {
        match self {
            StorageBackend::Encrypted(_) => Ok(()),
            StorageBackend::Mirrored(store) => store.flush().await,
        }
    }
}

/// Pick the process-wide backend.
///
/// Tries the encrypted primary store first. If it is unavailable, logs a
/// warning and opens the mirrored fallback over a plaintext JSON file at
/// [`ClientConfig::fallback_storage_path`]. Never fails.
pub async fn open_backend(config: &ClientConfig) -> StorageBackend {
    match EncryptedFileStore::open(
        &config.data_dir,
        &config.storage_id,
        config.encryption_key.as_deref(),
    ) {
        Ok(store) => {
            tracing::debug!(path = %store.path().display(), "Opened encrypted storage");
            StorageBackend::Encrypted(Arc::new(store))
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                "Encrypted storage unavailable, falling back to async storage"
            );
            let backend = JsonFileBackend::new(config.fallback_storage_path());
            StorageBackend::Mirrored(Arc::new(MirroredStore::open(backend).await))
        }
    }
}

/// Open the process-wide store. See [`open_backend`].
pub async fn open_storage(config: &ClientConfig) -> Arc<dyn KeyValueStore> {
    open_backend(config).await.store()
}
