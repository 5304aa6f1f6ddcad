//! Plain JSON file backend for the fallback store.
//!
//! Asynchronous device storage: every call goes through `tokio::fs`. It is
//! only ever driven by the [`MirroredStore`](super::MirroredStore) writer
//! task, one operation at a time.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use crate::error::StorageError;
use crate::traits::AsyncKeyValueBackend;

/// Async key-value backend persisted as a JSON object in a single file.
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<HashMap<String, String>, StorageError> {
        let raw = match fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(e) => return Err(StorageError::io(&self.path, &e)),
        };

        serde_json::from_slice(&raw).map_err(|e| StorageError::Serialization {
            key: "*".to_string(),
            message: e.to_string(),
        })
    }

    async fn write(&self, entries: &HashMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::io(parent, &e))?;
        }

        let json = serde_json::to_vec_pretty(entries).map_err(|e| StorageError::Serialization {
            key: "*".to_string(),
            message: e.to_string(),
        })?;

        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, json)
            .await
            .map_err(|e| StorageError::io(&tmp_path, &e))?;
        fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|e| StorageError::io(&self.path, &e))
    }
}

#[async_trait]
impl AsyncKeyValueBackend for JsonFileBackend {
    async fn load_all(&self) -> Result<HashMap<String, String>, StorageError> {
        self.read().await
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.read().await?;
        entries.insert(key.to_string(), value.to_string());
        self.write(&entries).await
    }

    async fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.read().await?;
        if entries.remove(key).is_none() {
            return Ok(());
        }
        self.write(&entries).await
    }

    async fn clear(&self) -> Result<(), StorageError> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::io(&self.path, &e)),
        }
    }
}
