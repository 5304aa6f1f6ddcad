//! Encrypted file-backed key-value store.
//!
//! The primary backend. The whole key space is kept in memory and mirrored
//! to `<data_dir>/<storage_id>.enc` on every mutation, encrypted with
//! AES-256-GCM under a key derived from the configured encryption secret.
//!
//! On-disk format: `base64(nonce || ciphertext)` where the plaintext is a
//! JSON object of string values.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::{engine::general_purpose::STANDARD, Engine};
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::error::StorageError;
use crate::traits::{KeyValueStore, StorageValue};

/// Nonce size for AES-256-GCM (96 bits).
const NONCE_SIZE: usize = 12;

/// File extension of the encrypted image.
const FILE_EXTENSION: &str = "enc";

/// Encrypted, write-through key-value store.
pub struct EncryptedFileStore {
    path: PathBuf,
    cipher: Aes256Gcm,
    entries: Mutex<BTreeMap<String, String>>,
}

impl std::fmt::Debug for EncryptedFileStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptedFileStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl EncryptedFileStore {
    pub const BACKEND: &'static str = "encrypted-file";

    /// Open (or create) the store `<dir>/<id>.enc`.
    ///
    /// Returns [`StorageError::BackendUnavailable`] when there is no
    /// encryption key, the directory is not writable, or an existing image
    /// cannot be decrypted with the key.
    pub fn open(dir: &Path, id: &str, encryption_key: Option<&str>) -> Result<Self, StorageError> {
        let secret = encryption_key
            .filter(|k| !k.is_empty())
            .ok_or_else(|| unavailable("no encryption key configured"))?;

        let cipher = Aes256Gcm::new_from_slice(Sha256::digest(secret.as_bytes()).as_slice())
            .map_err(|e| unavailable(format!("cipher init failed: {}", e)))?;

        fs::create_dir_all(dir)
            .map_err(|e| unavailable(format!("cannot create {}: {}", dir.display(), e)))?;

        let path = dir.join(format!("{}.{}", id, FILE_EXTENSION));
        let store = Self {
            path,
            cipher,
            entries: Mutex::new(BTreeMap::new()),
        };

        if store.path.exists() {
            let loaded = store
                .read_image()
                .map_err(|e| unavailable(format!("existing image unreadable: {}", e)))?;
            *store.entries() = loaded;
        } else {
            // Writing the empty image up front proves the directory is usable.
            store
                .write_image(&BTreeMap::new())
                .map_err(|e| unavailable(e.to_string()))?;
        }

        tracing::debug!(path = %store.path.display(), "Opened encrypted key-value store");
        Ok(store)
    }

    /// Path of the encrypted image.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn entries(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn encrypt(&self, plaintext: &[u8]) -> Result<String, StorageError> {
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, plaintext)
            .map_err(|e| StorageError::Encryption(format!("encrypt failed: {}", e)))?;

        let mut combined = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        combined.extend_from_slice(&nonce_bytes);
        combined.extend_from_slice(&ciphertext);
        Ok(STANDARD.encode(combined))
    }

    fn decrypt(&self, encoded: &str) -> Result<Vec<u8>, StorageError> {
        let combined = STANDARD
            .decode(encoded.trim())
            .map_err(|e| StorageError::Encryption(format!("invalid base64: {}", e)))?;

        if combined.len() < NONCE_SIZE {
            return Err(StorageError::Encryption("ciphertext too short".to_string()));
        }

        let (nonce_bytes, ciphertext) = combined.split_at(NONCE_SIZE);
        self.cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|e| StorageError::Encryption(format!("decrypt failed: {}", e)))
    }

    fn read_image(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let encoded =
            fs::read_to_string(&self.path).map_err(|e| StorageError::io(&self.path, &e))?;
        let plaintext = self.decrypt(&encoded)?;
        serde_json::from_slice(&plaintext).map_err(|e| StorageError::Serialization {
            key: "*".to_string(),
            message: e.to_string(),
        })
    }

    /// Replace the image on disk atomically (temp file + rename).
    fn write_image(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let plaintext = serde_json::to_vec(entries).map_err(|e| StorageError::Serialization {
            key: "*".to_string(),
            message: e.to_string(),
        })?;
        let encoded = self.encrypt(&plaintext)?;

        let tmp_path = self.path.with_extension(format!("{}.tmp", FILE_EXTENSION));
        fs::write(&tmp_path, encoded).map_err(|e| StorageError::io(&tmp_path, &e))?;
        fs::rename(&tmp_path, &self.path).map_err(|e| StorageError::io(&self.path, &e))
    }

    /// Apply `mutate` to a copy of the entries, persist it, then publish it.
    /// Memory only changes once the disk image does.
    fn mutate<F>(&self, mutate: F) -> Result<(), StorageError>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        let mut entries = self.entries();
        let mut next = entries.clone();
        mutate(&mut next);
        if next == *entries {
            return Ok(());
        }
        self.write_image(&next)?;
        *entries = next;
        Ok(())
    }

    /// Like [`mutate`](Self::mutate), but the in-memory map is updated even
    /// when the image write fails. Removed keys are never served again.
    fn remove<F>(&self, remove: F) -> Result<(), StorageError>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        let mut entries = self.entries();
        let before = entries.len();
        remove(&mut entries);
        if entries.len() == before {
            return Ok(());
        }
        self.write_image(&entries).map_err(|e| {
            tracing::warn!(error = %e, "Removal not persisted, dropped from memory only");
            e
        })
    }
}

fn unavailable(reason: impl Into<String>) -> StorageError {
    StorageError::BackendUnavailable {
        backend: EncryptedFileStore::BACKEND,
        reason: reason.into(),
    }
}

impl KeyValueStore for EncryptedFileStore {
    fn backend_name(&self) -> &'static str {
        Self::BACKEND
    }

    fn set(&self, key: &str, value: StorageValue) -> Result<(), StorageError> {
        let value = value.into_string();
        self.mutate(|entries| {
            entries.insert(key.to_string(), value);
        })
    }

    fn get_string(&self, key: &str) -> Option<String> {
        self.entries().get(key).cloned()
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.remove(|entries| {
            entries.remove(key);
        })
    }

    fn clear_all(&self) -> Result<(), StorageError> {
        self.remove(BTreeMap::clear)
    }

    fn keys(&self) -> Vec<String> {
        self.entries().keys().cloned().collect()
    }
}
