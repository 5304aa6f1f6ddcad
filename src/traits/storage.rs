//! Key-value storage trait abstractions.
//!
//! [`KeyValueStore`] is the synchronous contract every consumer codes
//! against. Reads never block on I/O: both the encrypted primary store and
//! the mirrored fallback answer them from memory.
//!
//! [`AsyncKeyValueBackend`] is the asynchronous device store the fallback
//! sits on. It is never read on the hot path; the mirror is seeded from it
//! once at startup and writes are forwarded to it in order.

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;

use crate::error::StorageError;

/// A value accepted by [`KeyValueStore::set`].
///
/// Numbers and booleans are persisted in their string form, so
/// `get_string` returns `"42"` or `"true"` for them.
#[derive(Debug, Clone, PartialEq)]
pub enum StorageValue {
    String(String),
    Number(f64),
    Bool(bool),
}

impl StorageValue {
    /// The string form written to the backend.
    pub fn into_string(self) -> String {
        match self {
            StorageValue::String(s) => s,
            StorageValue::Number(n) => n.to_string(),
            StorageValue::Bool(b) => b.to_string(),
        }
    }
}

impl fmt::Display for StorageValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageValue::String(s) => f.write_str(s),
            StorageValue::Number(n) => write!(f, "{}", n),
            StorageValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<String> for StorageValue {
    fn from(value: String) -> Self {
        StorageValue::String(value)
    }
}

impl From<&str> for StorageValue {
    fn from(value: &str) -> Self {
        StorageValue::String(value.to_string())
    }
}

impl From<&String> for StorageValue {
    fn from(value: &String) -> Self {
        StorageValue::String(value.clone())
    }
}

impl From<f64> for StorageValue {
    fn from(value: f64) -> Self {
        StorageValue::Number(value)
    }
}

impl From<i64> for StorageValue {
    fn from(value: i64) -> Self {
        StorageValue::Number(value as f64)
    }
}

impl From<i32> for StorageValue {
    fn from(value: i32) -> Self {
        StorageValue::Number(f64::from(value))
    }
}

impl From<bool> for StorageValue {
    fn from(value: bool) -> Self {
        StorageValue::Bool(value)
    }
}

/// Synchronous, process-local, durable key-value store.
///
/// Implementations are shared by every component (session store, request
/// pipeline), so each mutation must be atomic with respect to the others.
pub trait KeyValueStore: Send + Sync {
    /// Short backend name for logs.
    fn backend_name(&self) -> &'static str;

    /// Store a value under `key`, replacing any previous value.
    fn set(&self, key: &str, value: StorageValue) -> Result<(), StorageError>;

    /// Read the string form of the value under `key`.
    fn get_string(&self, key: &str) -> Option<String>;

    /// Remove `key`. Removing an absent key succeeds.
    ///
    /// The key is gone from this process even when the error reports that
    /// the removal could not be persisted.
    fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// Remove every key. Same failure semantics as [`delete`](Self::delete).
    fn clear_all(&self) -> Result<(), StorageError>;

    /// All keys currently stored, sorted.
    fn keys(&self) -> Vec<String>;

    /// Whether `key` is present.
    fn contains_key(&self, key: &str) -> bool {
        self.get_string(key).is_some()
    }
}

impl fmt::Debug for dyn KeyValueStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyValueStore({})", self.backend_name())
    }
}

/// Asynchronous device storage underneath the fallback store.
#[async_trait]
pub trait AsyncKeyValueBackend: Send + Sync + 'static {
    /// Read every stored entry. Called once to seed the mirror.
    async fn load_all(&self) -> Result<HashMap<String, String>, StorageError>;

    /// Write a single entry.
    async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a single entry.
    async fn remove_item(&self, key: &str) -> Result<(), StorageError>;

    /// Remove every entry.
    async fn clear(&self) -> Result<(), StorageError>;
}
