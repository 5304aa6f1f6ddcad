//! In-memory storage doubles.
//!
//! - [`InMemoryStore`]: a [`KeyValueStore`] with switchable write failures,
//!   for exercising the session store without touching disk.
//! - [`InMemoryBackend`]: an [`AsyncKeyValueBackend`] with optional write
//!   latency and an operation log, for exercising [`MirroredStore`](crate::adapters::MirroredStore).

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::error::StorageError;
use crate::traits::{AsyncKeyValueBackend, KeyValueStore, StorageValue};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-memory key-value store for testing.
///
/// ```ignore
/// let store = InMemoryStore::new();
/// store.set("auth_token", "abc".into())?;
/// assert_eq!(store.get_string("auth_token").as_deref(), Some("abc"));
///
/// store.fail_writes_for("user");
/// assert!(store.set("user", "{}".into()).is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    entries: Arc<Mutex<BTreeMap<String, String>>>,
    /// Keys whose writes (set/delete) fail. Failed deletes still remove.
    failing_keys: Arc<Mutex<HashSet<String>>>,
    /// Whether every write fails.
    writes_should_fail: Arc<Mutex<bool>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with raw string entries.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let store = Self::new();
        *lock(&store.entries) = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        store
    }

    /// Make every write fail (or succeed again).
    pub fn set_writes_should_fail(&self, should_fail: bool) {
        *lock(&self.writes_should_fail) = should_fail;
    }

    /// Make writes touching `key` fail.
    pub fn fail_writes_for(&self, key: &str) {
        lock(&self.failing_keys).insert(key.to_string());
    }

    /// Snapshot of every entry.
    pub fn entries(&self) -> BTreeMap<String, String> {
        lock(&self.entries).clone()
    }

    fn check_write(&self, key: &str) -> Result<(), StorageError> {
        if *lock(&self.writes_should_fail) || lock(&self.failing_keys).contains(key) {
            return Err(StorageError::Backend(format!("Mock write failure for '{}'", key)));
        }
        Ok(())
    }
}

impl KeyValueStore for InMemoryStore {
    fn backend_name(&self) -> &'static str {
        "in-memory"
    }

    fn set(&self, key: &str, value: StorageValue) -> Result<(), StorageError> {
        self.check_write(key)?;
        lock(&self.entries).insert(key.to_string(), value.into_string());
        Ok(())
    }

    fn get_string(&self, key: &str) -> Option<String> {
        lock(&self.entries).get(key).cloned()
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        lock(&self.entries).remove(key);
        self.check_write(key)
    }

    fn clear_all(&self) -> Result<(), StorageError> {
        lock(&self.entries).clear();
        self.check_write("*")
    }

    fn keys(&self) -> Vec<String> {
        lock(&self.entries).keys().cloned().collect()
    }
}

/// In-memory asynchronous backend for testing the fallback store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBackend {
    entries: Arc<Mutex<HashMap<String, String>>>,
    operations: Arc<Mutex<Vec<String>>>,
    write_delay: Option<Duration>,
    load_should_fail: Arc<Mutex<bool>>,
    write_should_fail: Arc<Mutex<bool>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let backend = Self::new();
        *lock(&backend.entries) = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        backend
    }

    /// Sleep this long before every write, simulating slow device storage.
    pub fn with_write_delay(mut self, delay: Duration) -> Self {
        self.write_delay = Some(delay);
        self
    }

    pub fn set_load_should_fail(&self, should_fail: bool) {
        *lock(&self.load_should_fail) = should_fail;
    }

    pub fn set_write_should_fail(&self, should_fail: bool) {
        *lock(&self.write_should_fail) = should_fail;
    }

    /// Current value of `key` in the backend (not the mirror).
    pub fn get(&self, key: &str) -> Option<String> {
        lock(&self.entries).get(key).cloned()
    }

    pub fn entries(&self) -> HashMap<String, String> {
        lock(&self.entries).clone()
    }

    /// Log of applied writes, e.g. `"set auth_token"`.
    pub fn operations(&self) -> Vec<String> {
        lock(&self.operations).clone()
    }

    async fn before_write(&self, operation: String) -> Result<(), StorageError> {
        if let Some(delay) = self.write_delay {
            tokio::time::sleep(delay).await;
        }
        if *lock(&self.write_should_fail) {
            return Err(StorageError::Backend("Mock backend write failure".to_string()));
        }
        lock(&self.operations).push(operation);
        Ok(())
    }
}

#[async_trait]
impl AsyncKeyValueBackend for InMemoryBackend {
    async fn load_all(&self) -> Result<HashMap<String, String>, StorageError> {
        if *lock(&self.load_should_fail) {
            return Err(StorageError::Backend("Mock backend load failure".to_string()));
        }
        Ok(self.entries())
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.before_write(format!("set {}", key)).await?;
        lock(&self.entries).insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.before_write(format!("remove {}", key)).await?;
        lock(&self.entries).remove(key);
        Ok(())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        self.before_write("clear".to_string()).await?;
        lock(&self.entries).clear();
        Ok(())
    }
}
