//! Fallback key-value store over an asynchronous backend.
//!
//! The backend is asynchronous, the [`KeyValueStore`] contract is not. A
//! blocking read of the backend would either stall the runtime or race the
//! pending writes, so this adapter never reads it after startup:
//!
//! - [`MirroredStore::open`] awaits `load_all()` once and seeds an in-memory
//!   mirror.
//! - Every read is answered from the mirror, so a `get_string` right after a
//!   `set` always sees the value.
//! - Every write updates the mirror and enqueues a command for a single
//!   writer task, which applies commands to the backend in submission order.
//!
//! [`MirroredStore::flush`] waits for every write enqueued before it.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::{mpsc, oneshot};

use crate::error::StorageError;
use crate::traits::{AsyncKeyValueBackend, KeyValueStore, StorageValue};

/// Commands consumed by the writer task.
#[derive(Debug)]
enum WriteCommand {
    Set { key: String, value: String },
    Remove { key: String },
    Clear,
    Flush(oneshot::Sender<()>),
}

/// Synchronous mirror of an [`AsyncKeyValueBackend`].
///
/// Must be opened inside a tokio runtime; the writer task lives as long as
/// the store.
#[derive(Debug)]
pub struct MirroredStore {
    mirror: RwLock<BTreeMap<String, String>>,
    writer: mpsc::UnboundedSender<WriteCommand>,
}

impl MirroredStore {
    pub const BACKEND: &'static str = "mirrored-async";

    /// Seed the mirror from `backend` and start the writer task.
    ///
    /// A backend that cannot be read leaves the mirror empty; the store is
    /// still usable and later writes are still forwarded.
    pub async fn open<B: AsyncKeyValueBackend>(backend: B) -> Self {
        let seeded: BTreeMap<String, String> = match backend.load_all().await {
            Ok(entries) => entries.into_iter().collect(),
            Err(e) => {
                tracing::warn!(error = %e, "Fallback storage could not be read, starting empty");
                BTreeMap::new()
            }
        };
        tracing::debug!(entries = seeded.len(), "Seeded fallback storage mirror");

        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_writer(backend, rx));

        Self {
            mirror: RwLock::new(seeded),
            writer: tx,
        }
    }

    /// Wait until every write enqueued before this call reached the backend.
    pub async fn flush(&self) -> Result<(), StorageError> {
        let (done_tx, done_rx) = oneshot::channel();
        self.writer
            .send(WriteCommand::Flush(done_tx))
            .map_err(|_| StorageError::WriterClosed)?;
        done_rx.await.map_err(|_| StorageError::WriterClosed)
    }

    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<String, String>> {
        self.mirror.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<String, String>> {
        self.mirror.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Enqueue `command` and apply `mutate` to the mirror under one write
    /// guard, so mirror order and backend order always agree.
    ///
    /// Removals reach the mirror even when the writer is gone; a set only
    /// does if it was enqueued.
    fn apply<F>(&self, command: WriteCommand, mutate: F) -> Result<(), StorageError>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        let removal = matches!(command, WriteCommand::Remove { .. } | WriteCommand::Clear);
        let mut mirror = self.write();
        let sent = self
            .writer
            .send(command)
            .map_err(|_| StorageError::WriterClosed);
        if sent.is_ok() || removal {
            mutate(&mut mirror);
        }
        sent
    }
}

async fn run_writer<B: AsyncKeyValueBackend>(
    backend: B,
    mut rx: mpsc::UnboundedReceiver<WriteCommand>,
) {
    while let Some(command) = rx.recv().await {
        let result = match command {
            WriteCommand::Set { key, value } => backend.set_item(&key, &value).await,
            WriteCommand::Remove { key } => backend.remove_item(&key).await,
            WriteCommand::Clear => backend.clear().await,
            WriteCommand::Flush(done) => {
                let _ = done.send(());
                Ok(())
            }
        };

        if let Err(e) = result {
            tracing::warn!(error = %e, "Fallback storage write failed");
        }
    }
    tracing::debug!("Fallback storage writer stopped");
}

impl KeyValueStore for MirroredStore {
    fn backend_name(&self) -> &'static str {
        Self::BACKEND
    }

    fn set(&self, key: &str, value: StorageValue) -> Result<(), StorageError> {
        let value = value.into_string();
        let command = WriteCommand::Set {
            key: key.to_string(),
            value: value.clone(),
        };
        self.apply(command, |mirror| {
            mirror.insert(key.to_string(), value);
        })
    }

    fn get_string(&self, key: &str) -> Option<String> {
        self.read().get(key).cloned()
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        let command = WriteCommand::Remove {
            key: key.to_string(),
        };
        self.apply(command, |mirror| {
            mirror.remove(key);
        })
    }

    fn clear_all(&self) -> Result<(), StorageError> {
        self.apply(WriteCommand::Clear, BTreeMap::clear)
    }

    fn keys(&self) -> Vec<String> {
        self.read().keys().cloned().collect()
    }
}
