//! Key-value storage errors.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by key-value store backends.
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    /// The backend cannot be used in this environment. Callers fall back to
    /// another backend instead of failing.
    #[error("Storage backend '{backend}' unavailable: {reason}")]
    BackendUnavailable {
        backend: &'static str,
        reason: String,
    },

    /// Reading or writing the backing file failed.
    #[error("Storage I/O error on {path:?}: {message}")]
    Io { path: PathBuf, message: String },

    /// Encrypting or decrypting the persisted image failed.
    #[error("Storage encryption error: {0}")]
    Encryption(String),

    /// A stored value could not be (de)serialized.
    #[error("Storage serialization error for key '{key}': {message}")]
    Serialization { key: String, message: String },

    /// The asynchronous backend rejected an operation.
    #[error("Storage backend error: {0}")]
    Backend(String),

    /// The background writer is gone, so writes can no longer reach the backend.
    #[error("Storage writer stopped")]
    WriterClosed,
}

impl StorageError {
    /// Build an I/O error for a path.
    pub fn io(path: impl Into<PathBuf>, err: &std::io::Error) -> Self {
        StorageError::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }

    /// True when the error means "try another backend" rather than a failed operation.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, StorageError::BackendUnavailable { .. })
    }

    /// User-facing message.
    pub fn user_message(&self) -> String {
        match self {
            StorageError::BackendUnavailable { .. } => {
                "Secure storage is not available on this device.".to_string()
            }
            StorageError::Io { .. } | StorageError::Backend(_) | StorageError::WriterClosed => {
                "Could not save data on this device. Please check available storage.".to_string()
            }
            StorageError::Encryption(_) => {
                "Stored data could not be decrypted. Please sign in again.".to_string()
            }
            StorageError::Serialization { .. } => {
                "Stored data is corrupted. Please sign in again.".to_string()
            }
        }
    }

    /// Short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            StorageError::BackendUnavailable { .. } => "E_STORE_UNAVAILABLE",
            StorageError::Io { .. } => "E_STORE_IO",
            StorageError::Encryption(_) => "E_STORE_CRYPTO",
            StorageError::Serialization { .. } => "E_STORE_SERDE",
            StorageError::Backend(_) => "E_STORE_BACKEND",
            StorageError::WriterClosed => "E_STORE_WRITER",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_is_distinguished() {
        let err = StorageError::BackendUnavailable {
            backend: "encrypted-file",
            reason: "no key".to_string(),
        };
        assert!(err.is_unavailable());
        assert_eq!(err.error_code(), "E_STORE_UNAVAILABLE");
        assert!(err.to_string().contains("encrypted-file"));
        assert!(!StorageError::WriterClosed.is_unavailable());
    }

    #[test]
    fn test_io_helper_keeps_path() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = StorageError::io("/tmp/app-storage.enc", &io);
        match err {
            StorageError::Io { path, message } => {
                assert_eq!(path, PathBuf::from("/tmp/app-storage.enc"));
                assert!(message.contains("denied"));
            }
            other => panic!("unexpected variant: {:?}", other),
        }
    }

    #[test]
    fn test_serialization_display() {
        let err = StorageError::Serialization {
            key: "user".to_string(),
            message: "expected value".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Storage serialization error for key 'user': expected value"
        );
        assert!(err.user_message().contains("corrupted"));
    }
}
