//! Authentication-related error types.
//!
//! These cover the session lifecycle: persisting credentials, restoring
//! them at startup and reacting to the server rejecting them.

use std::fmt;

/// Authentication-specific error variants.
#[derive(Debug, Clone)]
pub enum AuthError {
    /// No session is active.
    NotAuthenticated,

    /// The server rejected the bearer credential (HTTP 401).
    SessionExpired,

    /// The credential handed to the store is unusable (for example empty).
    InvalidToken,

    /// Credentials could not be written to the key-value store.
    PersistFailed { message: String },

    /// A persisted record could not be decoded.
    MalformedRecord { key: String, message: String },
}

impl AuthError {
    /// Check if the user has to sign in again to recover.
    pub fn requires_reauth(&self) -> bool {
        matches!(
            self,
            AuthError::NotAuthenticated
                | AuthError::SessionExpired
                | AuthError::InvalidToken
                | AuthError::MalformedRecord { .. }
        )
    }

    /// User-facing message.
    pub fn user_message(&self) -> String {
        match self {
            AuthError::NotAuthenticated => {
                "You are not signed in. Please sign in to continue.".to_string()
            }
            AuthError::SessionExpired => {
                "Your session has expired. Please sign in again.".to_string()
            }
            AuthError::InvalidToken => {
                "The sign-in token is invalid. Please sign in again.".to_string()
            }
            AuthError::PersistFailed { .. } => {
                "Could not save your sign-in on this device. Please check available storage."
                    .to_string()
            }
            AuthError::MalformedRecord { .. } => {
                "Your saved session could not be restored. Please sign in again.".to_string()
            }
        }
    }

    /// Short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::NotAuthenticated => "E_AUTH_NOT_AUTH",
            AuthError::SessionExpired => "E_AUTH_EXPIRED",
            AuthError::InvalidToken => "E_AUTH_INVALID",
            AuthError::PersistFailed { .. } => "E_AUTH_PERSIST",
            AuthError::MalformedRecord { .. } => "E_AUTH_MALFORMED",
        }
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::NotAuthenticated => write!(f, "Not authenticated"),
            AuthError::SessionExpired => write!(f, "Session rejected by server (401)"),
            AuthError::InvalidToken => write!(f, "Invalid token"),
            AuthError::PersistFailed { message } => {
                write!(f, "Failed to persist credentials: {}", message)
            }
            AuthError::MalformedRecord { key, message } => {
                write!(f, "Malformed persisted record '{}': {}", key, message)
            }
        }
    }
}

impl std::error::Error for AuthError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_expired_requires_reauth() {
        let err = AuthError::SessionExpired;
        assert!(err.requires_reauth());
        assert_eq!(err.error_code(), "E_AUTH_EXPIRED");
        assert!(err.user_message().contains("expired"));
    }

    #[test]
    fn test_persist_failed_does_not_require_reauth() {
        let err = AuthError::PersistFailed {
            message: "disk full".to_string(),
        };
        assert!(!err.requires_reauth());
        assert_eq!(err.to_string(), "Failed to persist credentials: disk full");
    }

    #[test]
    fn test_malformed_record_display() {
        let err = AuthError::MalformedRecord {
            key: "user".to_string(),
            message: "EOF while parsing".to_string(),
        };
        assert!(err.requires_reauth());
        assert!(err.to_string().contains("'user'"));
        assert_eq!(err.error_code(), "E_AUTH_MALFORMED");
    }
}
