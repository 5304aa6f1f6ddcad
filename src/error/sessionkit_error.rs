//! Unified error type for sessionkit.

use std::fmt;

use super::auth::AuthError;
use super::category::ErrorCategory;
use super::context::ErrorContext;
use super::network::NetworkError;
use super::storage::StorageError;

/// Unified error type.
///
/// Consolidates the domain errors so callers can categorize, decide on a
/// retry, and show a message without matching on every source type.
#[derive(Debug)]
pub enum SessionKitError {
    /// Request pipeline errors (transport and HTTP status).
    Network(NetworkError),

    /// Session lifecycle errors.
    Auth(AuthError),

    /// Key-value storage errors.
    Storage(StorageError),

    /// Invalid configuration.
    Config { message: String },

    /// Wrapped error with additional context.
    WithContext {
        error: Box<SessionKitError>,
        context: ErrorContext,
    },
}

impl SessionKitError {
    /// Get the category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            SessionKitError::Network(err) => match err {
                NetworkError::HttpStatus { status: 401, .. } => ErrorCategory::Auth,
                NetworkError::HttpStatus { status, .. } if *status >= 500 => {
                    ErrorCategory::Server
                }
                NetworkError::HttpStatus { .. } | NetworkError::InvalidUrl { .. } => {
                    ErrorCategory::Client
                }
                NetworkError::InvalidResponse { .. } => ErrorCategory::Server,
                _ => ErrorCategory::Network,
            },
            SessionKitError::Auth(err) => {
                if err.requires_reauth() {
                    ErrorCategory::Auth
                } else {
                    ErrorCategory::Storage
                }
            }
            SessionKitError::Storage(_) => ErrorCategory::Storage,
            SessionKitError::Config { .. } => ErrorCategory::Configuration,
            SessionKitError::WithContext { error, .. } => error.category(),
        }
    }

    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            SessionKitError::Network(err) => err.is_retryable(),
            SessionKitError::WithContext { error, .. } => error.is_retryable(),
            _ => false,
        }
    }

    /// Check if the user has to sign in again.
    pub fn requires_reauth(&self) -> bool {
        match self {
            SessionKitError::Auth(err) => err.requires_reauth(),
            SessionKitError::Network(err) => err.is_unauthorized(),
            SessionKitError::WithContext { error, .. } => error.requires_reauth(),
            _ => false,
        }
    }

    /// User-facing message.
    pub fn user_message(&self) -> String {
        match self {
            SessionKitError::Network(err) => err.user_message(),
            SessionKitError::Auth(err) => err.user_message(),
            SessionKitError::Storage(err) => err.user_message(),
            SessionKitError::Config { message } => format!("Configuration error: {}", message),
            SessionKitError::WithContext { error, .. } => error.user_message(),
        }
    }

    /// Short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            SessionKitError::Network(err) => err.error_code(),
            SessionKitError::Auth(err) => err.error_code(),
            SessionKitError::Storage(err) => err.error_code(),
            SessionKitError::Config { .. } => "E_CONFIG",
            SessionKitError::WithContext { error, .. } => error.error_code(),
        }
    }

    /// Recovery hint derived from the category.
    pub fn recovery_hint(&self) -> &'static str {
        self.category().recovery_hint()
    }

    /// Attach context to this error.
    pub fn with_context(self, ctx: ErrorContext) -> Self {
        SessionKitError::WithContext {
            error: Box::new(self),
            context: ctx,
        }
    }

    /// Get the context if this error has one attached.
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            SessionKitError::WithContext { context, .. } => Some(context),
            _ => None,
        }
    }

    /// Get the innermost error without context.
    pub fn inner(&self) -> &SessionKitError {
        match self {
            SessionKitError::WithContext { error, .. } => error.inner(),
            _ => self,
        }
    }
}

impl fmt::Display for SessionKitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionKitError::Network(err) => write!(f, "{}", err),
            SessionKitError::Auth(err) => write!(f, "{}", err),
            SessionKitError::Storage(err) => write!(f, "{}", err),
            SessionKitError::Config { message } => write!(f, "Configuration error: {}", message),
            SessionKitError::WithContext { error, context } => {
                write!(f, "{} ({})", error, context)
            }
        }
    }
}

impl std::error::Error for SessionKitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionKitError::Network(err) => Some(err),
            SessionKitError::Auth(err) => Some(err),
            SessionKitError::Storage(err) => Some(err),
            SessionKitError::Config { .. } => None,
            SessionKitError::WithContext { error, .. } => error.source(),
        }
    }
}

impl From<NetworkError> for SessionKitError {
    fn from(err: NetworkError) -> Self {
        SessionKitError::Network(err)
    }
}

impl From<AuthError> for SessionKitError {
    fn from(err: AuthError) -> Self {
        SessionKitError::Auth(err)
    }
}

impl From<StorageError> for SessionKitError {
    fn from(err: StorageError) -> Self {
        SessionKitError::Storage(err)
    }
}

impl From<serde_json::Error> for SessionKitError {
    fn from(err: serde_json::Error) -> Self {
        SessionKitError::Network(NetworkError::InvalidResponse {
            message: err.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_unauthorized_status_is_auth_category() {
        let err: SessionKitError = NetworkError::HttpStatus {
            status: 401,
            message: "Unauthorized".to_string(),
        }
        .into();
        assert_eq!(err.category(), ErrorCategory::Auth);
        assert!(err.requires_reauth());
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_status_categories() {
        let server: SessionKitError = NetworkError::HttpStatus {
            status: 503,
            message: String::new(),
        }
        .into();
        assert_eq!(server.category(), ErrorCategory::Server);
        assert!(server.is_retryable());

        let client: SessionKitError = NetworkError::HttpStatus {
            status: 422,
            message: String::new(),
        }
        .into();
        assert_eq!(client.category(), ErrorCategory::Client);
    }

    #[test]
    fn test_storage_error_category_and_source() {
        let err: SessionKitError = StorageError::WriterClosed.into();
        assert_eq!(err.category(), ErrorCategory::Storage);
        assert!(err.source().is_some());
        assert_eq!(err.error_code(), "E_STORE_WRITER");
    }

    #[test]
    fn test_persist_failure_is_storage_category() {
        let err: SessionKitError = AuthError::PersistFailed {
            message: "io".to_string(),
        }
        .into();
        assert_eq!(err.category(), ErrorCategory::Storage);
        assert!(!err.requires_reauth());
    }

    #[test]
    fn test_context_wrapping_preserves_behaviour() {
        let err: SessionKitError = AuthError::SessionExpired.into();
        let wrapped = err.with_context(ErrorContext::new("GET /user/me"));

        assert!(wrapped.context().is_some());
        assert!(wrapped.requires_reauth());
        assert_eq!(wrapped.error_code(), "E_AUTH_EXPIRED");
        assert!(matches!(wrapped.inner(), SessionKitError::Auth(_)));
        assert!(wrapped.to_string().contains("[GET /user/me]"));
    }

    #[test]
    fn test_json_error_maps_to_invalid_response() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: SessionKitError = json_err.into();
        assert!(matches!(
            err,
            SessionKitError::Network(NetworkError::InvalidResponse { .. })
        ));
    }
}
