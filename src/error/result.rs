//! Result type alias for sessionkit operations.

use super::context::ErrorContext;
use super::sessionkit_error::SessionKitError;

/// Type alias for Results using SessionKitError.
pub type SessionKitResult<T> = Result<T, SessionKitError>;

/// Extension trait for attaching [`ErrorContext`] to failing results.
pub trait ResultExt<T> {
    /// Add context to an error if the result is Err.
    fn context(self, ctx: ErrorContext) -> SessionKitResult<T>;

    /// Add context using a closure (only called on error).
    fn with_context<F>(self, f: F) -> SessionKitResult<T>
    where
        F: FnOnce() -> ErrorContext;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Into<SessionKitError>,
{
    fn context(self, ctx: ErrorContext) -> SessionKitResult<T> {
        self.map_err(|e| e.into().with_context(ctx))
    }

    fn with_context<F>(self, f: F) -> SessionKitResult<T>
    where
        F: FnOnce() -> ErrorContext,
    {
        self.map_err(|e| e.into().with_context(f()))
    }
}
