//! Error handling for sessionkit.
//!
//! - **Categories**: high-level classification for handling decisions
//! - **Domain errors**: storage, network (request pipeline) and auth
//! - **Unified type**: [`SessionKitError`] with [`SessionKitResult`]
//! - **Context**: [`ErrorContext`] attached through [`ResultExt`]
//!
//! | Category | Raised by | Retryable |
//! |----------|-----------|-----------|
//! | Network | transport failures in the request pipeline | Yes |
//! | Auth | 401 responses, missing or corrupt session | No |
//! | Server | 5xx responses | Yes |
//! | Storage | key-value backend failures | No |
//! | Configuration | invalid `ClientConfig` | No |
//!
//! Session store operations never surface storage failures to the
//! navigation layer; the worst visible outcome is an unauthenticated state.

mod auth;
mod category;
mod context;
mod network;
mod result;
mod sessionkit_error;
mod storage;

pub use auth::AuthError;
pub use category::ErrorCategory;
pub use context::ErrorContext;
pub use network::{classify_reqwest_error, NetworkError};
pub use result::{ResultExt, SessionKitResult};
pub use sessionkit_error::SessionKitError;
pub use storage::StorageError;
