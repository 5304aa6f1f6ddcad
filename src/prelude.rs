//! Prelude module for convenient imports.
//!
//! ```ignore
//! use sessionkit::prelude::*;
//! ```

pub use crate::api::{ApiClient, UnauthorizedListener};
pub use crate::error::{
    AuthError, ErrorCategory, NetworkError, ResultExt, SessionKitError, SessionKitResult,
    StorageError,
};
pub use crate::navigation::RootRoute;
pub use crate::session::{SessionState, SessionStore, User, UserUpdate};
pub use crate::startup::{AppContext, ClientConfig};
pub use crate::storage::{keys, KeyValueStoreExt};
pub use crate::traits::{HttpClient, KeyValueStore, StorageValue};
