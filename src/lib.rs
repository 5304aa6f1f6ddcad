//! Sessionkit - client-side session lifecycle.
//!
//! Persists an authentication token and user record, restores them at
//! startup, attaches the token to outgoing requests and ends the session
//! when the server rejects it.
//!
//! This library exposes modules for use in integration tests.

pub mod adapters;
pub mod api;
pub mod error;
pub mod logging;
pub mod navigation;
pub mod prelude;
pub mod session;
pub mod startup;
pub mod storage;
pub mod traits;
