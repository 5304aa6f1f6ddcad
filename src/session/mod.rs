//! Session lifecycle.
//!
//! - [`User`] / [`UserUpdate`] - the user record and its partial update
//! - [`SessionState`] - published `{user, token, is_authenticated, is_loading}`
//! - [`SessionStore`] - the single writer of that state

pub mod state;
pub mod store;
pub mod user;

pub use state::SessionState;
pub use store::SessionStore;
pub use user::{User, UserUpdate};
