//! Request pipeline.
//!
//! - [`ApiClient`] - base URL, default headers, fixed timeout, status mapping
//! - [`Interceptor`] - hooks run around every request
//! - [`BearerAuth`] / [`UnauthorizedReset`] - the built-in interceptors
//! - [`UnauthorizedListener`] - notified on a 401 (the session store)
//!
//! User endpoints live in [`user`].

pub mod client;
pub mod interceptor;
pub mod user;

pub use client::ApiClient;
pub use interceptor::{BearerAuth, Interceptor, UnauthorizedListener, UnauthorizedReset};
pub use user::CURRENT_USER_PATH;
