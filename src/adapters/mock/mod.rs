//! Mock implementations for testing.
//!
//! Test doubles for every trait seam, usable from unit and integration
//! tests without network or filesystem access.
//!
//! - [`InMemoryStore`] - key-value store with switchable failures
//! - [`InMemoryBackend`] - async backend with latency and an operation log
//! - [`MockHttpClient`] - canned responses, recorded requests

pub mod http;
pub mod store;

pub use http::{MockHttpClient, MockResponse};
pub use store::{InMemoryBackend, InMemoryStore};
