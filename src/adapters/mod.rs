//! Concrete implementations of trait abstractions.
//!
//! Production adapters implementing the traits in `crate::traits`. Every
//! component receives these through its constructor, so tests swap in the
//! doubles from [`mock`].
//!
//! # Adapters
//!
//! - [`EncryptedFileStore`] - primary key-value store, AES-256-GCM encrypted file
//! - [`MirroredStore`] - fallback key-value store over an async backend
//! - [`JsonFileBackend`] - async plaintext JSON file backend for the fallback
//! - [`ReqwestHttpClient`] - HTTP client using reqwest
//!
//! # Mock Implementations
//!
//! - [`mock::InMemoryStore`] - key-value store with failure toggles
//! - [`mock::InMemoryBackend`] - async backend with latency and an operation log
//! - [`mock::MockHttpClient`] - configurable HTTP responses

pub mod encrypted_store;
pub mod json_file_backend;
pub mod mirrored_store;
pub mod mock;
pub mod reqwest_http;

pub use encrypted_store::EncryptedFileStore;
pub use json_file_backend::JsonFileBackend;
pub use mirrored_store::MirroredStore;
pub use mock::{InMemoryBackend, InMemoryStore, MockHttpClient};
pub use reqwest_http::ReqwestHttpClient;
