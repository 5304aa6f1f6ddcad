//! Trait abstractions for dependency injection and testability.
//!
//! - [`KeyValueStore`] - synchronous durable key-value storage
//! - [`AsyncKeyValueBackend`] - asynchronous device storage under the fallback store
//! - [`HttpClient`] - HTTP transport used by the request pipeline

pub mod http;
pub mod storage;

pub use http::{Headers, HttpClient, HttpMethod, HttpRequest, Response};
pub use storage::{AsyncKeyValueBackend, KeyValueStore, StorageValue};
