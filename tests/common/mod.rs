//! Common test utilities for integration tests.
//!
//! Fixtures for users and persisted sessions, plus builders that wire a
//! session store and request pipeline over the in-memory doubles.
//!
//! # Example
//!
//! ```ignore
//! let store = returning_user_store();
//! let session = session_over(&store);
//! session.initialize();
//! ```
#![allow(dead_code)]

pub mod mocks;

pub use mocks::*;

use std::sync::Arc;

use sessionkit::adapters::mock::{InMemoryStore, MockHttpClient};
use sessionkit::api::ApiClient;
use sessionkit::session::{SessionStore, User};
use sessionkit::startup::ClientConfig;

/// Base URL used by every pipeline built here.
pub const TEST_BASE_URL: &str = "http://localhost:3000/api";

/// The persisted form of [`test_user`].
pub const TEST_USER_JSON: &str = r#"{"id":"1","email":"a@b.c","name":"A"}"#;

pub const TEST_TOKEN: &str = "abc";

pub fn test_user() -> User {
    User::new("1", "a@b.c", "A")
}

pub fn other_user() -> User {
    User::new("2", "bea@example.com", "Bea").with_avatar("https://cdn.example.com/bea.png")
}

/// Store holding a valid persisted session for [`test_user`].
pub fn returning_user_store() -> InMemoryStore {
    InMemoryStore::with_entries([("auth_token", TEST_TOKEN), ("user", TEST_USER_JSON)])
}

/// Store whose `user` entry is not valid JSON.
pub fn corrupt_user_store() -> InMemoryStore {
    InMemoryStore::with_entries([("auth_token", TEST_TOKEN), ("user", "{\"id\":\"1\",")])
}

pub fn test_config() -> ClientConfig {
    ClientConfig::default().with_api_base_url(TEST_BASE_URL)
}

/// Session store sharing `store`'s state.
pub fn session_over(store: &InMemoryStore) -> Arc<SessionStore> {
    Arc::new(SessionStore::new(Arc::new(store.clone())))
}

/// Pipeline over `http` and `store` with no unauthorized listener.
pub fn pipeline(http: &MockHttpClient, store: &InMemoryStore) -> ApiClient {
    ApiClient::new(Arc::new(http.clone()), Arc::new(store.clone()), &test_config())
}

/// Pipeline that ends `session` on a 401.
pub fn pipeline_with_session(
    http: &MockHttpClient,
    store: &InMemoryStore,
    session: &Arc<SessionStore>,
) -> ApiClient {
    pipeline(http, store).with_unauthorized_listener(session.clone())
}

/// Absolute URL for `path` under [`TEST_BASE_URL`].
pub fn url(path: &str) -> String {
    format!("{}{}", TEST_BASE_URL, path)
}
