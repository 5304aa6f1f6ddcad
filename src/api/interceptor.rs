//! Request/response interceptors.
//!
//! The pipeline runs every interceptor's [`Interceptor::before_send`] over an
//! outgoing request and every [`Interceptor::after_response`] over the
//! response, in registration order, before status handling.

use std::sync::Arc;

use crate::storage::keys;
use crate::traits::{HttpRequest, KeyValueStore, Response};

/// A hook around every request the pipeline sends.
pub trait Interceptor: Send + Sync {
    /// Name used in logs and to replace a built-in.
    fn name(&self) -> &'static str;

    /// Adjust the outgoing request.
    fn before_send(&self, _request: &mut HttpRequest) {}

    /// Observe the response. Runs for every status, before non-2xx
    /// responses are turned into errors.
    fn after_response(&self, _request: &HttpRequest, _response: &Response) {}
}

/// Notified when the server rejects the bearer credential.
pub trait UnauthorizedListener: Send + Sync {
    fn on_unauthorized(&self);
}

/// Attaches `Authorization: Bearer <token>` from the key-value store.
///
/// The token is read from the store at send time, not from the session's
/// in-memory state.
pub struct BearerAuth {
    store: Arc<dyn KeyValueStore>,
}

impl BearerAuth {
    pub const NAME: &'static str = "bearer-auth";

    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }
}

impl Interceptor for BearerAuth {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    /// A request that already carries an `Authorization` header is left as is.
    fn before_send(&self, request: &mut HttpRequest) {
        if request.header("Authorization").is_some() {
            return;
        }
        if let Some(value) = bearer_value(self.store.as_ref()) {
            request.set_header("Authorization", value);
        }
    }
}

/// `Bearer <token>` for the persisted token, if there is a non-empty one.
fn bearer_value(store: &dyn KeyValueStore) -> Option<String> {
    store
        .get_string(keys::AUTH_TOKEN)
        .filter(|token| !token.is_empty())
        .map(|token| format!("Bearer {}", token))
}

/// Clears the persisted token on a 401 and notifies the listener, if any.
///
/// Only a 401 for the credential currently stored counts. A rejected request
/// that carried a different credential (one sent before a fresh login, or an
/// explicit candidate token) leaves the stored session alone.
pub struct UnauthorizedReset {
    store: Arc<dyn KeyValueStore>,
    listener: Option<Arc<dyn UnauthorizedListener>>,
}

impl UnauthorizedReset {
    pub const NAME: &'static str = "unauthorized-reset";

    /// Without a listener only the persisted token is deleted; in-memory
    /// session state is left to whoever reads the store next.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            listener: None,
        }
    }

    pub fn with_listener(mut self, listener: Arc<dyn UnauthorizedListener>) -> Self {
        self.listener = Some(listener);
        self
    }
}

impl Interceptor for UnauthorizedReset {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn after_response(&self, request: &HttpRequest, response: &Response) {
        if !response.is_unauthorized() {
            return;
        }

        if request.header("Authorization") != bearer_value(self.store.as_ref()).as_deref() {
            tracing::debug!(url = %request.url, "Ignoring 401 for a credential that is no longer stored");
            return;
        }

        tracing::warn!(method = %request.method, url = %request.url, "Received 401, clearing credential");
        if let Err(e) = self.store.delete(keys::AUTH_TOKEN) {
            tracing::warn!(error = %e, "Failed to delete persisted token");
        }
        if let Some(ref listener) = self.listener {
            listener.on_unauthorized();
        }
    }
}
