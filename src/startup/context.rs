//! Application context.
//!
//! Wires the key-value store, session store and request pipeline together.
//! There are no globals: every component gets its collaborators here.

use std::sync::Arc;

use super::config::ClientConfig;
use crate::adapters::ReqwestHttpClient;
use crate::api::ApiClient;
use crate::error::StorageError;
use crate::navigation::RootRoute;
use crate::session::SessionStore;
use crate::storage::{open_backend, StorageBackend};
use crate::traits::{HttpClient, KeyValueStore};

/// Every long-lived component of the client.
#[derive(Debug)]
pub struct AppContext {
    pub config: ClientConfig,
    pub store: Arc<dyn KeyValueStore>,
    /// Set when the context owns the backend (see [`AppContext::bootstrap`]).
    pub backend: Option<StorageBackend>,
    pub session: Arc<SessionStore>,
    pub api: ApiClient,
}

impl AppContext {
    /// Open storage, restore the session and build the pipeline over reqwest.
    pub async fn bootstrap(config: ClientConfig) -> Self {
        let backend = open_backend(&config).await;
        let mut ctx =
            Self::with_components(config, backend.store(), Arc::new(ReqwestHttpClient::new()));
        ctx.backend = Some(backend);
        ctx
    }

    /// Assemble a context from explicit components.
    ///
    /// The session is initialized before the pipeline exists, so the first
    /// route read already reflects persisted state. The pipeline notifies
    /// the session on a 401.
    pub fn with_components(
        config: ClientConfig,
        store: Arc<dyn KeyValueStore>,
        http: Arc<dyn HttpClient>,
    ) -> Self {
        let session = Arc::new(SessionStore::new(store.clone()));
        session.initialize();

        let api = ApiClient::new(http, store.clone(), &config)
            .with_unauthorized_listener(session.clone());

        tracing::debug!(
            backend = store.backend_name(),
            base_url = %config.api_base_url,
            "Application context ready"
        );

        Self {
            config,
            store,
            backend: None,
            session,
            api,
        }
    }

    /// Wait until every store write has reached the device. Call before the
    /// process exits.
    pub async fn shutdown(&self) -> Result<(), StorageError> {
        match self.backend {
            Some(ref backend) => backend.flush().await,
            None => Ok(()),
        }
    }

    pub fn route(&self) -> RootRoute {
        RootRoute::for_state(&self.session.snapshot())
    }
}
