//! The session store.
//!
//! Sole writer of [`SessionState`]. Every mutation persists to the injected
//! [`KeyValueStore`] first and then publishes exactly one new state on a
//! `watch` channel, so any reader evaluated after a mutation returns sees
//! the new state and no reader ever sees a half-applied login.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;

use super::state::SessionState;
use super::user::User;
use crate::api::UnauthorizedListener;
use crate::error::{AuthError, StorageError};
use crate::storage::{keys, KeyValueStoreExt};
use crate::traits::KeyValueStore;

/// Reactive container for the current session.
///
/// ```ignore
/// let session = SessionStore::new(store.clone());
/// session.initialize();
///
/// let mut rx = session.subscribe();
/// session.login(user, "token")?;
/// assert!(rx.borrow_and_update().is_authenticated);
/// ```
pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
    state: watch::Sender<SessionState>,
    /// Serializes writers. Held across the storage writes and the publish.
    write_lock: Mutex<()>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("SessionStore")
            .field("backend", &self.store.backend_name())
            .field("is_authenticated", &state.is_authenticated)
            .field("is_loading", &state.is_loading)
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self {
            store,
            state,
            write_lock: Mutex::new(()),
        }
    }

    /// The key-value store this session persists to.
    pub fn storage(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    /// Current state.
    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every published state.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading
    }

    pub fn user(&self) -> Option<User> {
        self.state.borrow().user.clone()
    }

    pub fn token(&self) -> Option<String> {
        self.state.borrow().token.clone()
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, next: SessionState) {
        debug_assert!(next.is_consistent());
        self.state.send_replace(next);
    }

    /// Replace the in-memory user. Not persisted.
    ///
    /// `is_authenticated` is re-derived, so it becomes true only if a
    /// token is already present.
    pub fn set_user(&self, user: User) {
        let _guard = self.lock();
        let current = self.snapshot();
        tracing::debug!(user_id = %user.id, "Session user replaced");
        self.publish(SessionState::derive(
            Some(user),
            current.token,
            current.is_loading,
        ));
    }

    /// Persist `token`, then update the in-memory token.
    ///
    /// An empty token clears the persisted and in-memory token. On a
    /// storage failure the in-memory state is left unchanged.
    pub fn set_token(&self, token: impl Into<String>) -> Result<(), StorageError> {
        let token = token.into();
        let _guard = self.lock();

        let token = if token.is_empty() {
            self.store.delete(keys::AUTH_TOKEN)?;
            None
        } else {
            self.store.set(keys::AUTH_TOKEN, token.as_str().into())?;
            Some(token)
        };

        let current = self.snapshot();
        tracing::debug!(present = token.is_some(), "Session token replaced");
        self.publish(SessionState::derive(current.user, token, current.is_loading));
        Ok(())
    }

    /// Persist `token` and `user`, then publish an authenticated state in a
    /// single step.
    ///
    /// If either write fails both keys are put back to their previous
    /// values, the in-memory state is untouched and
    /// [`AuthError::PersistFailed`] is returned.
    pub fn login(&self, user: User, token: impl Into<String>) -> Result<(), AuthError> {
        let token = token.into();
        if token.is_empty() {
            return Err(AuthError::InvalidToken);
        }

        let _guard = self.lock();

        let previous = [
            (keys::AUTH_TOKEN, self.store.get_string(keys::AUTH_TOKEN)),
            (keys::USER, self.store.get_string(keys::USER)),
        ];

        let persisted = self
            .store
            .set(keys::AUTH_TOKEN, token.as_str().into())
            .and_then(|()| self.store.set_object(keys::USER, &user));

        if let Err(e) = persisted {
            tracing::warn!(error = %e, "Failed to persist session, rolling back");
            self.restore_persisted(previous);
            return Err(AuthError::PersistFailed {
                message: e.to_string(),
            });
        }

        let is_loading = self.state.borrow().is_loading;
        tracing::info!(user_id = %user.id, backend = self.store.backend_name(), "Logged in");
        self.publish(SessionState::derive(Some(user), Some(token), is_loading));
        Ok(())
    }

    /// Remove the persisted session and publish a signed-out state.
    ///
    /// Never fails: storage errors are logged and the in-memory state is
    /// cleared regardless. Calling it again is a no-op.
    pub fn logout(&self) {
        let _guard = self.lock();
        self.remove_persisted_session();

        let current = self.snapshot();
        if current.user.is_some() || current.token.is_some() {
            tracing::info!("Logged out");
        }
        self.publish(current.signed_out());
    }

    /// Rebuild the session from storage and clear `is_loading`.
    ///
    /// Never fails. A missing or empty token, or a missing or empty user,
    /// yields no session. A user record that cannot be decoded is deleted together
    /// with the token.
    pub fn initialize(&self) {
        let _guard = self.lock();

        let token = self
            .store
            .get_string(keys::AUTH_TOKEN)
            .filter(|t| !t.is_empty());

        let has_user = self
            .store
            .get_string(keys::USER)
            .is_some_and(|raw| !raw.is_empty());
        let record = if has_user {
            self.store.get_object::<User>(keys::USER)
        } else {
            Ok(None)
        };

        let user = match record {
            Ok(user) => user,
            Err(e) => {
                let malformed = AuthError::MalformedRecord {
                    key: keys::USER.to_string(),
                    message: e.to_string(),
                };
                tracing::warn!(error = %malformed, "Discarding persisted session");
                self.remove_persisted_session();
                self.publish(SessionState::derive(None, None, false));
                return;
            }
        };

        let next = SessionState::derive(user, token, false);
        tracing::info!(
            authenticated = next.is_authenticated,
            backend = self.store.backend_name(),
            "Session initialized"
        );
        self.publish(next);
    }

    /// React to the server rejecting the bearer credential: full logout.
    pub fn handle_unauthorized(&self) {
        tracing::warn!("Credential rejected by server, ending session");
        self.logout();
    }

    /// Best-effort rewrite of the session keys to earlier raw values.
    /// Caller holds the write lock.
    fn restore_persisted(&self, previous: [(&str, Option<String>); 2]) {
        for (key, value) in previous {
            let result = match value {
                Some(value) => self.store.set(key, value.into()),
                None => self.store.delete(key),
            };
            if let Err(e) = result {
                tracing::warn!(key, error = %e, "Failed to restore persisted session key");
            }
        }
    }

    /// Best-effort removal of both session keys. Caller holds the write lock.
    fn remove_persisted_session(&self) {
        for key in [keys::AUTH_TOKEN, keys::USER] {
            if let Err(e) = self.store.delete(key) {
                tracing::warn!(key, error = %e, "Failed to remove persisted session key");
            }
        }
    }
}

impl UnauthorizedListener for SessionStore {
    fn on_unauthorized(&self) {
        self.handle_unauthorized();
    }
}
