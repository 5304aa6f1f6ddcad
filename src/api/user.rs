//! User endpoints.

use super::client::{decode, ApiClient};
use crate::error::{
    AuthError, ErrorContext, NetworkError, ResultExt, SessionKitError, SessionKitResult,
};
use crate::session::{SessionStore, User, UserUpdate};
use crate::traits::HttpMethod;

/// Path of the current user's resource.
pub const CURRENT_USER_PATH: &str = "/user/me";

impl ApiClient {
    /// `GET /user/me`.
    pub async fn current_user(&self) -> Result<User, NetworkError> {
        self.get_json(CURRENT_USER_PATH).await
    }

    /// `PATCH /user/me` with only the fields present in `update`.
    pub async fn update_user(&self, update: &UserUpdate) -> Result<User, NetworkError> {
        self.send_json(HttpMethod::Patch, CURRENT_USER_PATH, update)
            .await
    }

    /// Fetch the current user and replace the session's in-memory user.
    ///
    /// Fails with [`AuthError::NotAuthenticated`] without a request when the
    /// session is signed out. A 401 surfaces as [`AuthError::SessionExpired`];
    /// by then the pipeline's listener has already ended the session.
    pub async fn refresh_session_user(&self, session: &SessionStore) -> SessionKitResult<User> {
        let user = self
            .fetch_session_user(session)
            .await
            .with_context(|| self.user_context("refresh_session_user"))?;
        session.set_user(user.clone());
        Ok(user)
    }

    /// Fetch the user `token` belongs to without touching the persisted
    /// session. A 401 surfaces as [`AuthError::InvalidToken`].
    pub async fn verify_token(&self, token: &str) -> SessionKitResult<User> {
        self.fetch_token_user(token)
            .await
            .with_context(|| self.user_context("verify_token"))
    }

    async fn fetch_session_user(&self, session: &SessionStore) -> SessionKitResult<User> {
        if !session.is_authenticated() {
            return Err(AuthError::NotAuthenticated.into());
        }
        self.current_user()
            .await
            .map_err(unauthorized_as(AuthError::SessionExpired))
    }

    async fn fetch_token_user(&self, token: &str) -> SessionKitResult<User> {
        if token.is_empty() {
            return Err(AuthError::InvalidToken.into());
        }
        let response = self
            .request_with_token(HttpMethod::Get, CURRENT_USER_PATH, None, token)
            .await
            .map_err(unauthorized_as(AuthError::InvalidToken))?;
        Ok(decode(&response)?)
    }

    fn user_context(&self, operation: &str) -> ErrorContext {
        ErrorContext::new(operation)
            .with_url(self.url(CURRENT_USER_PATH))
            .with_component("api")
    }
}

/// Map a 401 to `auth`, keep every other pipeline error as is.
fn unauthorized_as(auth: AuthError) -> impl FnOnce(NetworkError) -> SessionKitError {
    move |err| {
        if err.is_unauthorized() {
            auth.into()
        } else {
            err.into()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::{InMemoryStore, MockHttpClient, MockResponse};
    use crate::startup::ClientConfig;
    use crate::traits::KeyValueStore;
    use std::sync::Arc;

    const ME: &str = "http://localhost:3000/api/user/me";

    fn setup() -> (MockHttpClient, InMemoryStore, ApiClient) {
        let http = MockHttpClient::new();
        let store = InMemoryStore::new();
        let config = ClientConfig::default().with_dev_mode(true);
        let api = ApiClient::new(Arc::new(http.clone()), Arc::new(store.clone()), &config);
        (http, store, api)
    }

    #[tokio::test]
    async fn test_current_user() {
        let (http, _store, api) = setup();
        http.set_response(
            ME,
            MockResponse::json(200, r#"{"id":"1","email":"a@b.c","name":"A"}"#),
        );

        let user = api.current_user().await.unwrap();
        assert_eq!(user, User::new("1", "a@b.c", "A"));
        assert_eq!(http.last_request().unwrap().method, HttpMethod::Get);
    }

    #[tokio::test]
    async fn test_update_user_sends_partial_body() {
        let (http, _store, api) = setup();
        http.set_response(
            ME,
            MockResponse::json(200, r#"{"id":"1","email":"a@b.c","name":"Bea"}"#),
        );

        let user = api.update_user(&UserUpdate::new().name("Bea")).await.unwrap();
        assert_eq!(user.name, "Bea");

        let sent = http.last_request().unwrap();
        assert_eq!(sent.method, HttpMethod::Patch);
        assert_eq!(sent.body.as_deref(), Some(r#"{"name":"Bea"}"#));
    }

    #[tokio::test]
    async fn test_refresh_session_user() {
        let (http, store, api) = setup();
        let session = SessionStore::new(Arc::new(store));
        session.login(User::new("1", "old@b.c", "Old"), "abc").unwrap();
        http.set_response(
            ME,
            MockResponse::json(200, r#"{"id":"1","email":"a@b.c","name":"A"}"#),
        );

        let user = api.refresh_session_user(&session).await.unwrap();
        assert_eq!(session.user(), Some(user));
        assert!(session.is_authenticated());
    }

    #[tokio::test]
    async fn test_refresh_requires_session() {
        let (http, store, api) = setup();
        let session = SessionStore::new(Arc::new(store));
        session.initialize();

        let err = api.refresh_session_user(&session).await.unwrap_err();
        assert!(matches!(
            err.inner(),
            SessionKitError::Auth(AuthError::NotAuthenticated)
        ));
        assert_eq!(err.context().unwrap().operation, "refresh_session_user");
        assert!(http.get_requests().is_empty());
    }

    #[tokio::test]
    async fn test_verify_token_uses_candidate_credential() {
        let (http, store, api) = setup();
        store.set("auth_token", "current".into()).unwrap();
        http.set_response(
            ME,
            MockResponse::json(200, r#"{"id":"2","email":"b@b.c","name":"B"}"#),
        );

        let user = api.verify_token("candidate").await.unwrap();
        assert_eq!(user.id, "2");
        assert_eq!(
            http.last_request().unwrap().header("authorization"),
            Some("Bearer candidate")
        );
        assert_eq!(store.get_string("auth_token").as_deref(), Some("current"));
    }

    #[tokio::test]
    async fn test_verify_token_rejected() {
        let (http, store, api) = setup();
        store.set("auth_token", "current".into()).unwrap();
        http.set_response(ME, MockResponse::status(401));

        let err = api.verify_token("candidate").await.unwrap_err();
        assert_eq!(err.error_code(), "E_AUTH_INVALID");
        assert_eq!(err.context().unwrap().url.as_deref(), Some(ME));
        assert_eq!(store.get_string("auth_token").as_deref(), Some("current"));
    }
}
