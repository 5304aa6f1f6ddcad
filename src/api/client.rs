//! The request pipeline.
//!
//! [`ApiClient`] resolves a path against the configured base URL, applies
//! the default headers and the fixed timeout, runs the interceptor chain and
//! turns non-2xx responses into [`NetworkError::HttpStatus`]. There is no
//! retry and no token refresh.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::interceptor::{BearerAuth, Interceptor, UnauthorizedListener, UnauthorizedReset};
use crate::error::NetworkError;
use crate::startup::ClientConfig;
use crate::traits::{Headers, HttpClient, HttpMethod, HttpRequest, KeyValueStore, Response};

/// HTTP client for the application API.
///
/// ```ignore
/// let api = ApiClient::new(http, store.clone(), &config)
///     .with_unauthorized_listener(session.clone());
/// let me: User = api.get_json("/user/me").await?;
/// ```
pub struct ApiClient {
    http: Arc<dyn HttpClient>,
    store: Arc<dyn KeyValueStore>,
    base_url: String,
    timeout: Duration,
    default_headers: Headers,
    interceptors: Vec<Arc<dyn Interceptor>>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field(
                "interceptors",
                &self.interceptors.iter().map(|i| i.name()).collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client with the built-in interceptors: bearer auth, then the
    /// 401 reset (without a listener).
    pub fn new(
        http: Arc<dyn HttpClient>,
        store: Arc<dyn KeyValueStore>,
        config: &ClientConfig,
    ) -> Self {
        let mut default_headers = Headers::new();
        default_headers.insert("Content-Type".to_string(), "application/json".to_string());

        let interceptors: Vec<Arc<dyn Interceptor>> = vec![
            Arc::new(BearerAuth::new(store.clone())),
            Arc::new(UnauthorizedReset::new(store.clone())),
        ];

        Self {
            http,
            store,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            timeout: config.timeout,
            default_headers,
            interceptors,
        }
    }

    /// Notify `listener` whenever a response is a 401 for the stored
    /// credential, after the persisted token has been deleted.
    pub fn with_unauthorized_listener(mut self, listener: Arc<dyn UnauthorizedListener>) -> Self {
        let reset = UnauthorizedReset::new(self.store.clone()).with_listener(listener);
        self.replace_interceptor(Arc::new(reset));
        self
    }

    /// Append an interceptor, or replace the one registered under the same
    /// name in place.
    pub fn with_interceptor(mut self, interceptor: Arc<dyn Interceptor>) -> Self {
        self.replace_interceptor(interceptor);
        self
    }

    /// Add or replace a header sent with every request.
    pub fn with_default_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.default_headers
            .retain(|k, _| !k.eq_ignore_ascii_case(name));
        self.default_headers.insert(name.to_string(), value.into());
        self
    }

    fn replace_interceptor(&mut self, interceptor: Arc<dyn Interceptor>) {
        match self
            .interceptors
            .iter()
            .position(|i| i.name() == interceptor.name())
        {
            Some(index) => self.interceptors[index] = interceptor,
            None => self.interceptors.push(interceptor),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Names of the installed interceptors, in run order.
    pub fn interceptor_names(&self) -> Vec<&'static str> {
        self.interceptors.iter().map(|i| i.name()).collect()
    }

    /// Absolute URLs pass through; paths are appended to the base URL.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Send a request through the pipeline.
    pub async fn request(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<String>,
    ) -> Result<Response, NetworkError> {
        self.dispatch(self.build(method, path, body)).await
    }

    /// Send a request carrying `token` as its bearer credential instead of
    /// the persisted one. A 401 for it does not touch the stored session.
    pub async fn request_with_token(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<String>,
        token: &str,
    ) -> Result<Response, NetworkError> {
        let mut request = self.build(method, path, body);
        request.set_header("Authorization", format!("Bearer {}", token));
        self.dispatch(request).await
    }

    fn build(&self, method: HttpMethod, path: &str, body: Option<String>) -> HttpRequest {
        let mut request = HttpRequest::new(method, self.url(path)).with_timeout(self.timeout);
        for (name, value) in &self.default_headers {
            request.set_header(name, value.clone());
        }
        if let Some(body) = body {
            request = request.with_body(body);
        }
        request
    }

    async fn dispatch(&self, mut request: HttpRequest) -> Result<Response, NetworkError> {
        for interceptor in &self.interceptors {
            interceptor.before_send(&mut request);
        }

        tracing::debug!(method = %request.method, url = %request.url, "Sending request");
        let response = self.http.send(&request).await.map_err(|e| {
            tracing::debug!(method = %request.method, url = %request.url, error = %e, "Request failed");
            e
        })?;
        tracing::debug!(method = %request.method, url = %request.url, status = response.status, "Received response");

        for interceptor in &self.interceptors {
            interceptor.after_response(&request, &response);
        }

        if !response.is_success() {
            return Err(NetworkError::HttpStatus {
                status: response.status,
                message: error_message(&response),
            });
        }
        Ok(response)
    }

    pub async fn get(&self, path: &str) -> Result<Response, NetworkError> {
        self.request(HttpMethod::Get, path, None).await
    }

    pub async fn delete(&self, path: &str) -> Result<Response, NetworkError> {
        self.request(HttpMethod::Delete, path, None).await
    }

    pub async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Response, NetworkError> {
        self.request(HttpMethod::Post, path, Some(encode(body)?)).await
    }

    pub async fn put<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Response, NetworkError> {
        self.request(HttpMethod::Put, path, Some(encode(body)?)).await
    }

    pub async fn patch<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Response, NetworkError> {
        self.request(HttpMethod::Patch, path, Some(encode(body)?)).await
    }

    /// GET and decode the JSON body.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, NetworkError> {
        decode(&self.get(path).await?)
    }

    /// Send a JSON body with any method and decode the JSON response.
    pub async fn send_json<B, T>(
        &self,
        method: HttpMethod,
        path: &str,
        body: &B,
    ) -> Result<T, NetworkError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.request(method, path, Some(encode(body)?)).await?;
        decode(&response)
    }
}

fn encode<B: Serialize + ?Sized>(body: &B) -> Result<String, NetworkError> {
    serde_json::to_string(body).map_err(|e| NetworkError::Other {
        message: format!("Failed to encode request body: {}", e),
    })
}

pub(crate) fn decode<T: DeserializeOwned>(response: &Response) -> Result<T, NetworkError> {
    response.json().map_err(|e| NetworkError::InvalidResponse {
        message: e.to_string(),
    })
}

/// Best message for a failed response: a JSON `message`/`error` field, the
/// raw body, or the status line.
fn error_message(response: &Response) -> String {
    if let Ok(value) = response.json::<serde_json::Value>() {
        for field in ["message", "error"] {
            if let Some(text) = value.get(field).and_then(|v| v.as_str()) {
                return text.to_string();
            }
        }
    }

    match response.text() {
        Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
        _ => reqwest::StatusCode::from_u16(response.status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("Request failed")
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::{InMemoryStore, MockHttpClient, MockResponse};
    use bytes::Bytes;

    const BASE: &str = "http://localhost:3000/api";

    fn client(http: &MockHttpClient, store: &InMemoryStore) -> ApiClient {
        let config = ClientConfig::default().with_api_base_url(BASE);
        ApiClient::new(Arc::new(http.clone()), Arc::new(store.clone()), &config)
    }

    #[test]
    fn test_url_resolution() {
        let api = client(&MockHttpClient::new(), &InMemoryStore::new());
        assert_eq!(api.url("/user/me"), "http://localhost:3000/api/user/me");
        assert_eq!(api.url("user/me"), "http://localhost:3000/api/user/me");
        assert_eq!(api.url("https://other/x"), "https://other/x");
    }

    #[test]
    fn test_default_interceptor_order() {
        let api = client(&MockHttpClient::new(), &InMemoryStore::new());
        assert_eq!(api.interceptor_names(), vec!["bearer-auth", "unauthorized-reset"]);
    }

    #[tokio::test]
    async fn test_request_carries_defaults_and_bearer() {
        let http = MockHttpClient::new();
        http.set_default_response(MockResponse::json(200, "{}"));
        let store = InMemoryStore::with_entries([("auth_token", "abc")]);
        let api = client(&http, &store);

        api.post("/things", &serde_json::json!({"a": 1})).await.unwrap();

        let sent = http.last_request().unwrap();
        assert_eq!(sent.method, HttpMethod::Post);
        assert_eq!(sent.url, "http://localhost:3000/api/things");
        assert_eq!(sent.header("content-type"), Some("application/json"));
        assert_eq!(sent.header("authorization"), Some("Bearer abc"));
        assert_eq!(sent.timeout, Some(Duration::from_secs(30)));
        assert_eq!(sent.body.as_deref(), Some(r#"{"a":1}"#));
    }

    #[tokio::test]
    async fn test_non_success_becomes_http_status() {
        let http = MockHttpClient::new();
        http.set_default_response(MockResponse::json(422, r#"{"message":"Email taken"}"#));
        let api = client(&http, &InMemoryStore::new());

        let err = api.get("/user/me").await.unwrap_err();
        match err {
            NetworkError::HttpStatus { status, message } => {
                assert_eq!(status, 422);
                assert_eq!(message, "Email taken");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_transport_error_has_no_credential_side_effect() {
        let http = MockHttpClient::new();
        http.set_default_response(MockResponse::Error(NetworkError::Timeout {
            url: format!("{}/user/me", BASE),
            timeout: Duration::from_secs(30),
        }));
        let store = InMemoryStore::with_entries([("auth_token", "abc")]);
        let api = client(&http, &store);

        let err = api.get("/user/me").await.unwrap_err();
        assert!(matches!(err, NetworkError::Timeout { .. }));
        assert!(store.contains_key("auth_token"));
    }

    #[tokio::test]
    async fn test_get_json_invalid_body() {
        let http = MockHttpClient::new();
        http.set_default_response(MockResponse::json(200, "not json"));
        let api = client(&http, &InMemoryStore::new());

        let result: Result<serde_json::Value, _> = api.get_json("/user/me").await;
        assert!(matches!(result, Err(NetworkError::InvalidResponse { .. })));
    }

    #[test]
    fn test_error_message_fallbacks() {
        let plain = Response::new(500, Bytes::from("boom"));
        assert_eq!(error_message(&plain), "boom");

        let empty = Response::new(404, Bytes::new());
        assert_eq!(error_message(&empty), "Not Found");

        let error_field = Response::new(400, Bytes::from(r#"{"error":"bad"}"#));
        assert_eq!(error_message(&error_field), "bad");
    }

    #[test]
    fn test_with_default_header_replaces() {
        let api = client(&MockHttpClient::new(), &InMemoryStore::new())
            .with_default_header("content-type", "text/plain");
        assert_eq!(api.default_headers.len(), 1);
        assert_eq!(
            api.default_headers.get("content-type").map(String::as_str),
            Some("text/plain")
        );
    }
}
