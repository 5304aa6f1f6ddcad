//! Mock HTTP client for testing.
//!
//! Returns canned responses per URL and records every request it receives,
//! including the headers the interceptors attached.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::NetworkError;
use crate::traits::{HttpClient, HttpRequest, Response};

/// Configuration for a mock response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Return this response (any status).
    Success(Response),
    /// Fail at the transport level.
    Error(NetworkError),
}

impl MockResponse {
    /// Response with a status and a JSON body.
    pub fn json(status: u16, body: &str) -> Self {
        let mut response = Response::new(status, Bytes::from(body.to_string()));
        response
            .headers
            .insert("content-type".to_string(), "application/json".to_string());
        MockResponse::Success(response)
    }

    /// Response with a status and an empty body.
    pub fn status(status: u16) -> Self {
        MockResponse::Success(Response::new(status, Bytes::new()))
    }
}

/// Mock HTTP client for testing.
///
/// ```ignore
/// let client = MockHttpClient::new();
/// client.set_response("http://localhost:3000/api/user/me", MockResponse::status(401));
///
/// let response = client.send(&HttpRequest::new(HttpMethod::Get, url)).await?;
/// assert_eq!(response.status, 401);
/// assert_eq!(client.get_requests().len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockHttpClient {
    responses: Arc<Mutex<HashMap<String, MockResponse>>>,
    default_response: Arc<Mutex<Option<MockResponse>>>,
    requests: Arc<Mutex<Vec<HttpRequest>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a response for a URL. Matched exactly first, then as a prefix.
    pub fn set_response(&self, url: &str, response: MockResponse) {
        lock(&self.responses).insert(url.to_string(), response);
    }

    /// Response for URLs without a specific match.
    pub fn set_default_response(&self, response: MockResponse) {
        *lock(&self.default_response) = Some(response);
    }

    /// All recorded requests, oldest first.
    pub fn get_requests(&self) -> Vec<HttpRequest> {
        lock(&self.requests).clone()
    }

    /// The most recent request.
    pub fn last_request(&self) -> Option<HttpRequest> {
        lock(&self.requests).last().cloned()
    }

    pub fn clear_requests(&self) {
        lock(&self.requests).clear();
    }

    fn get_response(&self, url: &str) -> Option<MockResponse> {
        let responses = lock(&self.responses);

        if let Some(response) = responses.get(url) {
            return Some(response.clone());
        }

        let prefix_match = responses
            .iter()
            .filter(|(pattern, _)| url.starts_with(pattern.as_str()))
            .max_by_key(|(pattern, _)| pattern.len())
            .map(|(_, response)| response.clone());
        if prefix_match.is_some() {
            return prefix_match;
        }

        lock(&self.default_response).clone()
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn send(&self, request: &HttpRequest) -> Result<Response, NetworkError> {
        lock(&self.requests).push(request.clone());

        match self.get_response(&request.url) {
            Some(MockResponse::Success(response)) => Ok(response),
            Some(MockResponse::Error(err)) => Err(err),
            None => Err(NetworkError::Other {
                message: format!("No mock response for URL: {}", request.url),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::HttpMethod;

    #[tokio::test]
    async fn test_send_records_request() {
        let client = MockHttpClient::new();
        client.set_response("https://example.com/user/me", MockResponse::json(200, "{}"));

        let mut request = HttpRequest::new(HttpMethod::Get, "https://example.com/user/me");
        request.set_header("Authorization", "Bearer abc");
        let response = client.send(&request).await.unwrap();

        assert_eq!(response.status, 200);
        let recorded = client.last_request().unwrap();
        assert_eq!(recorded.header("authorization"), Some("Bearer abc"));
    }

    #[tokio::test]
    async fn test_longest_prefix_wins() {
        let client = MockHttpClient::new();
        client.set_response("https://example.com/", MockResponse::status(404));
        client.set_response("https://example.com/user", MockResponse::status(401));

        let request = HttpRequest::new(HttpMethod::Get, "https://example.com/user/me");
        let response = client.send(&request).await.unwrap();
        assert_eq!(response.status, 401);
    }

    #[tokio::test]
    async fn test_transport_error_and_unmatched() {
        let client = MockHttpClient::new();
        client.set_response(
            "https://example.com/slow",
            MockResponse::Error(NetworkError::Timeout {
                url: "https://example.com/slow".to_string(),
                timeout: std::time::Duration::from_secs(30),
            }),
        );

        let slow = HttpRequest::new(HttpMethod::Get, "https://example.com/slow");
        assert!(matches!(
            client.send(&slow).await,
            Err(NetworkError::Timeout { .. })
        ));

        let other = HttpRequest::new(HttpMethod::Get, "https://other.com/");
        assert!(matches!(
            client.send(&other).await,
            Err(NetworkError::Other { .. })
        ));
        assert_eq!(client.get_requests().len(), 2);
    }

    #[tokio::test]
    async fn test_default_response() {
        let client = MockHttpClient::new();
        client.set_default_response(MockResponse::status(204));

        let request = HttpRequest::new(HttpMethod::Delete, "https://anything/");
        assert_eq!(client.send(&request).await.unwrap().status, 204);
    }
}
