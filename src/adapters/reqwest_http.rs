//! Reqwest-based HTTP transport.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::{classify_reqwest_error, NetworkError};
use crate::traits::{Headers, HttpClient, HttpMethod, HttpRequest, Response};

/// Timeout reported for requests sent without one.
const UNBOUNDED_TIMEOUT_REPORT: Duration = Duration::from_secs(0);

/// HTTP client implementation using reqwest.
///
/// Non-2xx statuses are returned as responses, not errors; the request
/// pipeline decides what a status means.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Wrap a preconfigured reqwest::Client (TLS, pools, proxies).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub fn inner(&self) -> &reqwest::Client {
        &self.client
    }

    fn method(method: HttpMethod) -> reqwest::Method {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }

    fn convert_headers(headers: &reqwest::header::HeaderMap) -> Headers {
        headers
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.to_string(), v.to_string()))
            })
            .collect()
    }

    fn build(&self, request: &HttpRequest) -> reqwest::RequestBuilder {
        let mut builder = self
            .client
            .request(Self::method(request.method), &request.url);

        for (key, value) in &request.headers {
            builder = builder.header(key, value);
        }
        if let Some(ref body) = request.body {
            builder = builder.body(body.clone());
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }
        builder
    }
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn send(&self, request: &HttpRequest) -> Result<Response, NetworkError> {
        let timeout = request.timeout.unwrap_or(UNBOUNDED_TIMEOUT_REPORT);
        let classify = |e: reqwest::Error| classify_reqwest_error(&e, &request.url, timeout);

        let response = self.build(request).send().await.map_err(classify)?;

        let status = response.status().as_u16();
        let headers = Self::convert_headers(response.headers());
        let body = response.bytes().await.map_err(classify)?;

        Ok(Response::with_headers(status, headers, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_headers() {
        let mut header_map = reqwest::header::HeaderMap::new();
        header_map.insert(
            reqwest::header::CONTENT_TYPE,
            "application/json".parse().unwrap(),
        );

        let headers = ReqwestHttpClient::convert_headers(&header_map);
        assert_eq!(
            headers.get("content-type"),
            Some(&"application/json".to_string())
        );
    }

    #[test]
    fn test_build_applies_headers_body_and_timeout() {
        let client = ReqwestHttpClient::new();
        let mut request = HttpRequest::new(HttpMethod::Patch, "http://localhost:3000/api/user/me")
            .with_body(r#"{"name":"A"}"#)
            .with_timeout(Duration::from_secs(30));
        request.set_header("Authorization", "Bearer abc");

        let built = client.build(&request).build().unwrap();
        assert_eq!(built.method(), reqwest::Method::PATCH);
        assert_eq!(built.headers()["authorization"], "Bearer abc");
        assert_eq!(built.timeout(), Some(&Duration::from_secs(30)));
        assert_eq!(
            built.body().and_then(|b| b.as_bytes()),
            Some(br#"{"name":"A"}"#.as_slice())
        );
    }

    #[tokio::test]
    async fn test_connection_refused() {
        let client = ReqwestHttpClient::new();
        let request = HttpRequest::new(HttpMethod::Get, "http://127.0.0.1:59999/user/me")
            .with_timeout(Duration::from_secs(5));
        let result = client.send(&request).await;
        assert!(matches!(
            result,
            Err(NetworkError::ConnectionFailed { .. }) | Err(NetworkError::Other { .. })
        ));
    }

    #[tokio::test]
    async fn test_invalid_url() {
        let client = ReqwestHttpClient::new();
        let request = HttpRequest::new(HttpMethod::Get, "not-a-valid-url");
        assert!(client.send(&request).await.is_err());
    }
}
