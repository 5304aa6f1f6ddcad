//! Context attached to errors for debugging.

use chrono::{DateTime, Utc};

/// Where and when an error happened.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorContext {
    /// Operation that failed, e.g. `login` or `GET /user/me`.
    pub operation: String,

    /// Storage key involved, if any.
    pub key: Option<String>,

    /// Request URL involved, if any.
    pub url: Option<String>,

    /// Component the error originated in.
    pub component: Option<String>,

    /// When the error occurred.
    pub timestamp: DateTime<Utc>,
}

impl ErrorContext {
    /// Create a new ErrorContext for an operation.
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            key: None,
            url: None,
            component: None,
            timestamp: Utc::now(),
        }
    }

    /// Set the storage key.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Set the request URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set the component.
    pub fn with_component(mut self, component: impl Into<String>) -> Self {
        self.component = Some(component.into());
        self
    }

    /// Format as `key=value` pairs for log lines.
    pub fn to_log_string(&self) -> String {
        let mut parts = vec![format!("operation={}", self.operation)];

        if let Some(ref component) = self.component {
            parts.push(format!("component={}", component));
        }
        if let Some(ref key) = self.key {
            parts.push(format!("key={}", key));
        }
        if let Some(ref url) = self.url {
            parts.push(format!("url={}", url));
        }
        parts.push(format!("timestamp={}", self.timestamp.to_rfc3339()));

        parts.join(" ")
    }
}

impl std::fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.operation)?;

        if let Some(ref key) = self.key {
            write!(f, " key={}", key)?;
        }
        if let Some(ref url) = self.url {
            write!(f, " url={}", url)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_and_display() {
        let ctx = ErrorContext::new("initialize")
            .with_key("user")
            .with_component("session_store");

        assert_eq!(ctx.to_string(), "[initialize] key=user");
        let log = ctx.to_log_string();
        assert!(log.starts_with("operation=initialize"));
        assert!(log.contains("component=session_store"));
        assert!(log.contains("key=user"));
    }

    #[test]
    fn test_url_in_display() {
        let ctx = ErrorContext::new("GET").with_url("http://localhost:3000/api/user/me");
        assert_eq!(ctx.to_string(), "[GET] url=http://localhost:3000/api/user/me");
    }
}
