//! Client configuration.
//!
//! [`ClientConfig`] carries everything the bootstrap needs: where the API
//! lives, how long a request may take, and where (and how) local state is
//! persisted.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{SessionKitError, SessionKitResult};

/// Application name, used for the default data directory.
pub const APP_NAME: &str = "sessionkit";

/// Crate version as built.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Fixed timeout applied to every API request.
pub const API_TIMEOUT: Duration = Duration::from_secs(30);

/// API base URL in development builds.
pub const DEV_API_BASE_URL: &str = "http://localhost:3000/api";

/// API base URL in production builds.
pub const PROD_API_BASE_URL: &str = "https://api.yourapp.com";

/// Default storage identifier (file stem of the persisted store).
pub const DEFAULT_STORAGE_ID: &str = "app-storage";

/// Environment variable enabling dev mode.
pub const ENV_DEV: &str = "SESSIONKIT_DEV";
/// Environment variable overriding the API base URL.
pub const ENV_API_URL: &str = "SESSIONKIT_API_URL";
/// Environment variable overriding the request timeout, in milliseconds.
pub const ENV_TIMEOUT_MS: &str = "SESSIONKIT_TIMEOUT_MS";
/// Environment variable overriding the data directory.
pub const ENV_DATA_DIR: &str = "SESSIONKIT_DATA_DIR";
/// Environment variable holding the storage encryption secret.
pub const ENV_ENCRYPTION_KEY: &str = "SESSIONKIT_ENCRYPTION_KEY";

/// Configuration for the session client.
///
/// Use the builder pattern to customize it.
///
/// # Example
///
/// ```ignore
/// use sessionkit::startup::ClientConfig;
///
/// let config = ClientConfig::default()
///     .with_api_base_url("http://localhost:4000/api")
///     .with_encryption_key("secret");
/// ```
#[derive(Clone)]
pub struct ClientConfig {
    /// Dev mode (set via SESSIONKIT_DEV)
    pub dev_mode: bool,
    /// Base URL every request path is appended to
    pub api_base_url: String,
    /// Per-request timeout (default: 30s)
    pub timeout: Duration,
    /// Directory holding the persisted store
    pub data_dir: PathBuf,
    /// File stem of the persisted store (default: "app-storage")
    pub storage_id: String,
    /// Secret for the encrypted store; without one the fallback store is used
    pub encryption_key: Option<String>,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("dev_mode", &self.dev_mode)
            .field("api_base_url", &self.api_base_url)
            .field("timeout", &self.timeout)
            .field("data_dir", &self.data_dir)
            .field("storage_id", &self.storage_id)
            .field(
                "encryption_key",
                &self.encryption_key.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            dev_mode: false,
            api_base_url: PROD_API_BASE_URL.to_string(),
            timeout: API_TIMEOUT,
            data_dir: default_data_dir(),
            storage_id: DEFAULT_STORAGE_ID.to_string(),
            encryption_key: None,
        }
    }
}

/// `<platform data dir>/sessionkit`, or `./.sessionkit` when the platform
/// has none.
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join(APP_NAME))
        .unwrap_or_else(|| PathBuf::from(format!(".{}", APP_NAME)))
}

impl ClientConfig {
    /// Create a new ClientConfig with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable dev mode. Switches the base URL to the local API server.
    pub fn with_dev_mode(mut self, dev_mode: bool) -> Self {
        self.dev_mode = dev_mode;
        self.api_base_url = if dev_mode {
            DEV_API_BASE_URL
        } else {
            PROD_API_BASE_URL
        }
        .to_string();
        self
    }

    /// Set the API base URL. A trailing slash is dropped.
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.api_base_url = url.trim_end_matches('/').to_string();
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the data directory.
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    /// Set the storage identifier.
    pub fn with_storage_id(mut self, id: impl Into<String>) -> Self {
        self.storage_id = id.into();
        self
    }

    /// Set the storage encryption secret.
    pub fn with_encryption_key(mut self, key: impl Into<String>) -> Self {
        self.encryption_key = Some(key.into());
        self
    }

    /// Path of the fallback store's JSON file.
    pub fn fallback_storage_path(&self) -> PathBuf {
        self.data_dir.join(format!("{}.json", self.storage_id))
    }

    /// Create config from the SESSIONKIT_* environment variables.
    ///
    /// Malformed values are ignored with a warning.
    pub fn from_env() -> Self {
        let dev_mode = std::env::var(ENV_DEV).is_ok();
        let mut config = Self::default().with_dev_mode(dev_mode);

        if let Some(url) = non_empty_var(ENV_API_URL) {
            config = config.with_api_base_url(url);
        }

        if let Some(raw) = non_empty_var(ENV_TIMEOUT_MS) {
            match raw.parse::<u64>() {
                Ok(ms) if ms > 0 => config = config.with_timeout(Duration::from_millis(ms)),
                _ => tracing::warn!(value = %raw, "Ignoring invalid {}", ENV_TIMEOUT_MS),
            }
        }

        if let Some(dir) = non_empty_var(ENV_DATA_DIR) {
            config = config.with_data_dir(dir);
        }

        if let Some(key) = non_empty_var(ENV_ENCRYPTION_KEY) {
            config = config.with_encryption_key(key);
        }

        config
    }
}

impl ClientConfig {
    /// Reject settings the pipeline or the storage layer cannot work with.
    pub fn validate(&self) -> SessionKitResult<()> {
        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://") {
            return Err(config_error(format!(
                "API base URL must be http(s): '{}'",
                self.api_base_url
            )));
        }
        if self.timeout.is_zero() {
            return Err(config_error("request timeout must be greater than zero"));
        }
        if self.storage_id.is_empty() || self.storage_id.contains(['/', '\\']) {
            return Err(config_error(format!(
                "storage id must be a plain file name: '{}'",
                self.storage_id
            )));
        }
        Ok(())
    }
}

fn config_error(message: impl Into<String>) -> SessionKitError {
    SessionKitError::Config {
        message: message.into(),
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
