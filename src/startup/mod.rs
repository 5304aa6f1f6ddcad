//! Startup: configuration and component wiring.
//!
//! - [`config`] - [`ClientConfig`] and application constants
//! - [`context`] - [`AppContext`], built once per process
//!
//! # Usage
//!
//! ```ignore
//! use sessionkit::startup::{AppContext, ClientConfig};
//!
//! let ctx = AppContext::bootstrap(ClientConfig::from_env()).await;
//! if ctx.session.is_authenticated() {
//!     let me = ctx.api.current_user().await?;
//! }
//! ```

pub mod config;
pub mod context;

pub use config::{ClientConfig, API_TIMEOUT, APP_NAME, APP_VERSION};
pub use context::AppContext;
