//! Edge gateway library.
//!
//! An HTTP gateway that dispatches requests by path prefix to local handlers
//! or to a reverse proxy in front of a single upstream, with a fixed CORS
//! policy on every response and uniform error translation.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod proxy;
pub mod routing;

pub use config::GatewayConfig;
pub use error::{ConfigurationError, GatewayError};
pub use http::GatewayServer;
pub use lifecycle::Shutdown;
