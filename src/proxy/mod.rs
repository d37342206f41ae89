//! Upstream proxying subsystem.
//!
//! # Data Flow
//! ```text
//! Request under the proxy prefix (already within the body limit and timeout)
//!     → forwarder.rs (OPTIONS answered locally, otherwise:)
//!     → rewrite.rs (strip prefix, build URL, inject Authorization + secure)
//!     → reqwest client (target.rs; one attempt, timeouts, TLS policy)
//!     → success: status/headers/body streamed back
//!     → error status: GatewayError::UpstreamStatus (relayed verbatim)
//!     → transport failure: GatewayError::UpstreamUnavailable (500)
//! ```
//!
//! # Design Decisions
//! - The credential lives in `ProxyTarget`, passed to handlers by `Arc`
//! - The caller's `secure` header is passed through unvalidated; it must be
//!   validated before this gateway is trusted in production. Both the
//!   forwarder and `/external-api` send it empty when the caller omits it
//! - TLS verification is configurable and off by default; startup warns

pub mod external;
pub mod forwarder;
pub mod rewrite;
pub mod target;

pub use external::{ExternalApi, EXTERNAL_API_PATH};
pub use forwarder::ProxyForwarder;
pub use target::{build_client, ProxyTarget};
