//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → cors.rs (policy merged into every response)
//!     → routing::RouteTable (first matching prefix)
//!     → local handler | proxy::ProxyForwarder
//!     → fallback.rs (errors and unmatched routes → response)
//!     → Send to client
//! ```

pub mod cors;
pub mod fallback;
pub mod health;
pub mod server;

pub use cors::CorsPolicy;
pub use fallback::{ErrorEnvelope, ErrorRenderer, FallbackHandler, JsonErrorRenderer};
pub use server::{standard_routes, AppState, GatewayServer};
