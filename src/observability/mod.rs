//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, histograms)
//! HTTP layer adds:
//!     → tower-http TraceLayer span per request (access log)
//!     → x-request-id on request, response and upstream call
//! ```

pub mod logging;
pub mod metrics;
