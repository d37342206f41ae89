//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path)
//!     → router.rs (scan entries in registration order)
//!     → matcher.rs (literal prefix test)
//!     → Return: Matched(entry) or NotFound
//!
//! Route registration (at startup):
//!     (prefix, Handler)
//!     → normalize prefix, reject duplicates
//!     → append to immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Routes registered at startup, immutable at runtime
//! - Deterministic: same path always matches same route
//! - First registered match wins; stripping is the handler's concern

pub mod handler;
pub mod matcher;
pub mod router;

pub use handler::{Handler, LocalHandler};
pub use router::{Dispatch, RouteEntry, RouteTable};
