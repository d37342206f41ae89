//! Route lookup and dispatch.
//!
//! # Design Decisions
//! - Immutable after startup (thread-safe without locks)
//! - O(n) prefix scan in registration order; first match wins
//! - Explicit NotFound rather than silent default

use axum::body::Body;
use axum::http::Request;

use crate::error::ConfigurationError;
use crate::routing::handler::Handler;
use crate::routing::matcher::PathPrefixMatcher;

/// A registered prefix and the handler it dispatches to.
#[derive(Debug, Clone)]
pub struct RouteEntry {
    matcher: PathPrefixMatcher,
    handler: Handler,
}

impl RouteEntry {
    pub fn prefix(&self) -> &str {
        self.matcher.prefix()
    }

    pub fn handler(&self) -> &Handler {
        &self.handler
    }
}

/// Result of a route lookup.
#[derive(Debug)]
pub enum Dispatch<'a> {
    Matched(&'a RouteEntry),
    NotFound,
}

impl Dispatch<'_> {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Dispatch::NotFound)
    }
}

/// Ordered prefix table.
#[derive(Debug, Default)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a route. Later registrations never shadow earlier ones.
    pub fn register(&mut self, prefix: &str, handler: Handler) -> Result<(), ConfigurationError> {
        let matcher = PathPrefixMatcher::new(prefix)?;
        if self.entries.iter().any(|e| e.matcher == matcher) {
            return Err(ConfigurationError::DuplicatePrefix {
                prefix: matcher.prefix().to_string(),
            });
        }

        tracing::debug!(prefix = %matcher.prefix(), handler = handler.kind(), "Route registered");
        self.entries.push(RouteEntry { matcher, handler });
        Ok(())
    }

    /// Find the first registered entry whose prefix starts the request path.
    pub fn dispatch(&self, req: &Request<Body>) -> Dispatch<'_> {
        self.dispatch_path(req.uri().path())
    }

    pub fn dispatch_path(&self, path: &str) -> Dispatch<'_> {
        self.entries
            .iter()
            .find(|e| e.matcher.matches_path(path))
            .map_or(Dispatch::NotFound, Dispatch::Matched)
    }

    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
