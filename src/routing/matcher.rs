//! Route matching logic.
//!
//! # Design Decisions
//! - Path matching is a literal, case-sensitive prefix test
//! - No regex to guarantee O(n) matching
//! - Prefixes are normalized once at registration

use axum::body::Body;
use axum::http::Request;

use crate::error::ConfigurationError;

/// Matches the request path prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    /// Create a matcher from a raw prefix, normalizing it first.
    pub fn new(prefix: &str) -> Result<Self, ConfigurationError> {
        Ok(Self {
            prefix: normalize_prefix(prefix)?,
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns true if the path starts with this prefix.
    pub fn matches_path(&self, path: &str) -> bool {
        path.starts_with(&self.prefix)
    }

    /// Returns true if the request path starts with this prefix.
    pub fn matches(&self, req: &Request<Body>) -> bool {
        self.matches_path(req.uri().path())
    }
}

/// Normalize a route prefix: must be absolute, trailing slashes are dropped
/// (except for the root prefix itself).
pub fn normalize_prefix(prefix: &str) -> Result<String, ConfigurationError> {
    let trimmed = prefix.trim();
    if trimmed.is_empty() {
        return Err(ConfigurationError::MalformedPrefix {
            prefix: prefix.to_string(),
            reason: "prefix is empty",
        });
    }
    if !trimmed.starts_with('/') {
        return Err(ConfigurationError::MalformedPrefix {
            prefix: prefix.to_string(),
            reason: "prefix must start with '/'",
        });
    }
    if trimmed.contains(['?', '#']) {
        return Err(ConfigurationError::MalformedPrefix {
            prefix: prefix.to_string(),
            reason: "prefix must be a plain path",
        });
    }

    let without_trailing = trimmed.trim_end_matches('/');
    if without_trailing.is_empty() {
        Ok("/".to_string())
    } else {
        Ok(without_trailing.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_matcher() {
        let matcher = PathPrefixMatcher::new("/api").unwrap();

        let req1 = Request::builder()
            .uri("http://example.com/api/v1")
            .body(Body::default())
            .unwrap();
        assert!(matcher.matches(&req1));

        let req2 = Request::builder()
            .uri("http://example.com/images")
            .body(Body::default())
            .unwrap();
        assert!(!matcher.matches(&req2));

        // Case sensitive
        assert!(!matcher.matches_path("/API/v1"));
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize_prefix("/api/").unwrap(), "/api");
        assert_eq!(normalize_prefix(" /dashboard ").unwrap(), "/dashboard");
        assert_eq!(normalize_prefix("///").unwrap(), "/");
        assert_eq!(normalize_prefix("/").unwrap(), "/");
    }

    #[test]
    fn test_normalize_rejects_malformed() {
        assert!(matches!(
            normalize_prefix(""),
            Err(ConfigurationError::MalformedPrefix { .. })
        ));
        assert!(matches!(
            normalize_prefix("api"),
            Err(ConfigurationError::MalformedPrefix { .. })
        ));
        assert!(matches!(
            normalize_prefix("/api?x=1"),
            Err(ConfigurationError::MalformedPrefix { .. })
        ));
    }
}
