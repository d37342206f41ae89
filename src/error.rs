//! Error types for the gateway.
//!
//! `GatewayError` covers everything that can go wrong while serving a single
//! request; it is always turned into a response by
//! [`FallbackHandler`](crate::http::fallback::FallbackHandler).
//! `ConfigurationError` covers startup problems and is fatal: the process
//! never binds its listener when one is returned.

use std::time::Duration;

use axum::body::Bytes;
use axum::http::{HeaderMap, StatusCode};

/// Fixed client-facing message for any upstream transport failure.
pub const UPSTREAM_FAILURE_MESSAGE: &str = "Error fetching data from external API";

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised while handling one request.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// No registered prefix matched the request path.
    #[error("Not Found")]
    RouteNotFound { path: String },

    /// Connection refused, DNS failure, TLS failure or timeout talking to the upstream.
    #[error("Error fetching data from external API")]
    UpstreamUnavailable {
        #[source]
        source: reqwest::Error,
    },

    /// The upstream answered with an error status. Relayed verbatim.
    #[error("upstream responded with {status}")]
    UpstreamStatus {
        status: StatusCode,
        headers: HeaderMap,
        body: Bytes,
    },

    /// The inbound body could not be read, usually because it exceeded the size limit.
    #[error("Request body too large")]
    RequestBody {
        #[source]
        source: axum::Error,
    },

    /// The declared `Content-Length` is over the configured limit.
    #[error("Request body too large")]
    PayloadTooLarge { length: u64, limit: usize },

    /// The whole request ran longer than `timeouts.request_secs`.
    #[error("Request timed out")]
    RequestTimeout { after: Duration },

    /// Raised by a local handler.
    #[error("{message}")]
    Handler {
        status: Option<StatusCode>,
        message: String,
        #[source]
        source: Option<BoxError>,
    },
}

impl GatewayError {
    /// Convenience constructor for local handlers.
    pub fn handler(status: Option<StatusCode>, message: impl Into<String>) -> Self {
        GatewayError::Handler {
            status,
            message: message.into(),
            source: None,
        }
    }

    /// Status code the client sees for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::RouteNotFound { .. } => StatusCode::NOT_FOUND,
            GatewayError::UpstreamUnavailable { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            GatewayError::UpstreamStatus { status, .. } => *status,
            GatewayError::RequestBody { .. } | GatewayError::PayloadTooLarge { .. } => {
                StatusCode::PAYLOAD_TOO_LARGE
            }
            GatewayError::RequestTimeout { .. } => StatusCode::REQUEST_TIMEOUT,
            GatewayError::Handler { status, .. } => {
                status.unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }

    /// Short machine-readable name, used in development error detail and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::RouteNotFound { .. } => "route_not_found",
            GatewayError::UpstreamUnavailable { .. } => "upstream_unavailable",
            GatewayError::UpstreamStatus { .. } => "upstream_status",
            GatewayError::RequestBody { .. } => "request_body",
            GatewayError::PayloadTooLarge { .. } => "payload_too_large",
            GatewayError::RequestTimeout { .. } => "request_timeout",
            GatewayError::Handler { .. } => "handler",
        }
    }
}

/// Fatal startup errors: bad route registration or unusable upstream settings.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("route prefix {prefix:?} is registered more than once")]
    DuplicatePrefix { prefix: String },

    #[error("route prefix {prefix:?} is malformed: {reason}")]
    MalformedPrefix { prefix: String, reason: &'static str },

    #[error("invalid upstream configuration: {0}")]
    InvalidUpstream(String),

    #[error("invalid CORS configuration: {0}")]
    InvalidCors(String),

    #[error("failed to build upstream client: {0}")]
    Client(#[from] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let not_found = GatewayError::RouteNotFound { path: "/x".into() };
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);
        assert_eq!(not_found.to_string(), "Not Found");

        let teapot = GatewayError::handler(Some(StatusCode::IM_A_TEAPOT), "short and stout");
        assert_eq!(teapot.status(), StatusCode::IM_A_TEAPOT);

        let bare = GatewayError::handler(None, "boom");
        assert_eq!(bare.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(bare.kind(), "handler");
    }

    #[test]
    fn test_upstream_status_passes_through() {
        let err = GatewayError::UpstreamStatus {
            status: StatusCode::NOT_FOUND,
            headers: HeaderMap::new(),
            body: Bytes::from_static(b"missing"),
        };
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_limit_errors() {
        let oversize = GatewayError::PayloadTooLarge { length: 64, limit: 16 };
        assert_eq!(oversize.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(oversize.to_string(), "Request body too large");

        let slow = GatewayError::RequestTimeout {
            after: Duration::from_secs(1),
        };
        assert_eq!(slow.status(), StatusCode::REQUEST_TIMEOUT);
        assert_eq!(slow.kind(), "request_timeout");
    }
}
