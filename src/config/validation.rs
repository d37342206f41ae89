//! Configuration validation.
//!
//! Serde handles syntax; this module checks semantics. All errors are
//! collected so an operator sees every problem in one run.

use std::net::SocketAddr;

use axum::http::{HeaderName, HeaderValue, Method};

use crate::config::schema::GatewayConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("{:?} is not a socket address", config.listener.bind_address),
        ));
    }

    let upstream = &config.upstream;
    match url::Url::parse(&upstream.origin) {
        Ok(url) if url.scheme() != "http" && url.scheme() != "https" => {
            errors.push(ValidationError::new(
                "upstream.origin",
                format!("unsupported scheme {:?}", url.scheme()),
            ))
        }
        Ok(url) if url.query().is_some() || url.fragment().is_some() => errors.push(
            ValidationError::new("upstream.origin", "must not carry a query or fragment"),
        ),
        Ok(_) => {}
        Err(e) => errors.push(ValidationError::new("upstream.origin", e.to_string())),
    }
    if !upstream.strip_prefix.starts_with('/') {
        errors.push(ValidationError::new(
            "upstream.strip_prefix",
            "must start with '/'",
        ));
    }
    if upstream.bearer_token.trim().is_empty() {
        errors.push(ValidationError::new(
            "upstream.bearer_token",
            "missing; set EDGE_GATEWAY_UPSTREAM_TOKEN",
        ));
    } else if HeaderValue::from_str(&format!("Bearer {}", upstream.bearer_token)).is_err() {
        errors.push(ValidationError::new(
            "upstream.bearer_token",
            "contains characters not allowed in a header",
        ));
    }

    let cors = &config.cors;
    if HeaderValue::from_str(&cors.allow_origin).is_err() {
        errors.push(ValidationError::new("cors.allow_origin", "not a valid header value"));
    }
    for method in &cors.allow_methods {
        if Method::from_bytes(method.as_bytes()).is_err() {
            errors.push(ValidationError::new(
                "cors.allow_methods",
                format!("{method:?} is not an HTTP method"),
            ));
        }
    }
    for header in &cors.allow_headers {
        if HeaderName::from_bytes(header.as_bytes()).is_err() {
            errors.push(ValidationError::new(
                "cors.allow_headers",
                format!("{header:?} is not a header name"),
            ));
        }
    }

    let timeouts = &config.timeouts;
    if timeouts.connect_secs == 0 || timeouts.upstream_secs == 0 || timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts", "all timeouts must be > 0"));
    }
    if timeouts.upstream_secs >= timeouts.request_secs {
        errors.push(ValidationError::new(
            "timeouts.upstream_secs",
            "must be lower than timeouts.request_secs so upstream timeouts surface as 500",
        ));
    }

    if config.security.max_body_bytes == 0 {
        errors.push(ValidationError::new("security.max_body_bytes", "must be > 0"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            "not a socket address",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
