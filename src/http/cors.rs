//! Cross-origin access-control headers.
//!
//! The policy is computed once at startup. The middleware merges it into
//! every outgoing response: headers a handler already set (the proxy
//! preflight answer, for instance) are kept, missing ones are filled in.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, HeaderValue, Request},
    middleware::Next,
    response::Response,
};

use crate::config::CorsConfig;
use crate::error::ConfigurationError;

/// Pre-computed access-control header set.
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    headers: HeaderMap,
}

impl CorsPolicy {
    pub fn from_config(config: &CorsConfig) -> Result<Self, ConfigurationError> {
        let mut headers = HeaderMap::new();

        headers.insert(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            header_value(&config.allow_origin)?,
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            header_value(&config.allow_methods.join(", "))?,
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            header_value(&config.allow_headers.join(", "))?,
        );
        if config.allow_credentials {
            headers.insert(
                header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
                HeaderValue::from_static("true"),
            );
        }

        Ok(Self { headers })
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Add every policy header the response does not already carry.
    pub fn apply(&self, target: &mut HeaderMap) {
        for (name, value) in &self.headers {
            if !target.contains_key(name) {
                target.insert(name.clone(), value.clone());
            }
        }
    }
}

fn header_value(raw: &str) -> Result<HeaderValue, ConfigurationError> {
    HeaderValue::from_str(raw)
        .map_err(|_| ConfigurationError::InvalidCors(format!("{raw:?} is not a valid header value")))
}

/// Attach the policy to the response produced by the rest of the stack.
pub async fn cors_middleware(
    State(policy): State<Arc<CorsPolicy>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    policy.apply(response.headers_mut());
    response
}
