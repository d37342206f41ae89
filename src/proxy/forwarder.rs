//! Reverse-proxy forwarding to the upstream.
//!
//! One attempt per request. Preflight requests are answered locally and
//! never reach the upstream.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, HeaderValue, Method, Request, StatusCode},
    response::Response,
};

use crate::error::GatewayError;
use crate::proxy::rewrite::{inbound_headers, outbound_headers, rewrite_path, upstream_url};
use crate::proxy::target::ProxyTarget;

const PREFLIGHT_ALLOW_ORIGIN: HeaderValue = HeaderValue::from_static("*");
const PREFLIGHT_ALLOW_METHODS: HeaderValue =
    HeaderValue::from_static("GET, POST, PUT, DELETE, OPTIONS");
const PREFLIGHT_ALLOW_HEADERS: HeaderValue = HeaderValue::from_static("Content-Type, Authorization");

/// Forwards requests under the target's prefix to the upstream origin.
#[derive(Debug, Clone)]
pub struct ProxyForwarder {
    target: Arc<ProxyTarget>,
    client: reqwest::Client,
    max_body_bytes: usize,
}

impl ProxyForwarder {
    pub fn new(target: Arc<ProxyTarget>, client: reqwest::Client, max_body_bytes: usize) -> Self {
        Self {
            target,
            client,
            max_body_bytes,
        }
    }

    pub fn target(&self) -> &ProxyTarget {
        &self.target
    }

    pub async fn forward(&self, request: Request<Body>) -> Result<Response, GatewayError> {
        if *request.method() == Method::OPTIONS {
            tracing::debug!(path = %request.uri().path(), "Answering preflight locally");
            return Ok(preflight_response());
        }

        let (parts, body) = request.into_parts();
        let path = rewrite_path(parts.uri.path(), self.target.strip_prefix());
        let url = upstream_url(self.target.origin(), &path, parts.uri.query());
        let headers = outbound_headers(&parts.headers, self.target.authorization());

        let body = axum::body::to_bytes(body, self.max_body_bytes)
            .await
            .map_err(|source| GatewayError::RequestBody { source })?;

        tracing::debug!(
            method = %parts.method,
            from = %parts.uri.path(),
            to = %path,
            "Forwarding to upstream"
        );

        let upstream = self
            .client
            .request(parts.method, url)
            .headers(headers)
            .body(body)
            .send()
            .await
            .map_err(|e| GatewayError::UpstreamUnavailable {
                source: e.without_url(),
            })?;

        let status = upstream.status();
        let headers = inbound_headers(upstream.headers());

        if status.is_client_error() || status.is_server_error() {
            let body = upstream
                .bytes()
                .await
                .map_err(|e| GatewayError::UpstreamUnavailable {
                    source: e.without_url(),
                })?;
            return Err(GatewayError::UpstreamStatus {
                status,
                headers,
                body,
            });
        }

        let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        Ok(response)
    }
}

/// 200 with the narrower preflight header set and an empty body.
fn preflight_response() -> Response {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::OK;
    let headers = response.headers_mut();
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, PREFLIGHT_ALLOW_ORIGIN);
    headers.insert(header::ACCESS_CONTROL_ALLOW_METHODS, PREFLIGHT_ALLOW_METHODS);
    headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, PREFLIGHT_ALLOW_HEADERS);
    response
}
