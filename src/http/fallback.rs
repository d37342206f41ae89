//! Terminal error handling.
//!
//! Every error raised by a local handler or the proxy forwarder ends up here,
//! and this is the only place that turns one into a client-visible response.
//! Error detail (kind and cause chain) is rendered only in development mode.

use std::error::Error as _;
use std::sync::Arc;

use axum::{
    body::Body,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::config::Environment;
use crate::error::GatewayError;

/// Uniform body for a failed request.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorEnvelope {
    #[serde(serialize_with = "serialize_status")]
    pub status: StatusCode,
    pub message: String,
    #[serde(rename = "error", skip_serializing_if = "Option::is_none")]
    pub detail: Option<ErrorDetail>,
}

/// Internal error information, development mode only.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorDetail {
    pub kind: &'static str,
    pub causes: Vec<String>,
}

fn serialize_status<S: serde::Serializer>(status: &StatusCode, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u16(status.as_u16())
}

impl ErrorEnvelope {
    /// Build the envelope for an error. `detail` stays `None` outside development.
    pub fn from_error(error: &GatewayError, mode: Environment) -> Self {
        let detail = mode.is_development().then(|| {
            let mut causes = Vec::new();
            let mut source = error.source();
            while let Some(cause) = source {
                causes.push(cause.to_string());
                source = cause.source();
            }
            ErrorDetail {
                kind: error.kind(),
                causes,
            }
        });

        Self {
            status: error.status(),
            message: error.to_string(),
            detail,
        }
    }
}

/// Produces the final error body. Stands in for the view layer.
pub trait ErrorRenderer: Send + Sync {
    fn render(&self, envelope: &ErrorEnvelope) -> Response;
}

/// Renders the envelope as JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonErrorRenderer;

impl ErrorRenderer for JsonErrorRenderer {
    fn render(&self, envelope: &ErrorEnvelope) -> Response {
        (envelope.status, Json(envelope)).into_response()
    }
}

/// Converts errors into responses.
#[derive(Clone)]
pub struct FallbackHandler {
    mode: Environment,
    renderer: Arc<dyn ErrorRenderer>,
}

impl FallbackHandler {
    pub fn new(mode: Environment, renderer: Arc<dyn ErrorRenderer>) -> Self {
        Self { mode, renderer }
    }

    pub fn json(mode: Environment) -> Self {
        Self::new(mode, Arc::new(JsonErrorRenderer))
    }

    pub fn mode(&self) -> Environment {
        self.mode
    }

    pub fn handle(&self, error: GatewayError) -> Response {
        let status = error.status();
        if status.is_server_error() {
            tracing::error!(kind = error.kind(), status = %status, error = %error, "Request failed");
        } else {
            tracing::warn!(kind = error.kind(), status = %status, error = %error, "Request rejected");
        }

        match error {
            // Upstream error statuses are relayed untouched, not wrapped.
            GatewayError::UpstreamStatus {
                status,
                headers,
                body,
            } => {
                let mut response = Response::new(Body::from(body));
                *response.status_mut() = status;
                *response.headers_mut() = headers;
                response
            }
            other => self
                .renderer
                .render(&ErrorEnvelope::from_error(&other, self.mode)),
        }
    }
}

impl std::fmt::Debug for FallbackHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FallbackHandler").field("mode", &self.mode).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Bytes;
    use axum::http::{header, HeaderMap, HeaderValue};
    use serde_json::Value;

    async fn json_body(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn failing_handler_error() -> GatewayError {
        GatewayError::Handler {
            status: None,
            message: "render failed".into(),
            source: Some("template missing: secret_internal_path".into()),
        }
    }

    #[tokio::test]
    async fn test_not_found_body() {
        let handler = FallbackHandler::json(Environment::Production);
        let response = handler.handle(GatewayError::RouteNotFound {
            path: "/does-not-exist".into(),
        });
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = json_body(response).await;
        assert_eq!(body["status"], 404);
        assert_eq!(body["message"], "Not Found");
        assert!(body.get("error").is_none());
    }

    #[tokio::test]
    async fn test_production_hides_detail() {
        let handler = FallbackHandler::json(Environment::Production);
        let response = handler.handle(failing_handler_error());
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = json_body(response).await;
        assert_eq!(body["message"], "render failed");
        assert!(body.get("error").is_none());
        assert!(!body.to_string().contains("secret_internal_path"));
    }

    #[tokio::test]
    async fn test_development_shows_detail() {
        let handler = FallbackHandler::json(Environment::Development);
        let body = json_body(handler.handle(failing_handler_error())).await;

        assert_eq!(body["message"], "render failed");
        assert_eq!(body["error"]["kind"], "handler");
        assert_eq!(body["error"]["causes"][0], "template missing: secret_internal_path");
    }

    #[tokio::test]
    async fn test_handler_status_respected() {
        let handler = FallbackHandler::json(Environment::Production);
        let response = handler.handle(GatewayError::handler(
            Some(StatusCode::UNPROCESSABLE_ENTITY),
            "bad offer code",
        ));
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_upstream_status_relayed_verbatim() {
        let handler = FallbackHandler::json(Environment::Development);
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));

        let response = handler.handle(GatewayError::UpstreamStatus {
            status: StatusCode::NOT_FOUND,
            headers,
            body: Bytes::from_static(b"no such sale"),
        });

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/plain");
        let bytes = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&bytes[..], b"no such sale");
    }

    struct PlainRenderer;

    impl ErrorRenderer for PlainRenderer {
        fn render(&self, envelope: &ErrorEnvelope) -> Response {
            (envelope.status, envelope.message.clone()).into_response()
        }
    }

    #[tokio::test]
    async fn test_custom_renderer() {
        let handler = FallbackHandler::new(Environment::Production, Arc::new(PlainRenderer));
        let response = handler.handle(GatewayError::RouteNotFound { path: "/x".into() });
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let bytes = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&bytes[..], b"Not Found");
    }
}
