//! Direct upstream call behind `GET /external-api`.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request},
    response::{IntoResponse, Response},
    Json,
};

use crate::error::GatewayError;
use crate::proxy::rewrite::{secure_value, SECURE_HEADER};
use crate::proxy::target::ProxyTarget;
use crate::routing::Handler;

pub const EXTERNAL_API_PATH: &str = "/external-api";

/// Issues one GET to the upstream origin and relays its JSON body.
#[derive(Debug, Clone)]
pub struct ExternalApi {
    target: Arc<ProxyTarget>,
    client: reqwest::Client,
}

impl ExternalApi {
    pub fn new(target: Arc<ProxyTarget>, client: reqwest::Client) -> Self {
        Self { target, client }
    }

    pub async fn fetch(&self, request: Request<Body>) -> Result<Response, GatewayError> {
        // One exact path, GET only; anything else falls through to not-found.
        let path = request.uri().path();
        let exact = path == EXTERNAL_API_PATH || path.strip_suffix('/') == Some(EXTERNAL_API_PATH);
        if !exact || *request.method() != Method::GET {
            return Err(GatewayError::RouteNotFound {
                path: request.uri().path().to_string(),
            });
        }

        let outbound = self
            .client
            .get(self.target.origin().clone())
            .header(header::AUTHORIZATION, self.target.authorization().clone())
            .header(SECURE_HEADER, secure_value(request.headers()));

        let result = async {
            outbound
                .send()
                .await?
                .error_for_status()?
                .json::<serde_json::Value>()
                .await
        }
        .await;

        match result {
            Ok(data) => Ok(Json(data).into_response()),
            Err(e) => {
                let e = e.without_url();
                tracing::error!(error = %e, "Error calling external API");
                Err(GatewayError::UpstreamUnavailable { source: e })
            }
        }
    }

    /// Wrap as a route handler.
    pub fn into_handler(self) -> Handler {
        let api = Arc::new(self);
        Handler::local(move |request: Request<Body>| {
            let api = Arc::clone(&api);
            async move { api.fetch(request).await }
        })
    }
}
