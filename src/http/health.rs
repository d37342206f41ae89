//! Local liveness endpoint.

use axum::{
    body::Body,
    http::Request,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::error::GatewayError;

pub const HEALTH_PATH: &str = "/health";

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
}

pub async fn health(_request: Request<Body>) -> Result<Response, GatewayError> {
    Ok(Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
    })
    .into_response())
}
