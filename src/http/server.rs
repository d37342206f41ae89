//! HTTP server setup and request dispatch.
//!
//! # Responsibilities
//! - Create the Axum router with one catch-all handler
//! - Wire up middleware (request ID, tracing, CORS)
//! - Dispatch requests through the route table
//! - Enforce the declared body limit and the whole-request timeout
//! - Funnel every handler error into the fallback handler

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{header, Request},
    middleware,
    response::Response,
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::GatewayConfig;
use crate::error::{ConfigurationError, GatewayError};
use crate::http::cors::{cors_middleware, CorsPolicy};
use crate::http::fallback::FallbackHandler;
use crate::http::health::{health, HEALTH_PATH};
use crate::lifecycle::shutdown;
use crate::observability::metrics;
use crate::proxy::{build_client, ExternalApi, ProxyForwarder, ProxyTarget, EXTERNAL_API_PATH};
use crate::routing::{Dispatch, Handler, RouteTable};

/// Application state injected into the dispatch handler.
#[derive(Clone)]
pub struct AppState {
    pub routes: Arc<RouteTable>,
    pub fallback: FallbackHandler,
    pub metrics_enabled: bool,
    pub max_body_bytes: usize,
    pub request_timeout: Duration,
}

/// HTTP server for the gateway.
pub struct GatewayServer {
    router: Router,
    config: GatewayConfig,
}

impl GatewayServer {
    /// Build the server with the standard route table.
    pub fn new(config: GatewayConfig) -> Result<Self, ConfigurationError> {
        let routes = standard_routes(&config)?;
        Self::with_routes(config, routes)
    }

    /// Build the server around a caller-assembled route table.
    pub fn with_routes(config: GatewayConfig, routes: RouteTable) -> Result<Self, ConfigurationError> {
        let cors = Arc::new(CorsPolicy::from_config(&config.cors)?);
        let state = AppState {
            routes: Arc::new(routes),
            fallback: FallbackHandler::json(config.environment),
            metrics_enabled: config.observability.metrics_enabled,
            max_body_bytes: config.security.max_body_bytes,
            request_timeout: Duration::from_secs(config.timeouts.request_secs),
        };

        let router = Self::build_router(state, cors);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// Body-size and timeout failures are raised inside `gateway_handler` so
    /// they are rendered by the fallback like every other error.
    fn build_router(state: AppState, cors: Arc<CorsPolicy>) -> Router {
        Router::new()
            .route("/", any(gateway_handler))
            .route("/{*path}", any(gateway_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(middleware::from_fn_with_state(cors, cors_middleware)),
            )
    }

    /// Run the server until the shutdown receiver fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown::wait(shutdown_rx))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

/// Proxy prefix, then `/external-api`, then `/health`, in that order.
pub fn standard_routes(config: &GatewayConfig) -> Result<RouteTable, ConfigurationError> {
    let target = Arc::new(ProxyTarget::from_config(&config.upstream)?);
    let client = build_client(&target, &config.timeouts)?;

    let forwarder = ProxyForwarder::new(
        Arc::clone(&target),
        client.clone(),
        config.security.max_body_bytes,
    );

    let mut routes = RouteTable::new();
    routes.register(target.strip_prefix(), Handler::proxy(forwarder))?;
    routes.register(
        EXTERNAL_API_PATH,
        ExternalApi::new(Arc::clone(&target), client).into_handler(),
    )?;
    routes.register(HEALTH_PATH, Handler::local(health))?;

    tracing::info!(
        origin = %target.origin(),
        strip_prefix = %target.strip_prefix(),
        routes = routes.len(),
        "Routes registered"
    );
    Ok(routes)
}

/// Single entry point: route, serve, translate failures.
async fn gateway_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let started = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let (route, outcome) = match state.routes.dispatch(&request) {
        Dispatch::Matched(entry) => {
            tracing::debug!(
                method = %method,
                path = %path,
                route = %entry.prefix(),
                handler = entry.handler().kind(),
                "Dispatching request"
            );
            let outcome = serve_bounded(&state, entry.handler(), request).await;
            (entry.prefix().to_string(), outcome)
        }
        Dispatch::NotFound => {
            tracing::debug!(method = %method, path = %path, "No route matched");
            ("none".to_string(), Err(GatewayError::RouteNotFound { path }))
        }
    };

    let response = match outcome {
        Ok(response) => response,
        Err(error) => state.fallback.handle(error),
    };

    if state.metrics_enabled {
        metrics::record_request(method.as_str(), response.status().as_u16(), &route, started);
    }
    response
}

/// Serve one matched request within the body limit and the request timeout.
///
/// A declared `Content-Length` over the limit is rejected up front; chunked
/// bodies are capped where they are buffered.
async fn serve_bounded(
    state: &AppState,
    handler: &Handler,
    request: Request<Body>,
) -> Result<Response, GatewayError> {
    if let Some(length) = declared_length(&request) {
        if length > state.max_body_bytes as u64 {
            return Err(GatewayError::PayloadTooLarge {
                length,
                limit: state.max_body_bytes,
            });
        }
    }

    tokio::time::timeout(state.request_timeout, handler.serve(request))
        .await
        .map_err(|_| GatewayError::RequestTimeout {
            after: state.request_timeout,
        })?
}

fn declared_length(request: &Request<Body>) -> Option<u64> {
    request
        .headers()
        .get(header::CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .parse()
        .ok()
}
