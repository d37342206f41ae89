//! Handler references stored in the route table.

use std::future::Future;
use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use futures_util::future::BoxFuture;

use crate::error::GatewayError;
use crate::proxy::ProxyForwarder;

/// A locally served handler. Implemented for any async closure
/// `Fn(Request<Body>) -> Future<Output = Result<Response, GatewayError>>`.
pub trait LocalHandler: Send + Sync {
    fn call(&self, request: Request<Body>) -> BoxFuture<'static, Result<Response, GatewayError>>;
}

impl<F, Fut> LocalHandler for F
where
    F: Fn(Request<Body>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Response, GatewayError>> + Send + 'static,
{
    fn call(&self, request: Request<Body>) -> BoxFuture<'static, Result<Response, GatewayError>> {
        Box::pin(self(request))
    }
}

/// What a route entry dispatches to.
#[derive(Clone)]
pub enum Handler {
    Local(Arc<dyn LocalHandler>),
    Proxy(Arc<ProxyForwarder>),
}

impl Handler {
    pub fn local(handler: impl LocalHandler + 'static) -> Self {
        Handler::Local(Arc::new(handler))
    }

    pub fn proxy(forwarder: ProxyForwarder) -> Self {
        Handler::Proxy(Arc::new(forwarder))
    }

    /// Serve the request. Errors go back to the caller for the fallback handler.
    pub async fn serve(&self, request: Request<Body>) -> Result<Response, GatewayError> {
        match self {
            Handler::Local(handler) => handler.call(request).await,
            Handler::Proxy(forwarder) => forwarder.forward(request).await,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Handler::Local(_) => "local",
            Handler::Proxy(_) => "proxy",
        }
    }
}

impl std::fmt::Debug for Handler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.kind())
    }
}
