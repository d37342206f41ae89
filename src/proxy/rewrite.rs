//! Path rewriting and outbound header preparation.

use axum::http::{header, HeaderMap, HeaderName, HeaderValue};
use url::Url;

/// Caller header forwarded verbatim as upstream context.
pub const SECURE_HEADER: HeaderName = HeaderName::from_static("secure");

/// Connection-scoped headers that never cross the proxy.
const HOP_BY_HOP: [HeaderName; 8] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// Remove `prefix` once from the start of `path`.
///
/// The result always starts with exactly one `/`.
pub fn rewrite_path(path: &str, prefix: &str) -> String {
    let rest = path.strip_prefix(prefix).unwrap_or(path);
    let rest = rest.trim_start_matches('/');
    format!("/{rest}")
}

/// Join the upstream origin (which may carry a base path) with a rewritten path and query.
pub fn upstream_url(origin: &Url, path: &str, query: Option<&str>) -> String {
    let base = origin.as_str().trim_end_matches('/');
    match query {
        Some(q) if !q.is_empty() => format!("{base}{path}?{q}"),
        _ => format!("{base}{path}"),
    }
}

/// Copy caller headers for the outbound request.
///
/// Drops hop-by-hop headers, `host` (the client sets the upstream's own) and
/// `content-length` (recomputed from the buffered body), then injects the
/// credential and the caller's `secure` value.
pub fn outbound_headers(inbound: &HeaderMap, authorization: &HeaderValue) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(inbound.len() + 2);
    for (name, value) in inbound {
        if is_hop_by_hop(name) || *name == header::HOST || *name == header::CONTENT_LENGTH {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }

    headers.insert(header::AUTHORIZATION, authorization.clone());
    headers.insert(SECURE_HEADER, secure_value(inbound));
    headers
}

/// The caller's `secure` value, unvalidated. An absent header becomes empty.
pub fn secure_value(inbound: &HeaderMap) -> HeaderValue {
    inbound
        .get(&SECURE_HEADER)
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static(""))
}

/// Copy upstream response headers back to the caller.
///
/// Upstream `access-control-*` headers are dropped so the gateway's own CORS
/// policy is the only one the caller sees.
pub fn inbound_headers(upstream: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(upstream.len());
    for (name, value) in upstream {
        if is_hop_by_hop(name) || name.as_str().starts_with("access-control-") {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }
    headers
}

fn is_hop_by_hop(name: &HeaderName) -> bool {
    HOP_BY_HOP.contains(name)
}
