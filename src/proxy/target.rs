//! Upstream target and outbound client construction.

use std::time::Duration;

use axum::http::HeaderValue;
use url::Url;

use crate::config::{TimeoutConfig, UpstreamConfig};
use crate::error::ConfigurationError;

/// Validated, read-only form of [`UpstreamConfig`] handed to the forwarder.
pub struct ProxyTarget {
    origin: Url,
    strip_prefix: String,
    authorization: HeaderValue,
    verify_tls: bool,
}

impl ProxyTarget {
    pub fn from_config(config: &UpstreamConfig) -> Result<Self, ConfigurationError> {
        let origin = Url::parse(&config.origin)
            .map_err(|e| ConfigurationError::InvalidUpstream(format!("origin: {e}")))?;
        if origin.cannot_be_a_base() || !matches!(origin.scheme(), "http" | "https") {
            return Err(ConfigurationError::InvalidUpstream(
                "origin must be an http(s) URL".to_string(),
            ));
        }
        if origin.query().is_some() || origin.fragment().is_some() {
            return Err(ConfigurationError::InvalidUpstream(
                "origin must not carry a query or fragment".to_string(),
            ));
        }

        let mut authorization = HeaderValue::from_str(&format!("Bearer {}", config.bearer_token))
            .map_err(|_| {
                ConfigurationError::InvalidUpstream("bearer token is not a valid header value".into())
            })?;
        authorization.set_sensitive(true);

        Ok(Self {
            origin,
            strip_prefix: crate::routing::matcher::normalize_prefix(&config.strip_prefix)?,
            authorization,
            verify_tls: config.verify_tls,
        })
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }

    /// Prefix the forwarder is registered under and removes before forwarding.
    pub fn strip_prefix(&self) -> &str {
        &self.strip_prefix
    }

    /// `Authorization: Bearer <token>`, marked sensitive.
    pub fn authorization(&self) -> &HeaderValue {
        &self.authorization
    }

    pub fn verify_tls(&self) -> bool {
        self.verify_tls
    }
}

impl std::fmt::Debug for ProxyTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxyTarget")
            .field("origin", &self.origin.as_str())
            .field("strip_prefix", &self.strip_prefix)
            .field("verify_tls", &self.verify_tls)
            .finish_non_exhaustive()
    }
}

/// Build the pooled client used for every upstream call.
///
/// Redirects are not followed; the caller sees the upstream's own answer.
pub fn build_client(
    target: &ProxyTarget,
    timeouts: &TimeoutConfig,
) -> Result<reqwest::Client, ConfigurationError> {
    if !target.verify_tls() {
        tracing::warn!(
            origin = %target.origin(),
            "Upstream TLS certificate verification is DISABLED; enable upstream.verify_tls before production use"
        );
    }

    let client = reqwest::Client::builder()
        .danger_accept_invalid_certs(!target.verify_tls())
        .connect_timeout(Duration::from_secs(timeouts.connect_secs))
        .timeout(Duration::from_secs(timeouts.upstream_secs))
        .redirect(reqwest::redirect::Policy::none())
        .no_proxy()
        .build()?;

    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upstream(origin: &str) -> UpstreamConfig {
        UpstreamConfig {
            origin: origin.into(),
            bearer_token: "s3cr3t".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_from_config() {
        let target = ProxyTarget::from_config(&upstream("https://api.example.com/ws/rest")).unwrap();
        assert_eq!(target.strip_prefix(), "/api");
        assert_eq!(target.authorization(), "Bearer s3cr3t");
        assert!(target.authorization().is_sensitive());
        assert!(!target.verify_tls());
    }

    #[test]
    fn test_debug_hides_credential() {
        let target = ProxyTarget::from_config(&upstream("https://api.example.com")).unwrap();
        assert!(!format!("{target:?}").contains("s3cr3t"));
    }

    #[test]
    fn test_rejects_non_http_origin() {
        assert!(ProxyTarget::from_config(&upstream("mailto:ops@example.com")).is_err());
        assert!(ProxyTarget::from_config(&upstream("not a url")).is_err());
        assert!(ProxyTarget::from_config(&upstream("https://api.example.com/p?k=v")).is_err());
    }
}
