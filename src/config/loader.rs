//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable holding the upstream bearer credential.
pub const TOKEN_ENV: &str = "EDGE_GATEWAY_UPSTREAM_TOKEN";

/// Environment variable selecting the environment mode.
pub const ENVIRONMENT_ENV: &str = "EDGE_GATEWAY_ENV";

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid {variable}: {message}")]
    Env {
        variable: &'static str,
        message: String,
    },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse configuration from TOML text without validating it.
pub fn parse_config(content: &str) -> Result<GatewayConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Apply environment overrides using the given lookup.
///
/// The lookup is injected so overrides can be exercised without touching the
/// process environment.
pub fn apply_env_overrides<F>(config: &mut GatewayConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(token) = lookup(TOKEN_ENV) {
        config.upstream.bearer_token = token;
    }
    if let Some(mode) = lookup(ENVIRONMENT_ENV) {
        config.environment = mode.parse().map_err(|message| ConfigError::Env {
            variable: ENVIRONMENT_ENV,
            message,
        })?;
    }
    Ok(())
}

/// Load configuration from an optional TOML file plus the process environment,
/// then validate it.
pub fn load_config(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    let mut config = match path {
        Some(path) => parse_config(&fs::read_to_string(path)?)?,
        None => GatewayConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::Environment;

    #[test]
    fn test_parse_partial_file() {
        let config = parse_config(
            r#"
            environment = "development"

            [upstream]
            origin = "http://127.0.0.1:9000/base"
            verify_tls = true

            [timeouts]
            upstream_secs = 10
            "#,
        )
        .unwrap();

        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.upstream.origin, "http://127.0.0.1:9000/base");
        assert_eq!(config.upstream.strip_prefix, "/api");
        assert!(config.upstream.verify_tls);
        assert_eq!(config.timeouts.upstream_secs, 10);
        assert_eq!(config.timeouts.request_secs, 60);
        assert_eq!(config.cors.allow_origin, "*");
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            parse_config("[upstream\norigin = 1"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = GatewayConfig::default();
        apply_env_overrides(&mut config, |key| match key {
            TOKEN_ENV => Some("from-env".to_string()),
            ENVIRONMENT_ENV => Some("development".to_string()),
            _ => None,
        })
        .unwrap();

        assert_eq!(config.upstream.bearer_token, "from-env");
        assert!(config.environment.is_development());
    }

    #[test]
    fn test_bad_environment_override() {
        let mut config = GatewayConfig::default();
        let result = apply_env_overrides(&mut config, |key| {
            (key == ENVIRONMENT_ENV).then(|| "qa".to_string())
        });
        assert!(matches!(result, Err(ConfigError::Env { .. })));
    }
}
