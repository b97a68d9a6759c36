use url::Url;

use super::{ConfigError, ServerConfig};

/// Upper bound on the wait between status queries
pub const MAX_POLL_INTERVAL_MS: u64 = 60_000;

/// Validate a merged configuration
pub fn validate(config: &ServerConfig) -> Result<(), ConfigError> {
    validate_credentials(config)?;
    validate_base_url(config)?;
    validate_workflow(config)?;
    validate_endpoints(config)?;
    Ok(())
}

fn validate_credentials(config: &ServerConfig) -> Result<(), ConfigError> {
    if config.credentials.key_id().is_empty() {
        return Err(ConfigError::Validation(
            "PROVIDER_API_KEY (provider.api_key) is required".to_string(),
        ));
    }
    if !config.credentials.has_secret() {
        return Err(ConfigError::Validation(
            "PROVIDER_API_SECRET (provider.api_secret) is required".to_string(),
        ));
    }
    Ok(())
}

fn validate_base_url(config: &ServerConfig) -> Result<(), ConfigError> {
    let Some(raw) = config.base_url.as_deref() else {
        return Ok(());
    };
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidValue {
        name: "PROVIDER_BASE_URL".to_string(),
        reason: format!("'{raw}': {e}"),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidValue {
            name: "PROVIDER_BASE_URL".to_string(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }
    Ok(())
}

fn validate_workflow(config: &ServerConfig) -> Result<(), ConfigError> {
    if config.poll_max_attempts == 0 {
        return Err(ConfigError::Validation(
            "poll_max_attempts must be at least 1".to_string(),
        ));
    }
    if config.poll_interval_ms > MAX_POLL_INTERVAL_MS {
        return Err(ConfigError::Validation(format!(
            "poll_interval_ms must not exceed {MAX_POLL_INTERVAL_MS}"
        )));
    }
    if config.request_timeout_seconds == 0 {
        return Err(ConfigError::Validation(
            "request_timeout_seconds must be at least 1".to_string(),
        ));
    }
    if config.default_caller_id.trim().is_empty() {
        return Err(ConfigError::Validation(
            "default_caller_id must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_endpoints(config: &ServerConfig) -> Result<(), ConfigError> {
    let endpoints = &config.endpoints;
    for (name, path) in [
        ("synthesis_submit", &endpoints.synthesis_submit),
        ("synthesis_status", &endpoints.synthesis_status),
        ("originate_call", &endpoints.originate_call),
    ] {
        if !path.starts_with('/') {
            return Err(ConfigError::InvalidValue {
                name: format!("endpoints.{name}"),
                reason: format!("'{path}' must start with '/'"),
            });
        }
    }
    Ok(())
}
