//! Environment variable loading.
//!
//! Every value is optional here; defaults are applied during merging.

use std::env;
use std::str::FromStr;

use super::ConfigError;

/// Configuration values read from the process environment
#[derive(Default)]
pub struct EnvConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub cors_allowed_origins: Option<String>,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    pub sandbox: Option<bool>,
    pub base_url: Option<String>,
    pub request_timeout_seconds: Option<u64>,
    pub synthesis_submit_path: Option<String>,
    pub synthesis_status_path: Option<String>,
    pub originate_call_path: Option<String>,
    pub default_caller_id: Option<String>,
    pub poll_max_attempts: Option<u32>,
    pub poll_interval_ms: Option<u64>,
    pub synthesis_voice: Option<String>,
    pub synthesis_language: Option<String>,
}

impl EnvConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Ok(Self {
            host: string_var("HOST"),
            port: parse_var("PORT")?,
            cors_allowed_origins: string_var("CORS_ALLOWED_ORIGINS"),
            api_key: string_var("PROVIDER_API_KEY"),
            api_secret: string_var("PROVIDER_API_SECRET"),
            sandbox: bool_var("PROVIDER_SANDBOX")?,
            base_url: string_var("PROVIDER_BASE_URL"),
            request_timeout_seconds: parse_var("REQUEST_TIMEOUT_SECONDS")?,
            synthesis_submit_path: string_var("SYNTHESIS_SUBMIT_PATH"),
            synthesis_status_path: string_var("SYNTHESIS_STATUS_PATH"),
            originate_call_path: string_var("ORIGINATE_CALL_PATH"),
            default_caller_id: string_var("DEFAULT_CALLER_ID"),
            poll_max_attempts: parse_var("POLL_MAX_ATTEMPTS")?,
            poll_interval_ms: parse_var("POLL_INTERVAL_MS")?,
            synthesis_voice: string_var("SYNTHESIS_VOICE"),
            synthesis_language: string_var("SYNTHESIS_LANGUAGE"),
        })
    }
}

/// Read a variable, treating unset and blank the same
fn string_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_var<T>(name: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    string_var(name)
        .map(|raw| {
            raw.parse::<T>().map_err(|e| ConfigError::InvalidValue {
                name: name.to_string(),
                reason: format!("'{raw}': {e}"),
            })
        })
        .transpose()
}

fn bool_var(name: &str) -> Result<Option<bool>, ConfigError> {
    string_var(name)
        .map(|raw| match raw.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::InvalidValue {
                name: name.to_string(),
                reason: format!("'{raw}' is not a boolean"),
            }),
        })
        .transpose()
}
