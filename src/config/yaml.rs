use serde::Deserialize;
use std::path::Path;

use super::ConfigError;

/// Complete YAML configuration structure
///
/// This structure represents the full configuration that can be loaded from a YAML file.
/// All fields are optional to allow partial configuration. Values given here take
/// precedence over environment variables.
///
/// # Example YAML structure
/// ```yaml
/// server:
///   host: "0.0.0.0"
///   port: 3000
///   cors_allowed_origins: "https://app.example.com"
///
/// provider:
///   api_key: "your-api-key"
///   api_secret: "your-api-secret"
///   sandbox: false
///   base_url: "https://api.zadarma.com"
///   request_timeout_seconds: 10
///   endpoints:
///     synthesis_submit: "/v1/speech/synthesize/"
///     synthesis_status: "/v1/speech/status/"
///     originate_call: "/v1/request/callback/"
///
/// workflow:
///   default_caller_id: "auto"
///   poll_max_attempts: 10
///   poll_interval_ms: 2000
///   synthesis_voice: "anna"
///   synthesis_language: "en"
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub server: Option<ServerYaml>,
    pub provider: Option<ProviderYaml>,
    pub workflow: Option<WorkflowYaml>,
}

/// Server configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ServerYaml {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub cors_allowed_origins: Option<String>,
}

/// Provider connection settings from YAML
#[derive(Clone, Deserialize, Default)]
#[serde(default)]
pub struct ProviderYaml {
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    pub sandbox: Option<bool>,
    pub base_url: Option<String>,
    pub request_timeout_seconds: Option<u64>,
    pub endpoints: Option<EndpointsYaml>,
}

impl std::fmt::Debug for ProviderYaml {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderYaml")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_secret", &self.api_secret.as_ref().map(|_| "[REDACTED]"))
            .field("sandbox", &self.sandbox)
            .field("base_url", &self.base_url)
            .field("request_timeout_seconds", &self.request_timeout_seconds)
            .field("endpoints", &self.endpoints)
            .finish()
    }
}

/// Workflow endpoint paths from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct EndpointsYaml {
    pub synthesis_submit: Option<String>,
    pub synthesis_status: Option<String>,
    pub originate_call: Option<String>,
}

/// Voice call workflow settings from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct WorkflowYaml {
    pub default_caller_id: Option<String>,
    pub poll_max_attempts: Option<u32>,
    pub poll_interval_ms: Option<u64>,
    pub synthesis_voice: Option<String>,
    pub synthesis_language: Option<String>,
}

impl YamlConfig {
    /// Load YAML configuration from a file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::parse(&contents)
    }

    /// Parse YAML configuration from a string
    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(contents)?)
    }
}
