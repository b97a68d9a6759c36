//! Configuration module for the voice call gateway
//!
//! This module handles server configuration from various sources: .env files, YAML files,
//! and environment variables. Priority: YAML > ENV vars > .env values > defaults.
//!
//! # Modules
//! - `yaml`: YAML configuration file loading
//! - `env`: Environment variable loading
//! - `merge`: Merging YAML and environment configurations
//! - `validation`: Configuration validation logic
//!
//! # Example
//! ```rust,no_run
//! use voicecall_gateway::config::ServerConfig;
//! use std::path::PathBuf;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load from environment variables only
//! let config = ServerConfig::from_env()?;
//!
//! // Load from YAML file with environment variable overrides
//! let config_path = PathBuf::from("config.yaml");
//! let config = ServerConfig::from_file(&config_path)?;
//!
//! println!("Server listening on {}", config.address());
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::core::orchestrator::{AUTO_CALLER_ID, WorkflowSettings};
use crate::core::provider::{
    PRODUCTION_API_URL, ProviderEndpoints, SANDBOX_API_URL, SynthesisOptions,
};
use crate::core::signing::Credentials;

mod env;
mod merge;
mod validation;
mod yaml;

pub use yaml::YamlConfig;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 10;
pub const DEFAULT_POLL_MAX_ATTEMPTS: u32 = 10;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2000;

/// Errors raised while loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid value for {name}: {reason}")]
    InvalidValue { name: String, reason: String },

    #[error("Configuration error: {0}")]
    Validation(String),
}

/// Server configuration
///
/// Contains everything needed to run the gateway:
/// - Server settings (host, port)
/// - Provider credentials and host selection (sandbox or production)
/// - Voice call workflow settings (default caller id, polling budget)
#[derive(Debug, Clone)]
pub struct ServerConfig {
    // Server settings
    pub host: String,
    pub port: u16,
    /// Comma separated CORS origins, `*` for any; unset means same-origin only
    pub cors_allowed_origins: Option<String>,

    // Provider settings
    /// API key and secret; the secret is zeroized when dropped
    pub credentials: Credentials,
    /// Use the provider's sandbox host instead of production
    pub sandbox: bool,
    /// Explicit provider base URL, overrides `sandbox` (used for local mocks)
    pub base_url: Option<String>,
    /// Per-request timeout, connect included
    pub request_timeout_seconds: u64,
    /// Paths of the workflow operations
    pub endpoints: ProviderEndpoints,

    // Workflow settings
    /// Caller id used when a request does not name one ("auto" lets the provider pick)
    pub default_caller_id: String,
    /// Maximum number of synthesis status queries per run
    pub poll_max_attempts: u32,
    /// Wait between status queries
    pub poll_interval_ms: u64,
    pub synthesis_voice: Option<String>,
    pub synthesis_language: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            cors_allowed_origins: None,
            credentials: Credentials::default(),
            sandbox: false,
            base_url: None,
            request_timeout_seconds: DEFAULT_REQUEST_TIMEOUT_SECONDS,
            endpoints: ProviderEndpoints::default(),
            default_caller_id: AUTO_CALLER_ID.to_string(),
            poll_max_attempts: DEFAULT_POLL_MAX_ATTEMPTS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            synthesis_voice: None,
            synthesis_language: None,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// The `.env` file is loaded by `main` before this is called, so its values
    /// are visible here as ordinary environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = merge::merge_config(None)?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a YAML file with environment variable base
    ///
    /// Priority order (highest to lowest):
    /// 1. YAML file values
    /// 2. Environment variables (actual ENV vars override .env values)
    /// 3. .env file values
    /// 4. Default values
    ///
    /// After loading and merging, performs validation on the final configuration.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let yaml_config = yaml::YamlConfig::from_file(path)?;
        let config = merge::merge_config(Some(yaml_config))?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Get the server address as a string
    ///
    /// Returns the address in the format "host:port"
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Base URL of the provider API
    ///
    /// An explicit `base_url` wins; otherwise the sandbox or production host.
    pub fn provider_base_url(&self) -> &str {
        match &self.base_url {
            Some(url) => url,
            None if self.sandbox => SANDBOX_API_URL,
            None => PRODUCTION_API_URL,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Settings handed to the call orchestrator
    pub fn workflow_settings(&self) -> WorkflowSettings {
        WorkflowSettings {
            default_caller_id: self.default_caller_id.clone(),
            poll_max_attempts: self.poll_max_attempts,
            poll_interval: self.poll_interval(),
            synthesis: SynthesisOptions {
                voice: self.synthesis_voice.clone(),
                language: self.synthesis_language.clone(),
            },
        }
    }
}
