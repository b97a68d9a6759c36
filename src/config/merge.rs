use crate::core::signing::Credentials;

use super::env::EnvConfig;
use super::yaml::{EndpointsYaml, ProviderYaml, ServerYaml, WorkflowYaml, YamlConfig};
use super::{ConfigError, ServerConfig};

/// Build the final configuration from defaults, environment and optional YAML.
///
/// For every field the YAML value wins over the environment, which wins over
/// the default.
pub fn merge_config(yaml: Option<YamlConfig>) -> Result<ServerConfig, ConfigError> {
    let env = EnvConfig::load()?;
    let yaml = yaml.unwrap_or_default();

    let server = yaml.server.unwrap_or_default();
    let provider = yaml.provider.unwrap_or_default();
    let workflow = yaml.workflow.unwrap_or_default();

    let mut config = ServerConfig::default();
    apply_server(&mut config, &env, server);
    apply_provider(&mut config, &env, provider);
    apply_workflow(&mut config, &env, workflow);

    Ok(config)
}

fn apply_server(config: &mut ServerConfig, env: &EnvConfig, yaml: ServerYaml) {
    if let Some(host) = yaml.host.or_else(|| env.host.clone()) {
        config.host = host;
    }
    if let Some(port) = yaml.port.or(env.port) {
        config.port = port;
    }
    config.cors_allowed_origins = yaml
        .cors_allowed_origins
        .or_else(|| env.cors_allowed_origins.clone());
}

fn apply_provider(config: &mut ServerConfig, env: &EnvConfig, yaml: ProviderYaml) {
    let api_key = yaml
        .api_key
        .or_else(|| env.api_key.clone())
        .unwrap_or_default();
    let api_secret = yaml
        .api_secret
        .or_else(|| env.api_secret.clone())
        .unwrap_or_default();
    config.credentials = Credentials::new(api_key, api_secret);

    if let Some(sandbox) = yaml.sandbox.or(env.sandbox) {
        config.sandbox = sandbox;
    }
    config.base_url = yaml
        .base_url
        .or_else(|| env.base_url.clone())
        .filter(|url| !url.trim().is_empty());
    if let Some(timeout) = yaml.request_timeout_seconds.or(env.request_timeout_seconds) {
        config.request_timeout_seconds = timeout;
    }

    let EndpointsYaml {
        synthesis_submit,
        synthesis_status,
        originate_call,
    } = yaml.endpoints.unwrap_or_default();
    if let Some(path) = synthesis_submit.or_else(|| env.synthesis_submit_path.clone()) {
        config.endpoints.synthesis_submit = path;
    }
    if let Some(path) = synthesis_status.or_else(|| env.synthesis_status_path.clone()) {
        config.endpoints.synthesis_status = path;
    }
    if let Some(path) = originate_call.or_else(|| env.originate_call_path.clone()) {
        config.endpoints.originate_call = path;
    }
}

fn apply_workflow(config: &mut ServerConfig, env: &EnvConfig, yaml: WorkflowYaml) {
    if let Some(caller) = yaml
        .default_caller_id
        .or_else(|| env.default_caller_id.clone())
    {
        config.default_caller_id = caller;
    }
    if let Some(attempts) = yaml.poll_max_attempts.or(env.poll_max_attempts) {
        config.poll_max_attempts = attempts;
    }
    if let Some(interval) = yaml.poll_interval_ms.or(env.poll_interval_ms) {
        config.poll_interval_ms = interval;
    }
    config.synthesis_voice = yaml
        .synthesis_voice
        .or_else(|| env.synthesis_voice.clone());
    config.synthesis_language = yaml
        .synthesis_language
        .or_else(|| env.synthesis_language.clone());
}
