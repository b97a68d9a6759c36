use std::sync::Arc;

use tracing::info;

use crate::config::ServerConfig;
use crate::core::dispatcher::{DispatchResult, HttpDispatcher, RequestDispatcher};
use crate::core::orchestrator::CallOrchestrator;
use crate::core::provider::ProviderClient;

/// Application state shared by all handlers
pub struct AppState {
    pub config: ServerConfig,
    pub provider: ProviderClient,
    pub orchestrator: CallOrchestrator,
}

impl AppState {
    /// Build state talking to the configured provider over HTTP
    pub fn new(config: ServerConfig) -> DispatchResult<Arc<Self>> {
        let dispatcher = HttpDispatcher::new(
            config.provider_base_url(),
            Arc::new(config.credentials.clone()),
            config.request_timeout(),
        )?;

        info!(
            base_url = %dispatcher.base_url(),
            key_id = %config.credentials.masked_key_id(),
            sandbox = config.sandbox,
            "Provider client configured"
        );

        Ok(Self::with_dispatcher(config, Arc::new(dispatcher)))
    }

    /// Build state on top of an arbitrary dispatcher
    pub fn with_dispatcher(config: ServerConfig, dispatcher: Arc<dyn RequestDispatcher>) -> Arc<Self> {
        let provider = ProviderClient::new(dispatcher, config.endpoints.clone());
        let orchestrator = CallOrchestrator::new(provider.clone(), config.workflow_settings());

        Arc::new(Self {
            config,
            provider,
            orchestrator,
        })
    }
}
