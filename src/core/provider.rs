//! Typed operations of the telephony provider API.
//!
//! Thin wrappers over [`RequestDispatcher`] that know the endpoint paths and
//! parameter names. They return the raw [`RemoteResult`]; deciding whether the
//! provider accepted the operation is left to the caller.

use std::sync::Arc;

use http::Method;

use super::dispatcher::{DispatchResult, RemoteResult, RequestDispatcher};
use super::signing::Params;

/// Production API host
pub const PRODUCTION_API_URL: &str = "https://api.zadarma.com";
/// Sandbox API host
pub const SANDBOX_API_URL: &str = "https://api-sandbox.zadarma.com";

pub const BALANCE_PATH: &str = "/v1/info/balance/";
pub const NUMBERS_PATH: &str = "/v1/info/numbers/";
pub const TARIFF_PATH: &str = "/v1/tariff/";
pub const SMS_SEND_PATH: &str = "/v1/sms/send/";
pub const CALLBACK_PATH: &str = "/v1/request/callback/";

pub const DEFAULT_SYNTHESIS_SUBMIT_PATH: &str = "/v1/speech/synthesize/";
pub const DEFAULT_SYNTHESIS_STATUS_PATH: &str = "/v1/speech/status/";
pub const DEFAULT_ORIGINATE_CALL_PATH: &str = "/v1/request/callback/";

/// Endpoint paths used by the voice call workflow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderEndpoints {
    pub synthesis_submit: String,
    pub synthesis_status: String,
    pub originate_call: String,
}

impl Default for ProviderEndpoints {
    fn default() -> Self {
        Self {
            synthesis_submit: DEFAULT_SYNTHESIS_SUBMIT_PATH.to_string(),
            synthesis_status: DEFAULT_SYNTHESIS_STATUS_PATH.to_string(),
            originate_call: DEFAULT_ORIGINATE_CALL_PATH.to_string(),
        }
    }
}

/// Options forwarded with a synthesis job
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SynthesisOptions {
    pub voice: Option<String>,
    pub language: Option<String>,
}

fn params<const N: usize>(pairs: [(&str, &str); N]) -> Params {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Provider API client
#[derive(Clone)]
pub struct ProviderClient {
    dispatcher: Arc<dyn RequestDispatcher>,
    endpoints: ProviderEndpoints,
}

impl ProviderClient {
    pub fn new(dispatcher: Arc<dyn RequestDispatcher>, endpoints: ProviderEndpoints) -> Self {
        Self {
            dispatcher,
            endpoints,
        }
    }

    pub fn dispatcher(&self) -> Arc<dyn RequestDispatcher> {
        self.dispatcher.clone()
    }

    pub fn endpoints(&self) -> &ProviderEndpoints {
        &self.endpoints
    }

    pub async fn balance(&self) -> DispatchResult<RemoteResult> {
        self.dispatcher
            .execute(Method::GET, BALANCE_PATH, &Params::new())
            .await
    }

    pub async fn numbers(&self) -> DispatchResult<RemoteResult> {
        self.dispatcher
            .execute(Method::GET, NUMBERS_PATH, &Params::new())
            .await
    }

    pub async fn tariffs(&self) -> DispatchResult<RemoteResult> {
        self.dispatcher
            .execute(Method::GET, TARIFF_PATH, &Params::new())
            .await
    }

    pub async fn send_sms(&self, number: &str, message: &str) -> DispatchResult<RemoteResult> {
        let p = params([("number", number), ("message", message)]);
        self.dispatcher.execute(Method::POST, SMS_SEND_PATH, &p).await
    }

    /// Ask the provider to ring `from` and then connect it to `to`.
    ///
    /// `from = "auto"` lets the provider pick one of the account's numbers.
    pub async fn request_callback(
        &self,
        from: &str,
        to: &str,
        predicted: bool,
    ) -> DispatchResult<RemoteResult> {
        let predicted = if predicted { "1" } else { "0" };
        let p = params([("from", from), ("to", to), ("predicted", predicted)]);
        self.dispatcher.execute(Method::POST, CALLBACK_PATH, &p).await
    }

    pub async fn submit_synthesis(
        &self,
        text: &str,
        options: &SynthesisOptions,
    ) -> DispatchResult<RemoteResult> {
        let mut p = params([("text", text)]);
        if let Some(voice) = &options.voice {
            p.insert("voice".to_string(), voice.clone());
        }
        if let Some(language) = &options.language {
            p.insert("language".to_string(), language.clone());
        }
        self.dispatcher
            .execute(Method::POST, &self.endpoints.synthesis_submit, &p)
            .await
    }

    /// Place a call from `caller_identity` to `target_number` that plays the
    /// synthesized resource once answered.
    pub async fn originate_call(
        &self,
        caller_identity: &str,
        target_number: &str,
        resource_id: &str,
    ) -> DispatchResult<RemoteResult> {
        let p = params([
            ("from", caller_identity),
            ("to", target_number),
            ("audio_id", resource_id),
            ("predicted", "0"),
        ]);
        self.dispatcher
            .execute(Method::POST, &self.endpoints.originate_call, &p)
            .await
    }
}
