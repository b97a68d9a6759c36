//! Signed request execution against the telephony provider.
//!
//! [`RequestDispatcher`] is the seam between the workflow logic and the
//! network. [`HttpDispatcher`] is the production implementation on top of
//! `reqwest`; tests drive the workflow through
//! [`MockDispatcher`](crate::core::mock::MockDispatcher) instead.
//!
//! The dispatcher does not interpret the provider's own success/error
//! convention. An HTTP exchange that completed and produced JSON is always an
//! `Ok(RemoteResult)`, even when the payload says `"status": "error"`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use http::Method;
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use super::signing::{Credentials, Params, SignedRequest};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Classified failure of a single provider request
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DispatchError {
    /// Connection could not be established, timed out, or broke mid-response
    #[error("Transport error: {0}")]
    Transport(String),

    /// The provider answered but the body is not valid JSON
    #[error("Failed to decode provider response (HTTP {status}): {reason}")]
    Decode {
        status: u16,
        body: String,
        reason: String,
    },

    /// The request could not be built (bad base URL, unusable method)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl DispatchError {
    /// Raw response body for decode failures, useful in diagnostics
    pub fn raw_body(&self) -> Option<&str> {
        match self {
            DispatchError::Decode { body, .. } => Some(body),
            _ => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, DispatchError::Transport(_))
    }
}

pub type DispatchResult<T> = Result<T, DispatchError>;

/// Normalized provider response.
///
/// Carries the transport status code and the decoded payload together.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RemoteResult {
    pub status: u16,
    pub payload: Value,
}

impl RemoteResult {
    pub fn new(status: u16, payload: Value) -> Self {
        Self { status, payload }
    }

    /// Shorthand for an HTTP 200 result
    pub fn ok(payload: Value) -> Self {
        Self::new(200, payload)
    }

    pub fn is_http_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_server_error(&self) -> bool {
        self.status >= 500
    }

    /// Top-level `status` field of the provider payload
    pub fn provider_status(&self) -> Option<&str> {
        self.str_field("status")
    }

    /// Whether the provider reported success by its own convention
    /// (`"status": "success"` in a 2xx response).
    pub fn is_provider_success(&self) -> bool {
        self.is_http_success()
            && self
                .provider_status()
                .is_some_and(|s| s.eq_ignore_ascii_case("success"))
    }

    /// The provider's human readable `message`, if any
    pub fn provider_message(&self) -> Option<&str> {
        self.str_field("message")
    }

    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.payload.get(name).and_then(Value::as_str)
    }

    /// Read an identifier field that the provider may send as string or number
    pub fn id_field(&self, name: &str) -> Option<String> {
        match self.payload.get(name)? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// Executes one signed request and returns the normalized result.
#[async_trait]
pub trait RequestDispatcher: Send + Sync {
    async fn execute(
        &self,
        method: Method,
        path: &str,
        params: &Params,
    ) -> DispatchResult<RemoteResult>;
}

/// Methods whose parameters travel in the query string
fn sends_params_in_query(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::DELETE)
}

/// `reqwest` backed dispatcher for the provider's HTTPS API
pub struct HttpDispatcher {
    client: Client,
    base_url: String,
    credentials: Arc<Credentials>,
}

impl HttpDispatcher {
    /// Create a dispatcher for `base_url` (scheme and host, no trailing path).
    ///
    /// `timeout` bounds each request end to end, connect included.
    pub fn new(
        base_url: &str,
        credentials: Arc<Credentials>,
        timeout: Duration,
    ) -> DispatchResult<Self> {
        let parsed = Url::parse(base_url)
            .map_err(|e| DispatchError::InvalidRequest(format!("Invalid base URL: {e}")))?;
        if parsed.scheme() != "https" && parsed.scheme() != "http" {
            return Err(DispatchError::InvalidRequest(format!(
                "Unsupported URL scheme: {}",
                parsed.scheme()
            )));
        }

        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| {
                DispatchError::InvalidRequest(format!("Failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build_request(&self, method: Method, signed: &SignedRequest) -> reqwest::RequestBuilder {
        let mut url = format!("{}{}", self.base_url, signed.path());

        let builder = if sends_params_in_query(&method) {
            if !signed.encoded_params().is_empty() {
                url.push('?');
                url.push_str(signed.encoded_params());
            }
            self.client.request(method, url)
        } else {
            // reqwest derives Content-Length from the sized body
            self.client
                .request(method, url)
                .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
                .body(signed.encoded_params().to_string())
        };

        builder.header(AUTHORIZATION, signed.authorization())
    }
}

#[async_trait]
impl RequestDispatcher for HttpDispatcher {
    async fn execute(
        &self,
        method: Method,
        path: &str,
        params: &Params,
    ) -> DispatchResult<RemoteResult> {
        if !path.starts_with('/') {
            return Err(DispatchError::InvalidRequest(format!(
                "Request path must start with '/': {path}"
            )));
        }

        let signed = SignedRequest::new(method.as_str(), path, params, &self.credentials);

        debug!(
            method = %signed.method(),
            path = %signed.path(),
            key = %self.credentials.masked_key_id(),
            "Dispatching provider request"
        );

        let response = self
            .build_request(method, &signed)
            .send()
            .await
            .map_err(|e| {
                let reason = if e.is_timeout() {
                    format!("request to {path} timed out")
                } else if e.is_connect() {
                    format!("failed to connect for {path}: {e}")
                } else {
                    format!("request to {path} failed: {e}")
                };
                warn!(path = %path, "{}", reason);
                DispatchError::Transport(reason)
            })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            DispatchError::Transport(format!("failed to read response body for {path}: {e}"))
        })?;

        let payload = serde_json::from_str::<Value>(&body).map_err(|e| {
            warn!(path = %path, status, "Provider returned a non-JSON body");
            DispatchError::Decode {
                status,
                body: body.clone(),
                reason: e.to_string(),
            }
        })?;

        debug!(path = %path, status, "Provider request completed");

        Ok(RemoteResult { status, payload })
    }
}
