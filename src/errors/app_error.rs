//! Error type of the HTTP layer.
//!
//! Maps workflow and dispatch failures onto status codes:
//! invalid input is 400, a provider refusal is 502, an unreachable or
//! unintelligible provider is 503.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Map, Value, json};
use thiserror::Error;
use tracing::{error, warn};

use crate::core::dispatcher::DispatchError;
use crate::core::orchestrator::{FailureKind, WorkflowError};
use crate::utils::timestamp;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{message}")]
    ProviderRejected { message: String, payload: Value },

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error(transparent)]
    Workflow(#[from] WorkflowError),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::ProviderRejected { .. } => StatusCode::BAD_GATEWAY,
            AppError::Dispatch(DispatchError::InvalidRequest(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Dispatch(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Workflow(e) => match e.kind() {
                FailureKind::InvalidInput => StatusCode::BAD_REQUEST,
                FailureKind::WorkflowFailure => StatusCode::BAD_GATEWAY,
                FailureKind::InfrastructureFailure => StatusCode::SERVICE_UNAVAILABLE,
            },
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            AppError::BadRequest(_) => "invalid_input",
            AppError::ProviderRejected { .. } => "workflow_failure",
            AppError::Dispatch(_) => "infrastructure_failure",
            AppError::Workflow(e) => match e.kind() {
                FailureKind::InvalidInput => "invalid_input",
                FailureKind::WorkflowFailure => "workflow_failure",
                FailureKind::InfrastructureFailure => "infrastructure_failure",
            },
        }
    }

    fn body(&self) -> Value {
        let mut body = Map::new();
        body.insert("status".into(), json!("error"));
        body.insert("message".into(), json!(self.to_string()));
        body.insert("kind".into(), json!(self.kind()));

        match self {
            AppError::ProviderRejected { payload, .. } => {
                body.insert("payload".into(), payload.clone());
            }
            AppError::Dispatch(e) => {
                if let Some(raw) = e.raw_body() {
                    body.insert("payload".into(), json!(raw));
                }
            }
            AppError::Workflow(e) => {
                body.insert("step".into(), json!(e.step()));
                body.insert("code".into(), json!(e.code()));
                if let Some(payload) = e.payload() {
                    body.insert("payload".into(), payload);
                }
            }
            AppError::BadRequest(_) => {}
        }

        body.insert("timestamp".into(), json!(timestamp()));
        Value::Object(body)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "Request failed");
        } else {
            warn!(status = status.as_u16(), error = %self, "Request rejected");
        }
        (status, Json(self.body())).into_response()
    }
}
