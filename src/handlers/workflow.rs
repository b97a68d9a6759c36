use std::sync::Arc;

use axum::{
    extract::{State, rejection::JsonRejection},
    response::Json,
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::errors::{AppError, AppResult};
use crate::state::AppState;
use crate::utils::timestamp;

/// Body of `POST /workflow/voice-call`
///
/// Missing fields are reported by the orchestrator's own validation so that
/// every input problem produces the same error shape.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceCallRequest {
    #[serde(default)]
    pub target_number: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub caller_identity: Option<String>,
}

/// Synthesize a message, wait for the audio and place the call
pub async fn voice_call(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<VoiceCallRequest>, JsonRejection>,
) -> AppResult<Json<Value>> {
    let Json(request) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let outcome = state
        .orchestrator
        .run_voice_call_workflow(
            request.target_number.as_deref().unwrap_or_default(),
            request.caller_identity.as_deref(),
            request.message.as_deref().unwrap_or_default(),
        )
        .await?;

    Ok(Json(json!({
        "status": "success",
        "data": outcome,
        "timestamp": timestamp(),
    })))
}
