//! SMS and callback requests.

use std::sync::Arc;

use axum::{
    extract::{State, rejection::JsonRejection},
    response::Json,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use super::ensure_success;
use crate::errors::{AppError, AppResult};
use crate::state::AppState;
use crate::utils::{timestamp, validate_phone_number};

#[derive(Debug, Deserialize)]
pub struct SmsRequest {
    pub number: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CallbackRequest {
    pub phone_number: Option<String>,
    pub from_number: Option<String>,
    pub contact_name: Option<String>,
}

fn required(value: Option<String>, name: &str) -> AppResult<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::BadRequest(format!("'{name}' is required")))
}

fn phone(value: String, name: &str) -> AppResult<String> {
    validate_phone_number(&value).map_err(|e| AppError::BadRequest(format!("'{name}': {e}")))
}

/// Send an SMS through the provider
pub async fn send_sms(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SmsRequest>, JsonRejection>,
) -> AppResult<Json<Value>> {
    let Json(request) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let number = phone(required(request.number, "number")?, "number")?;
    let message = required(request.message, "message")?;

    info!(number = %number, message_chars = message.chars().count(), "Sending SMS");
    let result = state.provider.send_sms(&number, &message).await?;
    let data = ensure_success(result, "SMS")?;

    Ok(Json(json!({
        "status": "success",
        "message": format!("SMS sent to {number}"),
        "data": data,
        "timestamp": timestamp(),
    })))
}

/// Ask the provider to call back `phone_number` from `from_number`
pub async fn request_callback(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CallbackRequest>, JsonRejection>,
) -> AppResult<Json<Value>> {
    let Json(request) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let target = phone(required(request.phone_number, "phone_number")?, "phone_number")?;
    let from = request
        .from_number
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| state.config.default_caller_id.clone());

    info!(target = %target, from = %from, "Requesting callback");
    let result = state.provider.request_callback(&from, &target, false).await?;
    let data = ensure_success(result, "Callback")?;

    Ok(Json(json!({
        "status": "success",
        "message": format!("Callback initiated to {target}"),
        "contact_name": request.contact_name,
        "data": data,
        "timestamp": timestamp(),
    })))
}
