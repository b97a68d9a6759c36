//! HTTP request handlers
//!
//! This module organizes all API handlers into logical groups:
//! - `api` - Service index and unknown-route fallback
//! - `workflow` - Voice call workflow (synthesize, wait, call)
//! - `account` - Balance, numbers and tariff pass-through
//! - `messaging` - SMS and callback requests

pub mod account;
pub mod api;
pub mod messaging;
pub mod workflow;

use axum::Json;
use serde_json::{Value, json};

use crate::core::dispatcher::RemoteResult;
use crate::errors::{AppError, AppResult};
use crate::utils::timestamp;

/// Unwrap a provider answer, turning a non-success payload into
/// [`AppError::ProviderRejected`].
pub(crate) fn ensure_success(result: RemoteResult, operation: &str) -> AppResult<Value> {
    if result.is_provider_success() {
        return Ok(result.payload);
    }

    let message = match result.provider_message() {
        Some(reason) => format!("{operation} rejected by provider: {reason}"),
        None => format!(
            "{operation} rejected by provider (HTTP {})",
            result.status
        ),
    };
    Err(AppError::ProviderRejected {
        message,
        payload: result.payload,
    })
}

/// Standard success envelope
pub(crate) fn success_body(data: Value) -> Json<Value> {
    Json(json!({
        "status": "success",
        "data": data,
        "timestamp": timestamp(),
    }))
}
