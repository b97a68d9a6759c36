use axum::{
    Json,
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use tracing::debug;

use crate::utils::timestamp;

/// Routes served by the gateway, listed by the index and the 404 fallback
pub const ENDPOINTS: &[&str] = &[
    "GET /",
    "POST /workflow/voice-call",
    "GET /api/balance",
    "GET /api/numbers",
    "GET /api/tariffs",
    "POST /api/sms",
    "POST /api/callback",
];

/// Service index
pub async fn index() -> Json<Value> {
    Json(json!({
        "status": "success",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": ENDPOINTS,
        "timestamp": timestamp(),
    }))
}

/// Fallback for unknown routes
pub async fn not_found(uri: Uri) -> Response {
    debug!(path = %uri.path(), "No route matched");
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "status": "error",
            "message": format!("Endpoint not found: {}", uri.path()),
            "available_endpoints": ENDPOINTS,
            "timestamp": timestamp(),
        })),
    )
        .into_response()
}
