use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers::{account, api, messaging, workflow};
use crate::state::AppState;
use std::sync::Arc;

/// Create the API router
///
/// Unknown paths fall through to a JSON 404 listing the available endpoints.
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(api::index))
        // Voice call workflow
        .route("/workflow/voice-call", post(workflow::voice_call))
        // Account queries
        .route("/api/balance", get(account::balance))
        .route("/api/numbers", get(account::numbers))
        .route("/api/tariffs", get(account::tariffs))
        // Messaging
        .route("/api/sms", post(messaging::send_sms))
        .route("/api/callback", post(messaging::request_callback))
        .fallback(api::not_found)
        .layer(TraceLayer::new_for_http())
}
