//! Read-only account queries passed through to the provider.

use std::sync::Arc;

use axum::{extract::State, response::Json};
use serde_json::Value;
use tracing::info;

use super::{ensure_success, success_body};
use crate::errors::AppResult;
use crate::state::AppState;

pub async fn balance(State(state): State<Arc<AppState>>) -> AppResult<Json<Value>> {
    info!("Balance requested");
    let result = state.provider.balance().await?;
    Ok(success_body(ensure_success(result, "Balance query")?))
}

pub async fn numbers(State(state): State<Arc<AppState>>) -> AppResult<Json<Value>> {
    info!("Number list requested");
    let result = state.provider.numbers().await?;
    Ok(success_body(ensure_success(result, "Number list query")?))
}

pub async fn tariffs(State(state): State<Arc<AppState>>) -> AppResult<Json<Value>> {
    info!("Tariff requested");
    let result = state.provider.tariffs().await?;
    Ok(success_body(ensure_success(result, "Tariff query")?))
}
