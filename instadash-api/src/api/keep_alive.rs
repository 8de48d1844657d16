//! Keep-alive probe
//!
//! Hit by an external scheduler so an idle hosted backend is not suspended.

use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;
use tracing::info;

use crate::{ApiResult, AppState};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeepAliveResponse {
    pub success: bool,
    pub message: String,
    pub timestamp: String,
    pub has_data: bool,
}

/// GET /api/keep-alive
pub async fn keep_alive(State(state): State<AppState>) -> ApiResult<Json<KeepAliveResponse>> {
    let has_data = state.store.probe().await?;
    info!(backend = state.store.backend_name(), has_data, "Keep-alive probe");

    Ok(Json(KeepAliveResponse {
        success: true,
        message: "Store is awake".to_string(),
        timestamp: Utc::now().to_rfc3339(),
        has_data,
    }))
}

pub fn keep_alive_routes() -> Router<AppState> {
    Router::new().route("/api/keep-alive", get(keep_alive))
}
