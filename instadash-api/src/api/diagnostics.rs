//! Diagnostic `/api/test-*` endpoints
//!
//! Fixed-shape JSON for checking a deployment by hand. They never touch the
//! store.

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde_json::{json, Value};

use super::punctuation::PunctuateRequest;
use crate::{ApiResult, AppState};

/// GET /api/test-connection
pub async fn test_connection(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "success": true,
        "message": "API is working",
        "module": "instadash-api",
        "version": env!("CARGO_PKG_VERSION"),
        "store": state.store.backend_name(),
        "punctuation_configured": state.punctuator.is_configured(),
        "workflow_configured": state.workflows.is_some(),
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

/// POST /api/test-punctuation
///
/// Echoes the input next to the punctuated output.
pub async fn test_punctuation(
    State(state): State<AppState>,
    payload: Result<Json<PunctuateRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(request) = payload?;
    request.validate()?;

    let result = state.punctuator.punctuate(&request.text).await;

    Ok(Json(json!({
        "success": true,
        "original": request.text,
        "punctuated": result.text,
        "degraded": result.degraded,
    })))
}

pub fn diagnostic_routes() -> Router<AppState> {
    Router::new()
        .route("/api/test-connection", get(test_connection))
        .route("/api/test-punctuation", post(test_punctuation))
}
