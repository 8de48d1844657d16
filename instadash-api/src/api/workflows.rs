//! Workflow automation passthrough

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;

use super::DataEnvelope;
use crate::{ApiError, ApiResult, AppState};
use instadash_common::services::{WorkflowClient, WorkflowStatus};

fn client(state: &AppState) -> ApiResult<&Arc<WorkflowClient>> {
    state
        .workflows
        .as_ref()
        .ok_or_else(|| ApiError::Unavailable("Workflow automation API not configured".to_string()))
}

/// POST /api/workflows/:id/activate
pub async fn activate_workflow(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DataEnvelope<WorkflowStatus>>> {
    let status = client(&state)?.activate(&id).await?;
    Ok(Json(DataEnvelope::new(status)))
}

/// GET /api/workflows/:id
pub async fn workflow_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DataEnvelope<WorkflowStatus>>> {
    let status = client(&state)?.status(&id).await?;
    Ok(Json(DataEnvelope::new(status)))
}

pub fn workflow_routes() -> Router<AppState> {
    Router::new()
        .route("/api/workflows/:id", get(workflow_status))
        .route("/api/workflows/:id/activate", post(activate_workflow))
}
