//! Alert endpoints
//!
//! PATCH flips one alert's read-state; GET lists alerts for the dashboard.
//! Alerts are never deleted through this API.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    routing::{get, patch},
    Json, Router,
};
use serde::Deserialize;

use super::{DataEnvelope, ListEnvelope, ListParams};
use crate::{ApiResult, AppState};
use instadash_common::alerts;
use instadash_common::models::{Alert, AlertQuery};

/// PATCH body: the only mutable alert field
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AlertReadPatch {
    pub is_read: bool,
}

/// Query parameters for the alert list
#[derive(Debug, Default, Deserialize)]
pub struct AlertListParams {
    pub client_id: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    #[serde(default)]
    pub unread_only: bool,
}

/// PATCH /api/alerts/:id
///
/// **Request:** `{"is_read": true}`
/// **Response:** `{"success": true, "data": <alert>}`
///
/// **Errors:**
/// - 400: malformed id or body (checked before the store is called)
/// - 404: no alert with this id
/// - 500: store failure
pub async fn patch_alert(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<AlertReadPatch>, JsonRejection>,
) -> ApiResult<Json<DataEnvelope<Alert>>> {
    let Json(patch) = payload?;

    let alert = alerts::set_read_state(state.store.as_ref(), &id, patch.is_read).await?;

    Ok(Json(DataEnvelope::new(alert)))
}

/// GET /api/alerts?client_id=&unread_only=&limit=
pub async fn list_alerts(
    State(state): State<AppState>,
    params: Result<Query<AlertListParams>, QueryRejection>,
) -> ApiResult<Json<ListEnvelope<Alert>>> {
    let Query(params) = params?;
    let list = ListParams {
        client_id: params.client_id,
        limit: params.limit,
        offset: params.offset,
    }
    .into_query()?;

    let query = AlertQuery { list, unread_only: params.unread_only };
    let rows = alerts::list_alerts(state.store.as_ref(), &query).await?;

    Ok(Json(ListEnvelope::new(rows)))
}

/// Build alert routes
pub fn alert_routes() -> Router<AppState> {
    Router::new()
        .route("/api/alerts", get(list_alerts))
        .route("/api/alerts/:id", patch(patch_alert))
}
