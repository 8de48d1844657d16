//! Read-only list endpoints for the secondary tables

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use super::{ListEnvelope, ListParams};
use crate::{ApiResult, AppState};
use instadash_common::models::{AccountStat, AutomationLog, Client, Competitor};

/// Competitor list filters
#[derive(Debug, Default, Deserialize)]
pub struct CompetitorParams {
    pub client_id: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    #[serde(default)]
    pub active_only: bool,
}

/// GET /api/clients
pub async fn list_clients(
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> ApiResult<Json<ListEnvelope<Client>>> {
    let Query(params) = params?;
    let rows = state.store.list_clients(&params.into_query()?).await?;
    Ok(Json(ListEnvelope::new(rows)))
}

/// GET /api/competitors?active_only=
pub async fn list_competitors(
    State(state): State<AppState>,
    params: Result<Query<CompetitorParams>, QueryRejection>,
) -> ApiResult<Json<ListEnvelope<Competitor>>> {
    let Query(params) = params?;
    let query = ListParams {
        client_id: params.client_id,
        limit: params.limit,
        offset: params.offset,
    }
    .into_query()?;
    let rows = state.store.list_competitors(&query, params.active_only).await?;
    Ok(Json(ListEnvelope::new(rows)))
}

/// GET /api/account-stats
pub async fn list_account_stats(
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> ApiResult<Json<ListEnvelope<AccountStat>>> {
    let Query(params) = params?;
    let rows = state.store.list_account_stats(&params.into_query()?).await?;
    Ok(Json(ListEnvelope::new(rows)))
}

/// GET /api/automation-logs
pub async fn list_automation_logs(
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> ApiResult<Json<ListEnvelope<AutomationLog>>> {
    let Query(params) = params?;
    let rows = state.store.list_automation_logs(&params.into_query()?).await?;
    Ok(Json(ListEnvelope::new(rows)))
}

/// Build secondary table routes
pub fn resource_routes() -> Router<AppState> {
    Router::new()
        .route("/api/clients", get(list_clients))
        .route("/api/competitors", get(list_competitors))
        .route("/api/account-stats", get(list_account_stats))
        .route("/api/automation-logs", get(list_automation_logs))
}
