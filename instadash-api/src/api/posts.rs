//! Post endpoints: list, demo cleanup

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::{delete, get},
    Json, Router,
};
use serde::Serialize;

use super::ListParams;
use crate::{ApiResult, AppState};
use instadash_common::maintenance;
use instadash_common::models::Post;

/// GET /api/posts response
#[derive(Debug, Serialize)]
pub struct PostsResponse {
    pub success: bool,
    pub posts: Vec<Post>,
    pub count: usize,
}

/// DELETE /api/posts/cleanup-demo response
#[derive(Debug, Serialize)]
pub struct CleanupResponse {
    pub success: bool,
    pub message: String,
    pub count: usize,
    pub deleted: Vec<Post>,
}

/// GET /api/posts?client_id=&limit=
pub async fn list_posts(
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> ApiResult<Json<PostsResponse>> {
    let Query(params) = params?;
    let query = params.into_query()?;

    let posts = state.store.list_posts(&query).await?;

    Ok(Json(PostsResponse { success: true, count: posts.len(), posts }))
}

/// DELETE /api/posts/cleanup-demo
///
/// Removes seeded demonstration posts. A run that finds none succeeds with
/// `count: 0`.
pub async fn cleanup_demo_posts(State(state): State<AppState>) -> ApiResult<Json<CleanupResponse>> {
    let report =
        maintenance::cleanup_demo_posts(state.store.as_ref(), &state.config.demo_post_ids).await?;

    let count = report.count();
    Ok(Json(CleanupResponse {
        success: true,
        message: format!("Deleted {} demo posts", count),
        count,
        deleted: report.deleted,
    }))
}

/// Build post routes
pub fn post_routes() -> Router<AppState> {
    Router::new()
        .route("/api/posts", get(list_posts))
        .route("/api/posts/cleanup-demo", delete(cleanup_demo_posts))
}
