//! instadash-api library - dashboard HTTP routes
//!
//! Stateless handlers: validate input, issue one store operation, wrap the
//! result in a JSON envelope. The shared state is read-only.

use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use instadash_common::services::{Punctuator, WorkflowClient};
use instadash_common::store::Store;
use instadash_common::Config;

pub mod api;
pub mod error;

pub use crate::error::{ApiError, ApiResult};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Store handle (hosted or local)
    pub store: Arc<dyn Store>,
    /// Startup configuration
    pub config: Arc<Config>,
    /// Punctuation client (fails open when unconfigured)
    pub punctuator: Arc<Punctuator>,
    /// Workflow API client, absent when not configured
    pub workflows: Option<Arc<WorkflowClient>>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    /// Build state from an open store and the resolved configuration
    pub fn new(store: Arc<dyn Store>, config: Config) -> instadash_common::Result<Self> {
        let punctuator = Punctuator::new(config.openai.clone())?;
        let workflows = config
            .workflow
            .as_ref()
            .map(WorkflowClient::new)
            .transpose()?
            .map(Arc::new);

        Ok(Self {
            store,
            config: Arc::new(config),
            punctuator: Arc::new(punctuator),
            workflows,
            startup_time: Utc::now(),
        })
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::alert_routes())
        .merge(api::post_routes())
        .merge(api::resource_routes())
        .merge(api::keep_alive_routes())
        .merge(api::punctuation_routes())
        .merge(api::workflow_routes())
        .merge(api::diagnostic_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
