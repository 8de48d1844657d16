//! HTTP API handlers for instadash-api

use serde::{Deserialize, Serialize};

use crate::{ApiError, ApiResult};
use instadash_common::models::ListQuery;

pub mod alerts;
pub mod diagnostics;
pub mod health;
pub mod keep_alive;
pub mod posts;
pub mod punctuation;
pub mod resources;
pub mod workflows;

pub use alerts::{alert_routes, list_alerts, patch_alert};
pub use diagnostics::{diagnostic_routes, test_connection, test_punctuation};
pub use health::health_routes;
pub use keep_alive::{keep_alive, keep_alive_routes};
pub use posts::{cleanup_demo_posts, list_posts, post_routes};
pub use punctuation::{punctuate, punctuation_routes};
pub use resources::resource_routes;
pub use workflows::{activate_workflow, workflow_routes, workflow_status};

// ========================================
// Envelopes
// ========================================

/// `{ "success": true, "data": ... }`
#[derive(Debug, Serialize)]
pub struct DataEnvelope<T> {
    pub success: bool,
    pub data: T,
}

impl<T> DataEnvelope<T> {
    pub fn new(data: T) -> Self {
        Self { success: true, data }
    }
}

/// `{ "success": true, "data": [...], "count": n }`
#[derive(Debug, Serialize)]
pub struct ListEnvelope<T> {
    pub success: bool,
    pub data: Vec<T>,
    pub count: usize,
}

impl<T> ListEnvelope<T> {
    pub fn new(data: Vec<T>) -> Self {
        Self { success: true, count: data.len(), data }
    }
}

// ========================================
// Query parameters
// ========================================

/// Common list filters (`?client_id=...&limit=...&offset=...`)
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub client_id: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl ListParams {
    /// Validate and convert to a store query
    pub fn into_query(self) -> ApiResult<ListQuery> {
        if let Some(client_id) = &self.client_id {
            if client_id.trim().is_empty() {
                return Err(ApiError::Validation("client_id must not be empty".to_string()));
            }
        }
        Ok(ListQuery {
            client_id: self.client_id.map(|c| c.trim().to_string()),
            limit: self.limit,
            offset: self.offset,
        })
    }
}
