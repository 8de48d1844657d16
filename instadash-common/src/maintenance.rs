//! Operator maintenance operations
//!
//! Bulk competitor activation, demo-post cleanup/seeding and table
//! population reports. Each operation issues its store calls in sequence and
//! aborts on the first store error; there are no per-row results.

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::{Competitor, ListQuery, Post, Table, MAX_LIST_LIMIT};
use crate::store::Store;
use crate::Result;

// ========================================
// Competitor activation
// ========================================

/// Outcome of a bulk activation
#[derive(Debug, Clone, Serialize)]
pub struct ActivationReport {
    /// Rows the update touched
    pub updated: Vec<Competitor>,
    /// Active rows re-read after the update
    pub active: Vec<Competitor>,
}

/// Set `is_active = true` on every competitor except the placeholder row
///
/// `placeholder_id` names the reserved competitor row that must never be
/// activated (see `Config::placeholder_competitor_id`). Running this twice
/// updates the same rows to the same value.
pub async fn activate_competitors(store: &dyn Store, placeholder_id: &str) -> Result<ActivationReport> {
    let updated = store.activate_competitors(placeholder_id).await?;
    info!(updated = updated.len(), "Competitors activated");

    let active = list_all_active_competitors(store).await?;

    Ok(ActivationReport { updated, active })
}

/// Every active competitor, read in pages of `MAX_LIST_LIMIT`
async fn list_all_active_competitors(store: &dyn Store) -> Result<Vec<Competitor>> {
    let mut active = Vec::new();
    let mut query = ListQuery { limit: Some(MAX_LIST_LIMIT), ..Default::default() };

    loop {
        let page = store.list_competitors(&query, true).await?;
        let last_page = page.len() < MAX_LIST_LIMIT as usize;
        active.extend(page);
        if last_page {
            return Ok(active);
        }
        query.offset = Some(query.offset() + MAX_LIST_LIMIT);
    }
}

// ========================================
// Demo data
// ========================================

/// Outcome of a demo cleanup
#[derive(Debug, Clone, Serialize)]
pub struct CleanupReport {
    pub deleted: Vec<Post>,
}

impl CleanupReport {
    pub fn count(&self) -> usize {
        self.deleted.len()
    }
}

/// Delete seeded demo posts (business identifier in `demo_post_ids`)
///
/// Deleting nothing is the expected steady state after the first run.
pub async fn cleanup_demo_posts(store: &dyn Store, demo_post_ids: &[String]) -> Result<CleanupReport> {
    let deleted = store.delete_posts_by_post_id(demo_post_ids).await?;

    if deleted.is_empty() {
        info!("No demo posts to delete");
    } else {
        info!(count = deleted.len(), "Deleted demo posts");
    }

    Ok(CleanupReport { deleted })
}

/// Insert one demonstration post per id in `demo_post_ids`
pub async fn seed_demo_posts(
    store: &dyn Store,
    demo_post_ids: &[String],
    client_id: Option<&str>,
) -> Result<Vec<Post>> {
    let now = Utc::now();
    let posts: Vec<Post> = demo_post_ids
        .iter()
        .enumerate()
        .map(|(i, post_id)| Post {
            id: Uuid::new_v4().to_string(),
            client_id: client_id.map(str::to_string),
            post_id: post_id.clone(),
            caption: Some(format!("Publicación de ejemplo {}", i + 1)),
            media_type: Some("IMAGE".to_string()),
            likes_count: 100 * (i as i64 + 1),
            comments_count: 10 * (i as i64 + 1),
            posted_at: Some(now),
            created_at: now,
        })
        .collect();

    let inserted = store.insert_posts(&posts).await?;
    info!(count = inserted.len(), "Seeded demo posts");
    Ok(inserted)
}

// ========================================
// Table report
// ========================================

/// Population summary of one table
#[derive(Debug, Clone, Serialize)]
pub struct TableSummary {
    pub table: Table,
    pub row_count: Option<i64>,
    pub sample: Vec<Value>,
    /// Set when the table could not be read
    pub error: Option<String>,
}

/// Row count and a few sample rows for every dashboard table
///
/// A table that fails to read is reported with its error and the report
/// moves on to the next table.
pub async fn table_report(store: &dyn Store, sample_size: u32) -> Vec<TableSummary> {
    let mut summaries = Vec::with_capacity(Table::ALL.len());

    for table in Table::ALL {
        let summary = match store.count_rows(table).await {
            Ok(row_count) => {
                let sample = if sample_size > 0 && row_count > 0 {
                    store.sample_rows(table, sample_size).await
                } else {
                    Ok(Vec::new())
                };
                match sample {
                    Ok(sample) => TableSummary { table, row_count: Some(row_count), sample, error: None },
                    Err(e) => TableSummary {
                        table,
                        row_count: Some(row_count),
                        sample: Vec::new(),
                        error: Some(e.to_string()),
                    },
                }
            }
            Err(e) => {
                warn!(table = %table, error = %e, "Table check failed");
                TableSummary { table, row_count: None, sample: Vec::new(), error: Some(e.to_string()) }
            }
        };
        summaries.push(summary);
    }

    summaries
}
