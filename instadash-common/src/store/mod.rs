//! Store access layer
//!
//! Every read and write round-trips to the store; nothing here caches rows.
//! The [`Store`] trait is the only seam between the route/maintenance layers
//! and persistence. Each method maps to exactly one store operation.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

use crate::config::StoreConfig;
use crate::models::{
    AccountStat, Alert, AlertQuery, AutomationLog, Client, Competitor, ListQuery, Post, Table,
};
use crate::Result;

mod postgrest;
mod sqlite;

pub use postgrest::{parse_content_range_total, PostgrestStore};
pub use sqlite::SqliteStore;

/// Row-level CRUD surface over the dashboard tables
#[async_trait]
pub trait Store: Send + Sync {
    /// Backend label ("supabase", "sqlite")
    fn backend_name(&self) -> &'static str;

    /// Conditional update `is_read = <is_read> WHERE id = <id>`
    ///
    /// Returns every row the store reports as updated. Callers decide what a
    /// count other than one means.
    async fn set_alert_read(&self, id: &str, is_read: bool) -> Result<Vec<Alert>>;

    /// Alerts, newest first
    async fn list_alerts(&self, query: &AlertQuery) -> Result<Vec<Alert>>;

    /// Posts, most recently posted first
    async fn list_posts(&self, query: &ListQuery) -> Result<Vec<Post>>;

    /// Insert posts, returning the stored rows
    async fn insert_posts(&self, posts: &[Post]) -> Result<Vec<Post>>;

    /// Delete posts whose business identifier is in `post_ids`, returning the deleted rows
    async fn delete_posts_by_post_id(&self, post_ids: &[String]) -> Result<Vec<Post>>;

    /// Set `is_active = true` on every competitor except `excluded_id`, returning the updated rows
    async fn activate_competitors(&self, excluded_id: &str) -> Result<Vec<Competitor>>;

    async fn list_competitors(&self, query: &ListQuery, active_only: bool) -> Result<Vec<Competitor>>;

    async fn list_clients(&self, query: &ListQuery) -> Result<Vec<Client>>;

    async fn list_account_stats(&self, query: &ListQuery) -> Result<Vec<AccountStat>>;

    async fn list_automation_logs(&self, query: &ListQuery) -> Result<Vec<AutomationLog>>;

    /// Exact row count of a table
    async fn count_rows(&self, table: Table) -> Result<i64>;

    /// Up to `limit` raw rows of a table, as JSON objects
    async fn sample_rows(&self, table: Table, limit: u32) -> Result<Vec<Value>>;

    /// Minimal read used to keep an idle backend awake.
    ///
    /// Returns whether at least one client row exists.
    async fn probe(&self) -> Result<bool>;
}

/// Open the store described by `config`
pub async fn connect(config: &StoreConfig) -> Result<Arc<dyn Store>> {
    match config {
        StoreConfig::Supabase { url, service_key } => {
            info!(url = %url, "Using hosted Supabase store");
            Ok(Arc::new(PostgrestStore::new(url, service_key)?))
        }
        StoreConfig::Sqlite { path } => {
            info!(path = %path.display(), "Using local SQLite store");
            Ok(Arc::new(SqliteStore::open(path).await?))
        }
    }
}
