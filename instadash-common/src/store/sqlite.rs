//! Local SQLite store
//!
//! Mirrors the hosted tables one-to-one so the dashboard runs without a
//! Supabase project, and backs the test suites.

use async_trait::async_trait;
use serde_json::{json, Value};
use sqlx::sqlite::{SqlitePoolOptions, SqliteRow};
use sqlx::{Column, FromRow, QueryBuilder, Row, Sqlite, SqlitePool, ValueRef};
use std::path::Path;
use tracing::{debug, info};

use super::Store;
use crate::models::{
    AccountStat, Alert, AlertQuery, AutomationLog, Client, Competitor, ListQuery, Post, Table,
};
use crate::Result;

/// sqlx-backed implementation of [`Store`]
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if needed) the database file and ensure the schema exists
    pub async fn open(db_path: &Path) -> Result<Self> {
        let newly_created = !db_path.exists();

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&db_url)
            .await?;

        if newly_created {
            info!("Initialized new database: {}", db_path.display());
        } else {
            info!("Opened existing database: {}", db_path.display());
        }

        sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;
        sqlx::query("PRAGMA busy_timeout = 5000").execute(&pool).await?;

        init_schema(&pool).await?;
        Ok(Self { pool })
    }

    /// Private in-memory database (one pinned connection)
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;

        init_schema(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    // ========================================
    // Row producers
    //
    // Alerts, clients, stats and logs are written by the external sync
    // pipeline in production. These inserts exist for local seeding and tests.
    // ========================================

    pub async fn insert_client(&self, client: &Client) -> Result<()> {
        sqlx::query(
            "INSERT INTO clients (id, instagram_username, full_name, is_active, created_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&client.id)
        .bind(&client.instagram_username)
        .bind(&client.full_name)
        .bind(client.is_active)
        .bind(client.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn insert_alert(&self, alert: &Alert) -> Result<()> {
        sqlx::query(
            "INSERT INTO alerts (id, client_id, alert_type, message, is_read, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&alert.id)
        .bind(&alert.client_id)
        .bind(alert.alert_type.as_str())
        .bind(&alert.message)
        .bind(alert.is_read)
        .bind(alert.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn insert_competitor(&self, competitor: &Competitor) -> Result<()> {
        sqlx::query(
            "INSERT INTO competitors (id, client_id, instagram_username, is_active, created_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&competitor.id)
        .bind(&competitor.client_id)
        .bind(&competitor.instagram_username)
        .bind(competitor.is_active)
        .bind(competitor.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn insert_account_stat(&self, stat: &AccountStat) -> Result<()> {
        sqlx::query(
            "INSERT INTO account_stats
                (id, client_id, followers_count, following_count, posts_count, engagement_rate, recorded_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&stat.id)
        .bind(&stat.client_id)
        .bind(stat.followers_count)
        .bind(stat.following_count)
        .bind(stat.posts_count)
        .bind(stat.engagement_rate)
        .bind(stat.recorded_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn insert_automation_log(&self, log: &AutomationLog) -> Result<()> {
        sqlx::query(
            "INSERT INTO automation_logs (id, client_id, workflow_name, status, details, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&log.id)
        .bind(&log.client_id)
        .bind(&log.workflow_name)
        .bind(&log.status)
        .bind(&log.details)
        .bind(log.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// `SELECT * FROM <table> [WHERE ...] ORDER BY <order_by> DESC, id LIMIT n OFFSET m`
    async fn list_rows<T>(
        &self,
        table: Table,
        order_by: &str,
        query: &ListQuery,
        condition: Option<&str>,
    ) -> Result<Vec<T>>
    where
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT * FROM {} WHERE 1 = 1", table));

        if let Some(client_id) = &query.client_id {
            builder.push(" AND client_id = ").push_bind(client_id.clone());
        }
        if let Some(condition) = condition {
            builder.push(" AND ").push(condition);
        }
        builder
            .push(format!(" ORDER BY {} DESC, id LIMIT ", order_by))
            .push_bind(i64::from(query.limit()))
            .push(" OFFSET ")
            .push_bind(i64::from(query.offset()));

        let rows = builder.build_query_as::<T>().fetch_all(&self.pool).await?;
        Ok(rows)
    }
}

#[async_trait]
impl Store for SqliteStore {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    async fn set_alert_read(&self, id: &str, is_read: bool) -> Result<Vec<Alert>> {
        let rows = sqlx::query_as::<_, Alert>(
            "UPDATE alerts SET is_read = ? WHERE id = ? RETURNING *",
        )
        .bind(is_read)
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        debug!(id, is_read, updated = rows.len(), "alert read-state update");
        Ok(rows)
    }

    async fn list_alerts(&self, query: &AlertQuery) -> Result<Vec<Alert>> {
        let condition = query.unread_only.then_some("is_read = 0");
        self.list_rows(Table::Alerts, "created_at", &query.list, condition).await
    }

    async fn list_posts(&self, query: &ListQuery) -> Result<Vec<Post>> {
        self.list_rows(Table::Posts, "COALESCE(posted_at, created_at)", query, None)
            .await
    }

    async fn insert_posts(&self, posts: &[Post]) -> Result<Vec<Post>> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = Vec::with_capacity(posts.len());

        for post in posts {
            let row = sqlx::query_as::<_, Post>(
                "INSERT INTO posts
                    (id, client_id, post_id, caption, media_type, likes_count, comments_count, posted_at, created_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                 RETURNING *",
            )
            .bind(&post.id)
            .bind(&post.client_id)
            .bind(&post.post_id)
            .bind(&post.caption)
            .bind(&post.media_type)
            .bind(post.likes_count)
            .bind(post.comments_count)
            .bind(post.posted_at)
            .bind(post.created_at)
            .fetch_one(&mut *tx)
            .await?;
            inserted.push(row);
        }

        tx.commit().await?;
        Ok(inserted)
    }

    async fn delete_posts_by_post_id(&self, post_ids: &[String]) -> Result<Vec<Post>> {
        if post_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new("DELETE FROM posts WHERE post_id IN (");
        let mut separated = builder.separated(", ");
        for post_id in post_ids {
            separated.push_bind(post_id.clone());
        }
        separated.push_unseparated(") RETURNING *");

        let rows = builder.build_query_as::<Post>().fetch_all(&self.pool).await?;
        Ok(rows)
    }

    async fn activate_competitors(&self, excluded_id: &str) -> Result<Vec<Competitor>> {
        let rows = sqlx::query_as::<_, Competitor>(
            "UPDATE competitors SET is_active = 1 WHERE id <> ? RETURNING *",
        )
        .bind(excluded_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn list_competitors(&self, query: &ListQuery, active_only: bool) -> Result<Vec<Competitor>> {
        let condition = active_only.then_some("is_active = 1");
        self.list_rows(Table::Competitors, "created_at", query, condition).await
    }

    async fn list_clients(&self, query: &ListQuery) -> Result<Vec<Client>> {
        self.list_rows(Table::Clients, "created_at", query, None).await
    }

    async fn list_account_stats(&self, query: &ListQuery) -> Result<Vec<AccountStat>> {
        self.list_rows(Table::AccountStats, "recorded_at", query, None).await
    }

    async fn list_automation_logs(&self, query: &ListQuery) -> Result<Vec<AutomationLog>> {
        self.list_rows(Table::AutomationLogs, "created_at", query, None).await
    }

    async fn count_rows(&self, table: Table) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn sample_rows(&self, table: Table, limit: u32) -> Result<Vec<Value>> {
        let rows = sqlx::query(&format!("SELECT * FROM {} LIMIT ?", table))
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(row_to_json).collect())
    }

    async fn probe(&self) -> Result<bool> {
        let row: Option<(String,)> = sqlx::query_as("SELECT id FROM clients LIMIT 1")
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }
}

/// Convert an untyped SQLite row to a JSON object keyed by column name
fn row_to_json(row: &SqliteRow) -> Value {
    let mut object = serde_json::Map::new();

    for (i, column) in row.columns().iter().enumerate() {
        let value = row
            .try_get_raw(i)
            .ok()
            .and_then(|raw| {
                if raw.is_null() {
                    Some(Value::Null)
                } else {
                    row.try_get::<String, _>(i)
                        .ok()
                        .map(Value::String)
                        .or_else(|| row.try_get::<i64, _>(i).ok().map(|v| json!(v)))
                        .or_else(|| row.try_get::<f64, _>(i).ok().map(|v| json!(v)))
                }
            })
            .unwrap_or(Value::Null);

        object.insert(column.name().to_string(), value);
    }

    Value::Object(object)
}

/// Create the dashboard tables if they don't exist (idempotent)
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS clients (
            id TEXT PRIMARY KEY,
            instagram_username TEXT NOT NULL,
            full_name TEXT,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS posts (
            id TEXT PRIMARY KEY,
            client_id TEXT,
            post_id TEXT NOT NULL,
            caption TEXT,
            media_type TEXT,
            likes_count INTEGER NOT NULL DEFAULT 0,
            comments_count INTEGER NOT NULL DEFAULT 0,
            posted_at TEXT,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS account_stats (
            id TEXT PRIMARY KEY,
            client_id TEXT,
            followers_count INTEGER NOT NULL DEFAULT 0,
            following_count INTEGER NOT NULL DEFAULT 0,
            posts_count INTEGER NOT NULL DEFAULT 0,
            engagement_rate REAL,
            recorded_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS alerts (
            id TEXT PRIMARY KEY,
            client_id TEXT,
            alert_type TEXT NOT NULL,
            message TEXT NOT NULL,
            is_read INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS automation_logs (
            id TEXT PRIMARY KEY,
            client_id TEXT,
            workflow_name TEXT NOT NULL,
            status TEXT NOT NULL,
            details TEXT,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS competitors (
            id TEXT PRIMARY KEY,
            client_id TEXT,
            instagram_username TEXT NOT NULL,
            is_active INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_posts_post_id ON posts(post_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_alerts_is_read ON alerts(is_read)")
        .execute(pool)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AlertKind;
    use chrono::{TimeZone, Utc};

    fn alert(id: &str) -> Alert {
        Alert {
            id: id.to_string(),
            client_id: Some("client-1".to_string()),
            alert_type: AlertKind::SyncFailure,
            message: "Sync failed".to_string(),
            is_read: false,
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_schema_init_is_idempotent() {
        let store = SqliteStore::in_memory().await.unwrap();
        init_schema(store.pool()).await.unwrap();

        for table in Table::ALL {
            assert_eq!(store.count_rows(table).await.unwrap(), 0);
        }
    }

    #[tokio::test]
    async fn test_set_alert_read_returns_updated_row() {
        let store = SqliteStore::in_memory().await.unwrap();
        store.insert_alert(&alert("a1")).await.unwrap();

        let rows = store.set_alert_read("a1", true).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].is_read);
        assert_eq!(rows[0].created_at, alert("a1").created_at);

        assert!(store.set_alert_read("missing", true).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_alerts_unread_filter() {
        let store = SqliteStore::in_memory().await.unwrap();
        store.insert_alert(&alert("a1")).await.unwrap();
        let mut read = alert("a2");
        read.is_read = true;
        store.insert_alert(&read).await.unwrap();

        let all = store.list_alerts(&AlertQuery::default()).await.unwrap();
        assert_eq!(all.len(), 2);

        let unread = store
            .list_alerts(&AlertQuery { unread_only: true, ..Default::default() })
            .await
            .unwrap();
        assert_eq!(unread.len(), 1);
        assert_eq!(unread[0].id, "a1");
    }

    #[tokio::test]
    async fn test_sample_rows_are_json_objects() {
        let store = SqliteStore::in_memory().await.unwrap();
        store.insert_alert(&alert("a1")).await.unwrap();

        let rows = store.sample_rows(Table::Alerts, 5).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["id"], "a1");
        assert_eq!(rows[0]["alert_type"], "sync_failure");
        assert_eq!(rows[0]["is_read"], 0);
    }

    #[tokio::test]
    async fn test_probe_reports_data_presence() {
        let store = SqliteStore::in_memory().await.unwrap();
        assert!(!store.probe().await.unwrap());

        store
            .insert_client(&Client {
                id: "client-1".to_string(),
                instagram_username: "cafe_luna".to_string(),
                full_name: None,
                is_active: true,
                created_at: Utc::now(),
            })
            .await
            .unwrap();
        assert!(store.probe().await.unwrap());
    }
}
