//! Store row models
//!
//! Rows are owned by the store. These types mirror the columns of the six
//! dashboard tables and decode both from SQLite rows (sqlx) and from the
//! hosted store's JSON (serde).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

// ========================================
// Tables
// ========================================

/// The dashboard tables
///
/// Table names only ever reach a query through this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Clients,
    Posts,
    AccountStats,
    Alerts,
    AutomationLogs,
    Competitors,
}

impl Table {
    pub const ALL: [Table; 6] = [
        Table::Clients,
        Table::Posts,
        Table::AccountStats,
        Table::Alerts,
        Table::AutomationLogs,
        Table::Competitors,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Table::Clients => "clients",
            Table::Posts => "posts",
            Table::AccountStats => "account_stats",
            Table::Alerts => "alerts",
            Table::AutomationLogs => "automation_logs",
            Table::Competitors => "competitors",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ========================================
// Alerts
// ========================================

/// Kind of monitored condition that produced an alert
///
/// Open set: producers may emit kinds this crate does not know about, which
/// are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AlertKind {
    ThresholdBreach,
    SyncFailure,
    FollowerDrop,
    EngagementSpike,
    Other(String),
}

impl AlertKind {
    pub fn as_str(&self) -> &str {
        match self {
            AlertKind::ThresholdBreach => "threshold_breach",
            AlertKind::SyncFailure => "sync_failure",
            AlertKind::FollowerDrop => "follower_drop",
            AlertKind::EngagementSpike => "engagement_spike",
            AlertKind::Other(kind) => kind,
        }
    }
}

impl From<String> for AlertKind {
    fn from(kind: String) -> Self {
        match kind.as_str() {
            "threshold_breach" => AlertKind::ThresholdBreach,
            "sync_failure" => AlertKind::SyncFailure,
            "follower_drop" => AlertKind::FollowerDrop,
            "engagement_spike" => AlertKind::EngagementSpike,
            _ => AlertKind::Other(kind),
        }
    }
}

impl From<AlertKind> for String {
    fn from(kind: AlertKind) -> Self {
        match kind {
            AlertKind::Other(kind) => kind,
            known => known.as_str().to_string(),
        }
    }
}

/// A notification row produced by the sync pipeline
///
/// Only `is_read` ever changes after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Alert {
    pub id: String,
    pub client_id: Option<String>,
    #[sqlx(try_from = "String")]
    pub alert_type: AlertKind,
    pub message: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

// ========================================
// Secondary entities
// ========================================

/// A monitored Instagram account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Client {
    pub id: String,
    pub instagram_username: String,
    pub full_name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// A synchronized (or seeded demo) Instagram post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: String,
    pub client_id: Option<String>,
    /// Business identifier (Instagram post id)
    pub post_id: String,
    pub caption: Option<String>,
    pub media_type: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub likes_count: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub comments_count: i64,
    pub posted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Point-in-time account statistics snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct AccountStat {
    pub id: String,
    pub client_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub followers_count: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub following_count: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub posts_count: i64,
    pub engagement_rate: Option<f64>,
    pub recorded_at: DateTime<Utc>,
}

/// Record of one automation pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct AutomationLog {
    pub id: String,
    pub client_id: Option<String>,
    pub workflow_name: String,
    pub status: String,
    pub details: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A competitor account tracked alongside a client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Competitor {
    pub id: String,
    pub client_id: Option<String>,
    pub instagram_username: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

// ========================================
// Query parameters
// ========================================

/// Default row limit for list reads
pub const DEFAULT_LIST_LIMIT: u32 = 100;
/// Hard cap for list reads
pub const MAX_LIST_LIMIT: u32 = 1000;

/// Filter shared by the list reads
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub client_id: Option<String>,
    pub limit: Option<u32>,
    /// Rows to skip before the first returned row
    pub offset: Option<u32>,
}

impl ListQuery {
    /// Effective limit, clamped to `[1, MAX_LIST_LIMIT]`
    pub fn limit(&self) -> u32 {
        self.limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT)
    }

    pub fn offset(&self) -> u32 {
        self.offset.unwrap_or(0)
    }
}

/// Filter for alert reads
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlertQuery {
    pub list: ListQuery,
    pub unread_only: bool,
}

/// Hosted stores return `null` for unset counters and flags
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
