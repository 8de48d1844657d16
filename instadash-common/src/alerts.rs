//! Alert read-state transitions
//!
//! An alert is created unread by the sync pipeline and afterwards only its
//! `is_read` flag moves, one row at a time, keyed by the alert id. Setting
//! the flag it already has is a no-op that still returns the row.
//!
//! Concurrent updates of one alert race at the store: last write wins.

use tracing::{info, warn};

use crate::models::{Alert, AlertQuery};
use crate::store::Store;
use crate::{Error, Result};

/// Longest accepted alert identifier
pub const MAX_ALERT_ID_LEN: usize = 128;

/// Check an alert identifier before it reaches the store
///
/// Identifiers are opaque but restricted to ASCII alphanumerics, `-` and `_`
/// (UUIDs and numeric keys both qualify). Returns the trimmed identifier.
pub fn validate_alert_id(id: &str) -> Result<&str> {
    let id = id.trim();

    if id.is_empty() {
        return Err(Error::InvalidInput("Alert id must not be empty".to_string()));
    }
    if id.len() > MAX_ALERT_ID_LEN {
        return Err(Error::InvalidInput(format!(
            "Alert id longer than {} characters",
            MAX_ALERT_ID_LEN
        )));
    }
    if !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        return Err(Error::InvalidInput(format!("Alert id contains invalid characters: {}", id)));
    }

    Ok(id)
}

/// Mark one alert read (`true`) or unread (`false`)
///
/// Exactly one row must be updated: zero rows is [`Error::NotFound`], more
/// than one means the store broke id uniqueness and is [`Error::Internal`].
/// Store failures propagate unchanged; nothing is retried.
pub async fn set_read_state(store: &dyn Store, id: &str, is_read: bool) -> Result<Alert> {
    let id = validate_alert_id(id)?;

    let mut rows = store.set_alert_read(id, is_read).await?;

    match rows.len() {
        1 => {
            let alert = rows.remove(0);
            info!(alert_id = %alert.id, is_read, "Alert read-state updated");
            Ok(alert)
        }
        0 => Err(Error::NotFound(format!("Alert {} not found", id))),
        n => {
            warn!(alert_id = id, rows = n, "Alert update matched more than one row");
            Err(Error::Internal(format!("Alert update for {} affected {} rows", id, n)))
        }
    }
}

/// Alerts for the dashboard, newest first
pub async fn list_alerts(store: &dyn Store, query: &AlertQuery) -> Result<Vec<Alert>> {
    store.list_alerts(query).await
}
