//! Hosted Supabase store (PostgREST surface)
//!
//! Every call is one HTTP request against `<project>/rest/v1/<table>`,
//! authenticated with the service credential. Filters use PostgREST
//! operators (`eq.`, `neq.`, `in.(...)`). Writes ask for
//! `Prefer: return=representation` so the affected rows come back in the
//! response body.

use async_trait::async_trait;
use reqwest::header::CONTENT_RANGE;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::debug;

use super::Store;
use crate::models::{
    AccountStat, Alert, AlertQuery, AutomationLog, Client, Competitor, ListQuery, Post, Table,
};
use crate::{Error, Result};

const USER_AGENT: &str = concat!("instadash/", env!("CARGO_PKG_VERSION"));
const RETURN_REPRESENTATION: &str = "return=representation";
/// Postgres `invalid_text_representation`, e.g. a malformed uuid in a filter
const INVALID_TEXT_REPRESENTATION: &str = "22P02";

/// reqwest-backed implementation of [`Store`]
pub struct PostgrestStore {
    http_client: reqwest::Client,
    rest_url: String,
    service_key: String,
}

impl PostgrestStore {
    /// `project_url` is the Supabase project root, e.g. `https://abc.supabase.co`
    pub fn new(project_url: &str, service_key: &str) -> Result<Self> {
        let http_client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self {
            http_client,
            rest_url: format!("{}/rest/v1", project_url.trim_end_matches('/')),
            service_key: service_key.to_string(),
        })
    }

    fn request(&self, method: Method, table: Table) -> RequestBuilder {
        self.http_client
            .request(method, format!("{}/{}", self.rest_url, table))
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }

    /// Send and decode a JSON body, mapping non-2xx answers to [`Error::Store`]
    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        read_json(builder.send().await?).await
    }

    /// `order` is a PostgREST order clause, e.g. `created_at.desc`
    async fn list<T: DeserializeOwned>(
        &self,
        table: Table,
        order: &str,
        query: &ListQuery,
        extra_filters: &[(&str, String)],
    ) -> Result<Vec<T>> {
        let mut params: Vec<(&str, String)> = vec![
            ("select", "*".to_string()),
            ("order", format!("{},id", order)),
            ("limit", query.limit().to_string()),
        ];
        if query.offset() > 0 {
            params.push(("offset", query.offset().to_string()));
        }
        if let Some(client_id) = &query.client_id {
            params.push(("client_id", format!("eq.{}", client_id)));
        }
        params.extend(extra_filters.iter().cloned());

        self.send_json(self.request(Method::GET, table).query(&params)).await
    }
}

#[async_trait]
impl Store for PostgrestStore {
    fn backend_name(&self) -> &'static str {
        "supabase"
    }

    async fn set_alert_read(&self, id: &str, is_read: bool) -> Result<Vec<Alert>> {
        let builder = self
            .request(Method::PATCH, Table::Alerts)
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&json!({ "is_read": is_read }));

        let response = builder.send().await?;

        // A key the id column cannot parse matches no row
        if response.status() == StatusCode::BAD_REQUEST {
            let body = response.text().await.unwrap_or_default();
            if postgrest_code(&body).as_deref() == Some(INVALID_TEXT_REPRESENTATION) {
                debug!(id, "alert id is not a valid key");
                return Ok(Vec::new());
            }
            return Err(Error::Store {
                status: StatusCode::BAD_REQUEST.as_u16(),
                message: error_message(&body, StatusCode::BAD_REQUEST.canonical_reason()),
            });
        }

        let rows: Vec<Alert> = read_json(response).await?;
        debug!(id, is_read, updated = rows.len(), "alert read-state update");
        Ok(rows)
    }

    async fn list_alerts(&self, query: &AlertQuery) -> Result<Vec<Alert>> {
        let mut filters = Vec::new();
        if query.unread_only {
            filters.push(("is_read", "eq.false".to_string()));
        }
        self.list(Table::Alerts, "created_at.desc", &query.list, &filters).await
    }

    async fn list_posts(&self, query: &ListQuery) -> Result<Vec<Post>> {
        // Same order as COALESCE(posted_at, created_at) DESC on the local store
        self.list(Table::Posts, "posted_at.desc.nullslast,created_at.desc", query, &[])
            .await
    }

    async fn insert_posts(&self, posts: &[Post]) -> Result<Vec<Post>> {
        if posts.is_empty() {
            return Ok(Vec::new());
        }
        let builder = self
            .request(Method::POST, Table::Posts)
            .header("Prefer", RETURN_REPRESENTATION)
            .json(posts);
        self.send_json(builder).await
    }

    async fn delete_posts_by_post_id(&self, post_ids: &[String]) -> Result<Vec<Post>> {
        if post_ids.is_empty() {
            return Ok(Vec::new());
        }
        let builder = self
            .request(Method::DELETE, Table::Posts)
            .query(&[("post_id", in_filter(post_ids))])
            .header("Prefer", RETURN_REPRESENTATION);
        self.send_json(builder).await
    }

    async fn activate_competitors(&self, excluded_id: &str) -> Result<Vec<Competitor>> {
        let builder = self
            .request(Method::PATCH, Table::Competitors)
            .query(&[("id", format!("neq.{}", excluded_id))])
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&json!({ "is_active": true }));
        self.send_json(builder).await
    }

    async fn list_competitors(&self, query: &ListQuery, active_only: bool) -> Result<Vec<Competitor>> {
        let mut filters = Vec::new();
        if active_only {
            filters.push(("is_active", "eq.true".to_string()));
        }
        self.list(Table::Competitors, "created_at.desc", query, &filters).await
    }

    async fn list_clients(&self, query: &ListQuery) -> Result<Vec<Client>> {
        self.list(Table::Clients, "created_at.desc", query, &[]).await
    }

    async fn list_account_stats(&self, query: &ListQuery) -> Result<Vec<AccountStat>> {
        self.list(Table::AccountStats, "recorded_at.desc", query, &[]).await
    }

    async fn list_automation_logs(&self, query: &ListQuery) -> Result<Vec<AutomationLog>> {
        self.list(Table::AutomationLogs, "created_at.desc", query, &[]).await
    }

    async fn count_rows(&self, table: Table) -> Result<i64> {
        let response = self
            .request(Method::HEAD, table)
            .query(&[("select", "id")])
            .header("Prefer", "count=exact")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Store {
                status: status.as_u16(),
                message: format!("count on {} failed", table),
            });
        }

        response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range_total)
            .ok_or_else(|| Error::Internal(format!("No row count returned for {}", table)))
    }

    async fn sample_rows(&self, table: Table, limit: u32) -> Result<Vec<Value>> {
        let builder = self
            .request(Method::GET, table)
            .query(&[("select", "*".to_string()), ("limit", limit.to_string())]);
        self.send_json(builder).await
    }

    async fn probe(&self) -> Result<bool> {
        let builder = self
            .request(Method::GET, Table::Clients)
            .query(&[("select", "id"), ("limit", "1")]);
        let rows: Vec<Value> = self.send_json(builder).await?;
        Ok(!rows.is_empty())
    }
}

/// Map non-2xx answers to [`Error::Store`], otherwise decode the JSON body
async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(Error::Store {
            status: status.as_u16(),
            message: error_message(&body, status.canonical_reason()),
        });
    }

    Ok(response.json::<T>().await?)
}

/// Build a PostgREST `in.(...)` filter with every value double-quoted
fn in_filter(values: &[String]) -> String {
    let quoted: Vec<String> = values
        .iter()
        .map(|v| format!("\"{}\"", v.replace('\\', "\\\\").replace('"', "\\\"")))
        .collect();
    format!("in.({})", quoted.join(","))
}

/// Total from a `Content-Range` header (`0-24/3573`, `*/0`)
pub fn parse_content_range_total(header: &str) -> Option<i64> {
    header.rsplit_once('/')?.1.trim().parse().ok()
}

/// Postgres error code from a PostgREST error body
fn postgrest_code(body: &str) -> Option<String> {
    serde_json::from_str::<Value>(body)
        .ok()?
        .get("code")?
        .as_str()
        .map(str::to_string)
}

/// Prefer the PostgREST `message` field; fall back to the raw body
fn error_message(body: &str, reason: Option<&str>) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .or_else(|| (!body.trim().is_empty()).then(|| body.trim().to_string()))
        .unwrap_or_else(|| reason.unwrap_or("unknown error").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_filter_quotes_values() {
        let ids = vec!["1".to_string(), "2".to_string(), "3".to_string()];
        assert_eq!(in_filter(&ids), r#"in.("1","2","3")"#);

        let tricky = vec![r#"a"b"#.to_string()];
        assert_eq!(in_filter(&tricky), r#"in.("a\"b")"#);
    }

    #[test]
    fn test_parse_content_range_total() {
        assert_eq!(parse_content_range_total("0-24/3573"), Some(3573));
        assert_eq!(parse_content_range_total("*/0"), Some(0));
        assert_eq!(parse_content_range_total("0-24/*"), None);
        assert_eq!(parse_content_range_total("garbage"), None);
    }

    #[test]
    fn test_error_message_prefers_postgrest_message() {
        let body = r#"{"code":"22P02","details":null,"hint":null,"message":"invalid input syntax for type uuid"}"#;
        assert_eq!(
            error_message(body, Some("Bad Request")),
            "invalid input syntax for type uuid"
        );
        assert_eq!(error_message("upstream timeout", None), "upstream timeout");
        assert_eq!(error_message("", Some("Service Unavailable")), "Service Unavailable");
    }

    #[test]
    fn test_postgrest_code() {
        let body = r#"{"code":"22P02","message":"invalid input syntax for type uuid: \"missing\""}"#;
        assert_eq!(postgrest_code(body).as_deref(), Some(INVALID_TEXT_REPRESENTATION));
        assert_eq!(postgrest_code("upstream timeout"), None);
        assert_eq!(postgrest_code(r#"{"code":null}"#), None);
    }

    #[test]
    fn test_rest_url_strips_trailing_slash() {
        let store = PostgrestStore::new("https://abc.supabase.co/", "key").unwrap();
        assert_eq!(store.rest_url, "https://abc.supabase.co/rest/v1");
    }
}
