//! Workflow-automation REST client (n8n public API)
//!
//! Thin wrapper: one outbound call per operation, remote failures passed
//! through, no retry.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::info;

use crate::config::WorkflowConfig;
use crate::{Error, Result};

const USER_AGENT: &str = concat!("instadash/", env!("CARGO_PKG_VERSION"));
const API_KEY_HEADER: &str = "X-N8N-API-KEY";

/// Remote workflow state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowStatus {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub active: bool,
}

#[derive(Debug, Deserialize)]
struct WorkflowList {
    data: Vec<WorkflowStatus>,
}

/// Client for the workflow-automation REST API
pub struct WorkflowClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl WorkflowClient {
    pub fn new(config: &WorkflowConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    /// Activate a workflow by id and report its resulting state
    pub async fn activate(&self, workflow_id: &str) -> Result<WorkflowStatus> {
        let workflow_id = validate_workflow_id(workflow_id)?;
        let url = format!("{}/api/v1/workflows/{}/activate", self.base_url, workflow_id);

        let status: WorkflowStatus = self.send(self.http_client.post(url)).await?;
        info!(workflow_id = %status.id, name = %status.name, active = status.active, "Workflow activated");
        Ok(status)
    }

    /// Current state of a workflow
    pub async fn status(&self, workflow_id: &str) -> Result<WorkflowStatus> {
        let workflow_id = validate_workflow_id(workflow_id)?;
        let url = format!("{}/api/v1/workflows/{}", self.base_url, workflow_id);
        self.send(self.http_client.get(url)).await
    }

    /// Look a workflow up by exact name
    pub async fn find_by_name(&self, name: &str) -> Result<WorkflowStatus> {
        let url = format!("{}/api/v1/workflows", self.base_url);
        let list: WorkflowList = self.send(self.http_client.get(url).query(&[("name", name)])).await?;

        list.data
            .into_iter()
            .find(|w| w.name == name)
            .ok_or_else(|| Error::NotFound(format!("Workflow named '{}' not found", name)))
    }

    /// Resolve a workflow by name, then activate it
    pub async fn activate_by_name(&self, name: &str) -> Result<WorkflowStatus> {
        let workflow = self.find_by_name(name).await?;
        self.activate(&workflow.id).await
    }

    async fn send<T: serde::de::DeserializeOwned>(&self, builder: reqwest::RequestBuilder) -> Result<T> {
        let response = builder.header(API_KEY_HEADER, &self.api_key).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::NotFound(format!("Workflow API: {}", body)));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Remote { status: status.as_u16(), message: body });
        }

        Ok(response.json::<T>().await?)
    }
}

fn validate_workflow_id(id: &str) -> Result<&str> {
    let id = id.trim();
    if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        return Err(Error::InvalidInput(format!("Invalid workflow id: '{}'", id)));
    }
    Ok(id)
}

/// Older API versions return numeric ids
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!("unexpected workflow id: {}", other))),
    }
}
