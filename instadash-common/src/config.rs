//! Configuration loading
//!
//! Configuration is resolved once at startup and handed to every component
//! explicitly. Resolution order (later tiers override earlier ones):
//! 1. TOML config file (explicit path, else the platform default location)
//! 2. Environment variables
//! 3. Command-line overrides applied by the binaries
//!
//! Nothing outside this module reads the process environment.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Default listen address for the API server
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5780";

/// Competitor row reserved as a placeholder in the hosted store.
///
/// Bulk activation never touches this row.
pub const DEFAULT_PLACEHOLDER_COMPETITOR_ID: &str = "00000000-0000-0000-0000-000000000000";

/// Business identifiers used by seeded demonstration posts
pub const DEFAULT_DEMO_POST_IDS: [&str; 3] = ["1", "2", "3"];

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";

/// Where rows live
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    /// Hosted Supabase project reached through its REST surface
    Supabase { url: String, service_key: String },
    /// Local SQLite database file
    Sqlite { path: PathBuf },
}

impl StoreConfig {
    /// Short backend label for logs and health output
    pub fn backend_name(&self) -> &'static str {
        match self {
            StoreConfig::Supabase { .. } => "supabase",
            StoreConfig::Sqlite { .. } => "sqlite",
        }
    }
}

/// Text-completion credentials (punctuation augmentation)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

/// Workflow-automation REST API credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowConfig {
    pub base_url: String,
    pub api_key: String,
}

/// Fully resolved runtime configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub store: StoreConfig,
    pub bind_addr: String,
    /// `None` disables punctuation (requests fail open)
    pub openai: Option<OpenAiConfig>,
    /// `None` disables workflow activation
    pub workflow: Option<WorkflowConfig>,
    pub placeholder_competitor_id: String,
    pub demo_post_ids: Vec<String>,
}

impl Config {
    /// Configuration with defaults for everything except the store
    pub fn new(store: StoreConfig) -> Self {
        Self {
            store,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            openai: None,
            workflow: None,
            placeholder_competitor_id: DEFAULT_PLACEHOLDER_COMPETITOR_ID.to_string(),
            demo_post_ids: DEFAULT_DEMO_POST_IDS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Load configuration from the TOML file tier and the process environment
    ///
    /// An explicit `config_path` must exist. The default location is optional:
    /// a missing file there just means "no file tier".
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let toml_config = match config_path {
            Some(path) => read_toml_config(path)?,
            None => match default_config_path() {
                Some(path) if path.exists() => read_toml_config(&path)?,
                _ => TomlConfig::default(),
            },
        };

        Ok(Self::resolve(toml_config, |key| std::env::var(key).ok()))
    }

    /// Merge the file tier with an environment lookup
    ///
    /// `env` is injected so callers (and tests) decide where variables come from.
    pub fn resolve<F>(toml_config: TomlConfig, env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str, fallback: Option<String>| -> Option<String> {
            env(key).filter(|v| is_valid_key(v)).or(fallback.filter(|v| is_valid_key(v)))
        };

        let supabase_url = lookup("SUPABASE_URL", toml_config.supabase.url);
        let supabase_key = lookup("SUPABASE_SERVICE_ROLE_KEY", toml_config.supabase.service_key);
        let db_path = lookup(
            "INSTADASH_DB_PATH",
            toml_config.database_path.map(|p| p.display().to_string()),
        );

        let store = match (supabase_url, supabase_key) {
            (Some(url), Some(service_key)) => StoreConfig::Supabase {
                url: url.trim_end_matches('/').to_string(),
                service_key,
            },
            (url, key) => {
                if url.is_some() != key.is_some() {
                    warn!("Supabase needs both SUPABASE_URL and SUPABASE_SERVICE_ROLE_KEY; falling back to local SQLite");
                }
                StoreConfig::Sqlite {
                    path: db_path.map(PathBuf::from).unwrap_or_else(default_database_path),
                }
            }
        };

        let openai = lookup("OPENAI_API_KEY", toml_config.openai.api_key).map(|api_key| OpenAiConfig {
            api_key,
            model: lookup("OPENAI_MODEL", toml_config.openai.model)
                .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            base_url: lookup("OPENAI_BASE_URL", toml_config.openai.base_url)
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
        });
        if openai.is_none() {
            info!("OPENAI_API_KEY not configured: punctuation will return input unchanged");
        }

        let workflow = match (
            lookup("N8N_BASE_URL", toml_config.workflow.base_url),
            lookup("N8N_API_KEY", toml_config.workflow.api_key),
        ) {
            (Some(base_url), Some(api_key)) => Some(WorkflowConfig {
                base_url: base_url.trim_end_matches('/').to_string(),
                api_key,
            }),
            _ => {
                info!("Workflow automation API not configured: activation disabled");
                None
            }
        };

        let mut config = Self::new(store);
        config.openai = openai;
        config.workflow = workflow;
        if let Some(bind) = lookup("INSTADASH_BIND", toml_config.bind_addr) {
            config.bind_addr = bind;
        }
        if let Some(id) = toml_config.placeholder_competitor_id.filter(|v| is_valid_key(v)) {
            config.placeholder_competitor_id = id;
        }
        if let Some(ids) = toml_config.demo_post_ids.filter(|ids| !ids.is_empty()) {
            config.demo_post_ids = ids;
        }

        config
    }
}

/// On-disk TOML layout; every field is optional
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct TomlConfig {
    pub bind_addr: Option<String>,
    pub database_path: Option<PathBuf>,
    #[serde(default)]
    pub supabase: SupabaseSection,
    #[serde(default)]
    pub openai: OpenAiSection,
    #[serde(default)]
    pub workflow: WorkflowSection,
    pub placeholder_competitor_id: Option<String>,
    pub demo_post_ids: Option<Vec<String>>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct SupabaseSection {
    pub url: Option<String>,
    pub service_key: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct OpenAiSection {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct WorkflowSection {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
}

/// Read and parse a TOML config file
pub fn read_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}

/// Platform config file location (`~/.config/instadash/config.toml` on Linux)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("instadash").join("config.toml"))
}

/// Platform default location of the local SQLite store
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("instadash"))
        .unwrap_or_else(|| PathBuf::from("./instadash_data"))
        .join("instadash.db")
}

/// Validate credential (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}
