//! Spanish punctuation augmentation via a chat-completion API
//!
//! Fails open: with no credential, or when the call fails in any way, the
//! input text comes back unchanged and the outcome is flagged `degraded`.

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

use crate::config::OpenAiConfig;
use crate::{Error, Result};

const USER_AGENT: &str = concat!("instadash/", env!("CARGO_PKG_VERSION"));

/// Instruction sent with every request
pub const PUNCTUATION_PROMPT: &str = "Eres un corrector de puntuación. Añade únicamente los signos de \
puntuación del español que falten (puntos, comas, signos de apertura y cierre de interrogación y \
exclamación). No cambies, añadas ni elimines palabras ni acentos, no corrijas ortografía ni \
reformules. Devuelve solo el texto puntuado, sin comillas ni explicaciones.";

/// Result of a punctuation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Punctuation {
    pub text: String,
    /// True when `text` is the unmodified input because the remote call was skipped or failed
    pub degraded: bool,
}

impl Punctuation {
    fn unchanged(text: &str) -> Self {
        Self { text: text.to_string(), degraded: true }
    }
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

/// Chat-completion client for punctuation
pub struct Punctuator {
    http_client: reqwest::Client,
    config: Option<OpenAiConfig>,
}

impl Punctuator {
    /// `None` builds a punctuator that always returns its input
    pub fn new(config: Option<OpenAiConfig>) -> Result<Self> {
        let http_client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { http_client, config })
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_some()
    }

    /// Punctuate `text`, falling back to the original on any failure
    pub async fn punctuate(&self, text: &str) -> Punctuation {
        let Some(config) = &self.config else {
            debug!("Punctuation skipped: no completion credential");
            return Punctuation::unchanged(text);
        };

        if text.trim().is_empty() {
            return Punctuation { text: text.to_string(), degraded: false };
        }

        match self.request_completion(config, text).await {
            Ok(punctuated) => Punctuation { text: punctuated, degraded: false },
            Err(e) => {
                warn!(error = %e, "Punctuation failed, returning original text");
                Punctuation::unchanged(text)
            }
        }
    }

    async fn request_completion(&self, config: &OpenAiConfig, text: &str) -> Result<String> {
        let body = json!({
            "model": config.model,
            "temperature": 0.2,
            "messages": [
                { "role": "system", "content": PUNCTUATION_PROMPT },
                { "role": "user", "content": text },
            ],
        });

        let response = self
            .http_client
            .post(format!("{}/v1/chat/completions", config.base_url))
            .bearer_auth(&config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(Error::Remote { status: status.as_u16(), message: error_text });
        }

        let completion: CompletionResponse = response.json().await?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| Error::Internal("Empty completion".to_string()))
    }
}
