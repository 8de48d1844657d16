//! Punctuation endpoint
//!
//! Always answers 200 for a well-formed body: when the completion call is
//! unavailable the original text comes back with `degraded: true`.

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use serde::Deserialize;

use super::DataEnvelope;
use crate::{ApiError, ApiResult, AppState};
use instadash_common::services::Punctuation;

/// Longest text accepted for punctuation, in characters
pub const MAX_TEXT_CHARS: usize = 10_000;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PunctuateRequest {
    pub text: String,
}

impl PunctuateRequest {
    pub(crate) fn validate(&self) -> ApiResult<()> {
        if self.text.chars().count() > MAX_TEXT_CHARS {
            return Err(ApiError::Validation(format!(
                "text longer than {} characters",
                MAX_TEXT_CHARS
            )));
        }
        Ok(())
    }
}

/// POST /api/punctuate
///
/// **Request:** `{"text": "hola como estas"}`
/// **Response:** `{"success": true, "data": {"text": "Hola, ¿cómo estás?", "degraded": false}}`
pub async fn punctuate(
    State(state): State<AppState>,
    payload: Result<Json<PunctuateRequest>, JsonRejection>,
) -> ApiResult<Json<DataEnvelope<Punctuation>>> {
    let Json(request) = payload?;
    request.validate()?;

    let result = state.punctuator.punctuate(&request.text).await;
    Ok(Json(DataEnvelope::new(result)))
}

pub fn punctuation_routes() -> Router<AppState> {
    Router::new().route("/api/punctuate", post(punctuate))
}
