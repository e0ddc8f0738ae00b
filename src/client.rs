//! Summary Request Client: the contract with the generative-language service.
//!
//! This module owns everything exchanged on the wire: it composes the
//! instruction, declares the structured response shape the service must
//! return, issues exactly one request, and maps every transport- or
//! service-level failure to [`SumflowError::ServiceUnavailable`]. It is
//! intentionally thin — the instruction wording lives in [`crate::prompts`]
//! and the state sequencing in [`crate::state`].
//!
//! ## Response shape
//!
//! The request declares a JSON schema with exactly two required string
//! fields, `summary` and `diagram`. No other shape is accepted: a payload
//! that fails to parse against it is a service failure. A field that parses
//! but is missing or blank takes its designated fallback, so callers always
//! receive the pair fully populated.
//!
//! ## Failure policy
//!
//! One attempt, no retry, no timeout. Underlying detail is logged at `warn`
//! and never surfaces past the generic [`SumflowError::ServiceUnavailable`]
//! message.

use crate::config::SummaryConfig;
use crate::error::SumflowError;
use crate::output::{SummaryOutput, SummaryResult, SummaryStats};
use crate::prompts::{self, FALLBACK_DIAGRAM, FALLBACK_SUMMARY};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Boundary trait for the summary service.
///
/// The production implementation is [`GeminiClient`]; tests and callers
/// needing middleware inject their own via
/// [`crate::config::SummaryConfig::service`].
#[async_trait]
pub trait SummaryService: Send + Sync {
    /// Produce a summary/diagram pair for the given text.
    ///
    /// Implementations must reject empty or whitespace-only input with
    /// [`SumflowError::EmptyInput`] before doing any work.
    async fn generate(&self, text: &str) -> Result<SummaryOutput, SumflowError>;
}

/// Resolve the service implementation for a config: a pre-built override
/// when present, otherwise a fresh [`GeminiClient`].
pub(crate) fn resolve_service(
    config: &SummaryConfig,
) -> Result<Arc<dyn SummaryService>, SumflowError> {
    if let Some(ref service) = config.service {
        return Ok(Arc::clone(service));
    }
    Ok(Arc::new(GeminiClient::new(config)?))
}

/// Client for the Gemini `generateContent` REST API.
#[derive(Debug)]
pub struct GeminiClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
    temperature: f32,
    max_output_tokens: usize,
    prompt_template: Option<String>,
}

impl GeminiClient {
    /// Build a client from the config.
    ///
    /// # Errors
    /// [`SumflowError::ApiKeyMissing`] when the config carries no
    /// credential. The HTTP client deliberately sets no request timeout: a
    /// hung service leaves the request outstanding until the process is
    /// interrupted.
    pub fn new(config: &SummaryConfig) -> Result<Self, SumflowError> {
        if config.api_key.trim().is_empty() {
            return Err(SumflowError::ApiKeyMissing);
        }
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| SumflowError::Internal(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
            prompt_template: config.prompt_template.clone(),
        })
    }

    fn request_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

#[async_trait]
impl SummaryService for GeminiClient {
    async fn generate(&self, text: &str) -> Result<SummaryOutput, SumflowError> {
        if text.trim().is_empty() {
            return Err(SumflowError::EmptyInput);
        }

        let started = Instant::now();
        let prompt = prompts::build_prompt(self.prompt_template.as_deref(), text);
        let request = GenerateContentRequest::for_prompt(
            &prompt,
            self.temperature,
            self.max_output_tokens,
        );

        debug!(
            model = %self.model,
            prompt_chars = prompt.chars().count(),
            "issuing summary request"
        );

        let response = self
            .http
            .post(self.request_url())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "summary request transport failure");
                SumflowError::ServiceUnavailable
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(
                %status,
                body = %truncate_for_log(&body),
                "summary service returned an error status"
            );
            return Err(SumflowError::ServiceUnavailable);
        }

        let envelope: GenerateContentResponse = response.json().await.map_err(|e| {
            warn!(error = %e, "summary response body was not valid JSON");
            SumflowError::ServiceUnavailable
        })?;

        let payload = envelope.primary_text().ok_or_else(|| {
            warn!("summary response contained no candidate text");
            SumflowError::ServiceUnavailable
        })?;
        let result = parse_summary_payload(payload)?;

        let duration_ms = started.elapsed().as_millis() as u64;
        let usage = envelope.usage_metadata.unwrap_or_default();
        let stats = SummaryStats {
            prompt_tokens: usage.prompt_token_count,
            completion_tokens: usage.candidates_token_count,
            duration_ms,
        };
        debug!(
            prompt_tokens = stats.prompt_tokens,
            completion_tokens = stats.completion_tokens,
            duration_ms,
            "summary request complete"
        );

        Ok(SummaryOutput { result, stats })
    }
}

/// Parse the model's JSON payload against the declared shape and apply the
/// designated fallbacks for missing or blank fields.
fn parse_summary_payload(payload: &str) -> Result<SummaryResult, SumflowError> {
    let raw: RawSummaryPayload = serde_json::from_str(payload).map_err(|e| {
        warn!(error = %e, "summary payload did not match the declared shape");
        SumflowError::ServiceUnavailable
    })?;
    Ok(SummaryResult {
        summary: field_or_fallback(raw.summary, FALLBACK_SUMMARY),
        diagram: field_or_fallback(raw.diagram, FALLBACK_DIAGRAM),
    })
}

/// Blank counts as missing: a present-but-empty field takes the fallback.
fn field_or_fallback(value: Option<String>, fallback: &str) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => fallback.to_string(),
    }
}

fn truncate_for_log(body: &str) -> String {
    const MAX: usize = 300;
    if body.chars().count() <= MAX {
        body.to_string()
    } else {
        let head: String = body.chars().take(MAX).collect();
        format!("{head}…")
    }
}

// ── Wire types ───────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

impl GenerateContentRequest {
    fn for_prompt(prompt: &str, temperature: f32, max_output_tokens: usize) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: response_schema(),
                temperature,
                max_output_tokens,
            },
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    response_schema: serde_json::Value,
    temperature: f32,
    max_output_tokens: usize,
}

/// The declared response shape: an object with exactly two required string
/// fields. Uppercase type names are the service's own schema dialect.
fn response_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "summary": {
                "type": "STRING",
                "description": "A concise, abstractive summary of the text, formatted as a bulleted list."
            },
            "diagram": {
                "type": "STRING",
                "description": "A flowchart representing the summary, in Mermaid flowchart syntax."
            }
        },
        "required": ["summary", "diagram"]
    })
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
}

impl GenerateContentResponse {
    /// Text of the first part of the first candidate, if any.
    fn primary_text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .first()
            .map(|p| p.text.as_str())
    }
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

/// The only payload shape accepted from the model. Extra fields are
/// ignored; a wrong-typed field fails the whole parse.
#[derive(Debug, Deserialize)]
struct RawSummaryPayload {
    summary: Option<String>,
    diagram: Option<String>,
}
