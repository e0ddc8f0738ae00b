//! One-shot summarization entry points.
//!
//! These wrap the service call for callers that do not need the
//! interactive state machine: hand over text (or a document), get the
//! summary/diagram pair back. The interactive flow lives in
//! [`crate::session`].

use crate::client::resolve_service;
use crate::config::SummaryConfig;
use crate::error::SumflowError;
use crate::extract;
use crate::output::SummaryOutput;
use tracing::info;

/// Summarize a block of text.
///
/// This is the primary entry point for the library.
///
/// # Arguments
/// * `text` — The text to summarize
/// * `config` — Summarization configuration
///
/// # Returns
/// The summary/diagram pair plus token usage for the request.
///
/// # Errors
/// - [`SumflowError::EmptyInput`] when `text` is blank
/// - [`SumflowError::ApiKeyMissing`] when no credential is configured
/// - [`SumflowError::ServiceUnavailable`] when the request fails
pub async fn summarize(
    text: impl AsRef<str>,
    config: &SummaryConfig,
) -> Result<SummaryOutput, SumflowError> {
    let text = text.as_ref();
    info!("Starting summarization: {} chars of input", text.len());

    let service = resolve_service(config)?;
    let output = service.generate(text).await?;

    info!(
        "Summary complete: {} prompt + {} completion tokens, {}ms",
        output.stats.prompt_tokens, output.stats.completion_tokens, output.stats.duration_ms
    );
    Ok(output)
}

/// Summarize a document given as raw bytes.
///
/// The document's text is extracted first (PDF is the only supported
/// format), then summarized like typed text.
///
/// # Arguments
/// * `bytes` — Raw document bytes
/// * `media_type` — Declared media type of `bytes`, e.g. `application/pdf`
/// * `config` — Summarization configuration
///
/// # Example
/// ```rust,no_run
/// use sumflow::{summarize_document, SummaryConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let bytes = std::fs::read("paper.pdf")?;
/// let config = SummaryConfig::from_env()?;
/// let output = summarize_document(bytes, "application/pdf", &config).await?;
/// println!("{}", output.result.summary);
/// # Ok(())
/// # }
/// ```
pub async fn summarize_document(
    bytes: Vec<u8>,
    media_type: impl AsRef<str>,
    config: &SummaryConfig,
) -> Result<SummaryOutput, SumflowError> {
    let media_type = media_type.as_ref().to_string();
    let text = tokio::task::spawn_blocking(move || extract::extract_text(&bytes, &media_type))
        .await
        .map_err(|e| SumflowError::Internal(format!("extraction task failed: {e}")))??;
    summarize(text, config).await
}

/// Synchronous wrapper around [`summarize`].
///
/// Creates a temporary tokio runtime internally.
pub fn summarize_sync(
    text: impl AsRef<str>,
    config: &SummaryConfig,
) -> Result<SummaryOutput, SumflowError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| SumflowError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(summarize(text, config))
}
