//! Error types for the sumflow library.
//!
//! Two distinct error types reflect two distinct failure scopes:
//!
//! * [`SumflowError`] — owned by the application state machine. Each variant
//!   becomes the `reason` of [`crate::state::RequestState::Failed`]; its
//!   `Display` is the short banner text shown to the user. The startup
//!   variants ([`SumflowError::ApiKeyMissing`],
//!   [`SumflowError::InvalidConfig`]) abort before a session exists and are
//!   the only ones with multi-line hints.
//!
//! * [`ViewError`] — scoped to the presenter (diagram rendering, PDF
//!   export). Shown inline in the affected pane and never allowed to change
//!   the request state.
//!
//! The separation keeps the failure policy auditable: everything that can
//! set `Failed` is enumerable in one place, and a presentation mishap cannot
//! corrupt request bookkeeping.

use thiserror::Error;

/// Failures owned by the application state machine.
///
/// `Display` is deliberately a short user-facing sentence. Diagnostic detail
/// lives in the variant fields and is logged at the failure site, not shown
/// in the error banner.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SumflowError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Summarize was requested with empty or whitespace-only input.
    #[error("Please enter some text to summarize.")]
    EmptyInput,

    /// The loaded file's declared media type is not PDF.
    #[error("Please upload a valid PDF file.")]
    UnsupportedFormat { media_type: String },

    /// The byte buffer could not be parsed as a PDF document.
    #[error("Failed to parse the PDF file.")]
    CorruptDocument { detail: String },

    // ── Service errors ────────────────────────────────────────────────────
    /// The summary service could not complete the request: transport
    /// failure, non-2xx status, or a payload that does not match the
    /// declared response shape.
    #[error("Failed to generate summary. Please check your API key and try again.")]
    ServiceUnavailable,

    // ── Startup errors ────────────────────────────────────────────────────
    /// No service credential was supplied at process start.
    #[error(
        "GEMINI_API_KEY environment variable not set.\n\
         Create an API key in Google AI Studio, then:\n  \
         export GEMINI_API_KEY=<your-key>"
    )]
    ApiKeyMissing,

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Presenter-scoped failures: shown inline in the affected pane.
///
/// These never become `Failed{reason}`. A broken diagram or a failed export
/// leaves the summary result and the request state exactly as they were.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ViewError {
    /// The diagram source does not conform to the flowchart mini-language.
    /// `line` is 1-based within the source.
    #[error("Diagram syntax error at line {line}: {detail}")]
    DiagramSyntax { line: usize, detail: String },

    /// PDF authoring for the export action failed.
    #[error("Failed to generate PDF for download.")]
    ExportFailure { detail: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_display() {
        assert_eq!(
            SumflowError::EmptyInput.to_string(),
            "Please enter some text to summarize."
        );
    }

    #[test]
    fn unsupported_format_display_hides_media_type() {
        let e = SumflowError::UnsupportedFormat {
            media_type: "image/png".into(),
        };
        let msg = e.to_string();
        assert_eq!(msg, "Please upload a valid PDF file.");
        assert!(!msg.contains("image/png"));
    }

    #[test]
    fn corrupt_document_display_hides_detail() {
        let e = SumflowError::CorruptDocument {
            detail: "xref table truncated at byte 412".into(),
        };
        let msg = e.to_string();
        assert_eq!(msg, "Failed to parse the PDF file.");
        assert!(!msg.contains("xref"));
    }

    #[test]
    fn service_unavailable_display_is_generic() {
        let msg = SumflowError::ServiceUnavailable.to_string();
        assert!(msg.contains("check your API key"));
    }

    #[test]
    fn api_key_missing_display_has_hint() {
        let msg = SumflowError::ApiKeyMissing.to_string();
        assert!(msg.contains("GEMINI_API_KEY"));
        assert!(msg.contains("export GEMINI_API_KEY"));
    }

    #[test]
    fn diagram_syntax_display_names_the_line() {
        let e = ViewError::DiagramSyntax {
            line: 3,
            detail: "expected node identifier".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("line 3"));
        assert!(msg.contains("expected node identifier"));
    }

    #[test]
    fn export_failure_display_hides_detail() {
        let e = ViewError::ExportFailure {
            detail: "disk full".into(),
        };
        assert_eq!(e.to_string(), "Failed to generate PDF for download.");
    }
}
