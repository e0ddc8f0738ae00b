//! Document text extraction: PDF bytes → page-ordered plain text.
//!
//! The extractor produces the single string that replaces the input
//! document after a successful load: each page's content items joined with
//! single spaces, pages joined with newlines. It performs no interpretation
//! beyond that — the caller decides what to do with the text.
//!
//! `pdf-extract` is known to panic on malformed font programs rather than
//! return an error, so the parse runs under `catch_unwind` and a panic is
//! reported as a corrupt document like any other parse failure.

use crate::error::SumflowError;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;
use tracing::{debug, warn};

/// The only media type the extractor accepts.
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// Whether a declared media type names a PDF document.
pub fn is_pdf_media_type(media_type: &str) -> bool {
    media_type.trim().eq_ignore_ascii_case(PDF_MEDIA_TYPE)
}

/// Derive the declared media type for a file path from its extension.
pub fn media_type_for_path(path: impl AsRef<Path>) -> String {
    mime_guess::from_path(path.as_ref())
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

/// Extract the text of a PDF document.
///
/// # Arguments
/// * `bytes` — raw document bytes
/// * `media_type` — declared media type of the buffer
///
/// # Errors
/// * [`SumflowError::UnsupportedFormat`] when `media_type` is not PDF
///   (checked before the buffer is touched).
/// * [`SumflowError::CorruptDocument`] when the buffer cannot be parsed.
///
/// A well-formed PDF with no text content yields `Ok("")`.
pub fn extract_text(bytes: &[u8], media_type: &str) -> Result<String, SumflowError> {
    if !is_pdf_media_type(media_type) {
        warn!(media_type, "rejecting load: declared media type is not PDF");
        return Err(SumflowError::UnsupportedFormat {
            media_type: media_type.to_string(),
        });
    }

    let pages = catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(bytes)
    }))
    .map_err(|_| {
        warn!("PDF parser panicked on malformed input");
        SumflowError::CorruptDocument {
            detail: "parser panicked on malformed input".into(),
        }
    })?
    .map_err(|e| {
        warn!(error = %e, "PDF parsing failed");
        SumflowError::CorruptDocument {
            detail: e.to_string(),
        }
    })?;

    debug!(pages = pages.len(), "extracted page text from PDF");
    Ok(assemble_pages(&pages))
}

/// Join page texts into the final input string.
///
/// Items within a page are joined with single spaces, pages with a newline.
/// A document whose pages are all empty collapses to the empty string
/// rather than a run of newlines.
fn assemble_pages(pages: &[String]) -> String {
    if pages.iter().all(|p| p.split_whitespace().next().is_none()) {
        return String::new();
    }
    pages
        .iter()
        .map(|p| join_page_items(p))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Collapse a page's whitespace-separated content items to single spaces.
fn join_page_items(page: &str) -> String {
    page.split_whitespace().collect::<Vec<_>>().join(" ")
}
