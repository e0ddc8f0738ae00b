//! Output types returned by the summary pipeline.

use serde::{Deserialize, Serialize};

/// The atomic result of a successful summarize action.
///
/// Both fields are populated together or not at all: the request client
/// substitutes fallbacks for missing fields before this value is
/// constructed, so callers never observe a half-filled pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryResult {
    /// Abstractive summary, one bulleted point per line.
    pub summary: String,
    /// Flowchart mini-language source describing the summary.
    pub diagram: String,
}

/// Usage accounting for one summary request.
///
/// Token counts come from the service's usage metadata and are zero when the
/// service omits it; `duration_ms` is measured locally around the call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub duration_ms: u64,
}

/// Result plus accounting, as returned by the one-shot entry points and the
/// [`crate::client::SummaryService`] boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryOutput {
    pub result: SummaryResult,
    pub stats: SummaryStats,
}
