//! # sumflow
//!
//! Summarize text with an LLM and turn the summary into a flowchart.
//!
//! ## Why this crate?
//!
//! Summaries are easier to trust when you can see their structure. This
//! crate sends the input to the model once, asking for a declared JSON
//! shape with two fields: a bulleted `summary` and a Mermaid-style
//! `diagram` derived from that summary. The diagram is parsed and drawn
//! as text, and the summary can be exported as a PDF. Input is either
//! pasted text or a PDF whose text is extracted locally.
//!
//! ## Pipeline Overview
//!
//! ```text
//! text / PDF
//!  │
//!  ├─ 1. Input    typed text, or PDF text extraction (spawn_blocking)
//!  ├─ 2. Request  one generateContent call with a declared response shape
//!  ├─ 3. Shape    {"summary", "diagram"} — missing fields get fallbacks
//!  ├─ 4. View     summary text, or the flowchart parsed + rendered on demand
//!  └─ 5. Export   summary text as a paginated PDF
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sumflow::{summarize, SummaryConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reads GEMINI_API_KEY from the environment
//!     let config = SummaryConfig::from_env()?;
//!     let output = summarize("Cats are mammals. Dogs are mammals.", &config).await?;
//!     println!("{}", output.result.summary);
//!     eprintln!("tokens: {} in / {} out",
//!         output.stats.prompt_tokens,
//!         output.stats.completion_tokens);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `sumflow` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! sumflow = { version = "0.1", default-features = false }
//! ```
//!
//! ## Choosing a Model
//!
//! | Model | Quality | Best for |
//! |-------|---------|----------|
//! | `gemini-2.5-flash` | ★★★ | Default — fast, cheap |
//! | `gemini-2.5-pro`   | ★★★★★ | Long or technical input |
//! | `gemini-2.0-flash` | ★★★ | Previous generation |
//!
//! ## Interactive Sessions
//!
//! The binary's REPL and any embedding UI drive the same machine:
//! [`Session`] applies [`Action`]s through the pure [`reduce`] function,
//! runs the side effects the transitions request, and keeps pane and
//! diagram bookkeeping in [`ViewState`]. See [`state`] for the
//! transition rules.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod client;
pub mod config;
pub mod diagram;
pub mod error;
pub mod export;
pub mod extract;
pub mod output;
pub mod prompts;
pub mod session;
pub mod state;
pub mod summarize;
pub mod view;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use client::{GeminiClient, SummaryService};
pub use config::{SummaryConfig, SummaryConfigBuilder};
pub use diagram::{parse_flowchart, render_flowchart, render_unicode, Flowchart};
pub use error::{SumflowError, ViewError};
pub use export::{render_summary_pdf, EXPORT_TITLE};
pub use extract::extract_text;
pub use output::{SummaryOutput, SummaryResult, SummaryStats};
pub use session::Session;
pub use state::{reduce, Action, AppState, Command, PendingOp, RequestState};
pub use summarize::{summarize, summarize_document, summarize_sync};
pub use view::{render_screen, Pane, ViewState};
