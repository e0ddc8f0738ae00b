//! Application state machine: explicit state, pure transitions.
//!
//! The whole user-visible session is one value ([`AppState`]) advanced by a
//! pure function ([`reduce`]). User actions and operation completions are
//! both [`Action`]s; side effects are never performed here — a transition
//! that needs one returns a [`Command`], which the session driver executes
//! and whose completion comes back as another action. This keeps every
//! transition unit-testable and makes the single-writer rule structural:
//! nothing mutates input, request state, or result except `reduce`.
//!
//! ## Single-flight
//!
//! "An operation is outstanding" is an explicit token:
//! [`RequestState::Loading`] carries the [`PendingOp`] that holds the slot.
//! Trigger actions arriving while the token is held are rejected, and
//! completions that do not match the held token are ignored as stale.

use crate::error::SumflowError;
use crate::extract;
use crate::output::{SummaryOutput, SummaryResult};
use tracing::debug;

/// Which operation currently holds the single-flight slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingOp {
    /// Document text extraction after a file load.
    Extract,
    /// A summary request to the service.
    Summarize,
}

/// Request lifecycle. Exactly one variant is active at a time.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RequestState {
    /// Nothing outstanding, nothing failed.
    #[default]
    Idle,
    /// An operation is outstanding; no new trigger action is accepted.
    Loading(PendingOp),
    /// The last summarize action produced a result.
    Succeeded,
    /// The last operation failed; `reason` is the banner text.
    Failed { reason: String },
}

impl RequestState {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading(_))
    }

    /// Banner text when the last operation failed.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Failed { reason } => Some(reason),
            _ => None,
        }
    }
}

/// The user-visible session state.
///
/// `input` is replaced wholesale by extraction and freely edited by the
/// user; `result` is only ever set as a whole pair on summarize success.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    /// Raw text the user intends to summarize.
    pub input: String,
    pub request: RequestState,
    /// Result of the last successful summarize action, if any.
    pub result: Option<SummaryResult>,
}

impl AppState {
    /// Whether a trigger action (summarize, load, edit) would be accepted.
    pub fn accepts_actions(&self) -> bool {
        !self.request.is_loading()
    }
}

/// User actions and operation completions fed to [`reduce`].
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// The user edited the input text directly.
    EditInput(String),
    /// The user asked for the current input to be summarized.
    Summarize,
    /// The user loaded a document; `media_type` is the declared type of
    /// `bytes`. Each load carries its own buffer, so a repeated selection
    /// of the same file is a fresh action.
    LoadDocument { media_type: String, bytes: Vec<u8> },
    /// Completion of [`Command::ExtractText`].
    ExtractionFinished(Result<String, SumflowError>),
    /// Completion of [`Command::RequestSummary`].
    SummarizeFinished(Result<SummaryOutput, SumflowError>),
}

/// Side effects requested by a transition, executed by the session driver.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    ExtractText { media_type: String, bytes: Vec<u8> },
    RequestSummary { text: String },
}

/// Advance the state machine by one action.
///
/// Pure: no I/O, no clocks. Returns the next state plus at most one command
/// to execute. Rejected and stale actions return the state unchanged.
pub fn reduce(state: AppState, action: Action) -> (AppState, Option<Command>) {
    match action {
        Action::EditInput(text) => {
            if state.request.is_loading() {
                debug!("ignoring edit: an operation is in flight");
                return (state, None);
            }
            // Editing clears a failure banner but keeps a shown result.
            let request = match state.request {
                RequestState::Failed { .. } => RequestState::Idle,
                other => other,
            };
            (
                AppState {
                    input: text,
                    request,
                    ..state
                },
                None,
            )
        }

        Action::Summarize => {
            if state.request.is_loading() {
                debug!("rejecting summarize: an operation is in flight");
                return (state, None);
            }
            if state.input.trim().is_empty() {
                return (
                    AppState {
                        request: RequestState::Failed {
                            reason: SumflowError::EmptyInput.to_string(),
                        },
                        ..state
                    },
                    None,
                );
            }
            let text = state.input.clone();
            (
                AppState {
                    request: RequestState::Loading(PendingOp::Summarize),
                    result: None,
                    ..state
                },
                Some(Command::RequestSummary { text }),
            )
        }

        Action::LoadDocument { media_type, bytes } => {
            if state.request.is_loading() {
                debug!("rejecting load: an operation is in flight");
                return (state, None);
            }
            if !extract::is_pdf_media_type(&media_type) {
                // Straight to Failed: no Loading, input untouched.
                let reason = SumflowError::UnsupportedFormat { media_type }.to_string();
                return (
                    AppState {
                        request: RequestState::Failed { reason },
                        ..state
                    },
                    None,
                );
            }
            // Stale text must not survive a failed load attempt.
            (
                AppState {
                    input: String::new(),
                    request: RequestState::Loading(PendingOp::Extract),
                    ..state
                },
                Some(Command::ExtractText { media_type, bytes }),
            )
        }

        Action::ExtractionFinished(outcome) => {
            if state.request != RequestState::Loading(PendingOp::Extract) {
                debug!("ignoring stale extraction completion");
                return (state, None);
            }
            match outcome {
                // Extraction alone never produces a result; back to Idle.
                Ok(text) => (
                    AppState {
                        input: text,
                        request: RequestState::Idle,
                        ..state
                    },
                    None,
                ),
                Err(e) => (
                    AppState {
                        request: RequestState::Failed {
                            reason: e.to_string(),
                        },
                        ..state
                    },
                    None,
                ),
            }
        }

        Action::SummarizeFinished(outcome) => {
            if state.request != RequestState::Loading(PendingOp::Summarize) {
                debug!("ignoring stale summarize completion");
                return (state, None);
            }
            match outcome {
                Ok(output) => (
                    AppState {
                        request: RequestState::Succeeded,
                        result: Some(output.result),
                        ..state
                    },
                    None,
                ),
                Err(e) => (
                    AppState {
                        request: RequestState::Failed {
                            reason: e.to_string(),
                        },
                        ..state
                    },
                    None,
                ),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::SummaryStats;

    fn idle_with_input(input: &str) -> AppState {
        AppState {
            input: input.to_string(),
            ..AppState::default()
        }
    }

    fn some_output() -> SummaryOutput {
        SummaryOutput {
            result: SummaryResult {
                summary: "* Cats are mammals\n* Dogs are mammals".into(),
                diagram: "flowchart TD\nA[Cats]-->B[Mammals]\nC[Dogs]-->B".into(),
            },
            stats: SummaryStats::default(),
        }
    }

    #[test]
    fn default_state_is_idle_and_empty() {
        let state = AppState::default();
        assert_eq!(state.request, RequestState::Idle);
        assert!(state.input.is_empty());
        assert!(state.result.is_none());
    }

    #[test]
    fn edit_updates_input() {
        let (state, cmd) = reduce(
            AppState::default(),
            Action::EditInput("some text".into()),
        );
        assert_eq!(state.input, "some text");
        assert_eq!(state.request, RequestState::Idle);
        assert!(cmd.is_none());
    }

    #[test]
    fn edit_clears_failure_banner() {
        let failed = AppState {
            request: RequestState::Failed {
                reason: "whatever".into(),
            },
            ..idle_with_input("old")
        };
        let (state, _) = reduce(failed, Action::EditInput("new".into()));
        assert_eq!(state.request, RequestState::Idle);
        assert_eq!(state.input, "new");
    }

    #[test]
    fn edit_keeps_a_shown_result() {
        let succeeded = AppState {
            request: RequestState::Succeeded,
            result: Some(some_output().result),
            ..idle_with_input("old")
        };
        let (state, _) = reduce(succeeded, Action::EditInput("new".into()));
        assert_eq!(state.request, RequestState::Succeeded);
        assert!(state.result.is_some());
    }

    #[test]
    fn edit_ignored_while_loading() {
        let loading = AppState {
            request: RequestState::Loading(PendingOp::Summarize),
            ..idle_with_input("locked")
        };
        let (state, cmd) = reduce(loading.clone(), Action::EditInput("new".into()));
        assert_eq!(state, loading);
        assert!(cmd.is_none());
    }

    #[test]
    fn empty_input_summarize_fails_without_loading_or_command() {
        let (state, cmd) = reduce(idle_with_input(""), Action::Summarize);
        assert_eq!(
            state.request.error_message(),
            Some("Please enter some text to summarize.")
        );
        assert!(cmd.is_none());
    }

    #[test]
    fn whitespace_input_summarize_fails_without_loading_or_command() {
        let (state, cmd) = reduce(idle_with_input("  \n\t "), Action::Summarize);
        assert!(matches!(state.request, RequestState::Failed { .. }));
        assert!(cmd.is_none());
    }

    #[test]
    fn summarize_takes_the_loading_token_and_requests() {
        let (state, cmd) = reduce(idle_with_input("Cats are mammals."), Action::Summarize);
        assert_eq!(state.request, RequestState::Loading(PendingOp::Summarize));
        assert_eq!(
            cmd,
            Some(Command::RequestSummary {
                text: "Cats are mammals.".into()
            })
        );
    }

    #[test]
    fn summarize_clears_prior_error_and_result() {
        let prior = AppState {
            request: RequestState::Failed {
                reason: "old error".into(),
            },
            result: Some(some_output().result),
            ..idle_with_input("fresh text")
        };
        let (state, cmd) = reduce(prior, Action::Summarize);
        assert_eq!(state.request, RequestState::Loading(PendingOp::Summarize));
        assert!(state.result.is_none());
        assert!(cmd.is_some());
    }

    #[test]
    fn summarize_rejected_while_loading() {
        let loading = AppState {
            request: RequestState::Loading(PendingOp::Extract),
            ..idle_with_input("text")
        };
        let (state, cmd) = reduce(loading.clone(), Action::Summarize);
        assert_eq!(state, loading);
        assert!(cmd.is_none());
    }

    #[test]
    fn non_pdf_load_fails_directly_and_keeps_input() {
        let (state, cmd) = reduce(
            idle_with_input("typed text"),
            Action::LoadDocument {
                media_type: "text/plain".into(),
                bytes: b"hello".to_vec(),
            },
        );
        assert_eq!(
            state.request.error_message(),
            Some("Please upload a valid PDF file.")
        );
        assert_eq!(state.input, "typed text");
        assert!(cmd.is_none());
    }

    #[test]
    fn pdf_load_clears_input_and_takes_extract_token() {
        let (state, cmd) = reduce(
            idle_with_input("stale text"),
            Action::LoadDocument {
                media_type: "application/pdf".into(),
                bytes: b"%PDF".to_vec(),
            },
        );
        assert_eq!(state.request, RequestState::Loading(PendingOp::Extract));
        assert_eq!(state.input, "");
        assert!(matches!(cmd, Some(Command::ExtractText { .. })));
    }

    #[test]
    fn load_rejected_while_loading() {
        let loading = AppState {
            request: RequestState::Loading(PendingOp::Summarize),
            ..idle_with_input("text")
        };
        let (state, cmd) = reduce(
            loading.clone(),
            Action::LoadDocument {
                media_type: "application/pdf".into(),
                bytes: vec![],
            },
        );
        assert_eq!(state, loading);
        assert!(cmd.is_none());
    }

    #[test]
    fn extraction_success_replaces_input_and_returns_to_idle() {
        let loading = AppState {
            request: RequestState::Loading(PendingOp::Extract),
            result: Some(some_output().result),
            ..AppState::default()
        };
        let (state, cmd) = reduce(
            loading,
            Action::ExtractionFinished(Ok("page one\npage two".into())),
        );
        assert_eq!(state.input, "page one\npage two");
        assert_eq!(state.request, RequestState::Idle);
        // Extraction never touches the result.
        assert!(state.result.is_some());
        assert!(cmd.is_none());
    }

    #[test]
    fn extraction_failure_reports_and_keeps_input_cleared() {
        let loading = AppState {
            request: RequestState::Loading(PendingOp::Extract),
            ..AppState::default()
        };
        let (state, _) = reduce(
            loading,
            Action::ExtractionFinished(Err(SumflowError::CorruptDocument {
                detail: "bad xref".into(),
            })),
        );
        assert_eq!(
            state.request.error_message(),
            Some("Failed to parse the PDF file.")
        );
        assert_eq!(state.input, "");
    }

    #[test]
    fn summarize_success_sets_result_atomically() {
        let loading = AppState {
            request: RequestState::Loading(PendingOp::Summarize),
            ..idle_with_input("Cats are mammals. Dogs are mammals.")
        };
        let (state, _) = reduce(loading, Action::SummarizeFinished(Ok(some_output())));
        assert_eq!(state.request, RequestState::Succeeded);
        let result = state.result.expect("result set on success");
        assert!(!result.summary.is_empty());
        assert!(!result.diagram.is_empty());
    }

    #[test]
    fn summarize_failure_preserves_input() {
        let loading = AppState {
            request: RequestState::Loading(PendingOp::Summarize),
            ..idle_with_input("the text I typed")
        };
        let (state, _) = reduce(
            loading,
            Action::SummarizeFinished(Err(SumflowError::ServiceUnavailable)),
        );
        assert_eq!(state.input, "the text I typed");
        assert_eq!(
            state.request.error_message(),
            Some("Failed to generate summary. Please check your API key and try again.")
        );
        assert!(state.result.is_none());
    }

    #[test]
    fn stale_summarize_completion_is_ignored() {
        let idle = idle_with_input("text");
        let (state, cmd) = reduce(idle.clone(), Action::SummarizeFinished(Ok(some_output())));
        assert_eq!(state, idle);
        assert!(cmd.is_none());
    }

    #[test]
    fn mismatched_completion_is_ignored() {
        let extracting = AppState {
            request: RequestState::Loading(PendingOp::Extract),
            ..AppState::default()
        };
        let (state, cmd) = reduce(
            extracting.clone(),
            Action::SummarizeFinished(Ok(some_output())),
        );
        assert_eq!(state, extracting);
        assert!(cmd.is_none());
    }

    #[test]
    fn resubmit_after_failure_clears_the_reason() {
        let failed = AppState {
            request: RequestState::Failed {
                reason: "previous failure".into(),
            },
            ..idle_with_input("try again")
        };
        let (state, cmd) = reduce(failed, Action::Summarize);
        assert!(state.request.error_message().is_none());
        assert_eq!(state.request, RequestState::Loading(PendingOp::Summarize));
        assert!(cmd.is_some());
    }
}
