//! Session driver: runs the state machine against real effects.
//!
//! [`Session`] owns the app state, the view state, and the summary
//! service. [`dispatch`](Session::dispatch) feeds one action through
//! [`reduce`](crate::state::reduce), executes whatever command the
//! transition requested, and feeds the completion back in. Extraction
//! runs on the blocking pool; the summary request awaits the service.
//! By the time `dispatch` returns the operation has settled one way or
//! the other, which is what makes the integration tests deterministic.

use std::path::Path;
use std::sync::Arc;

use tracing::warn;

use crate::client::{resolve_service, SummaryService};
use crate::config::SummaryConfig;
use crate::diagram;
use crate::error::SumflowError;
use crate::export;
use crate::extract;
use crate::output::SummaryStats;
use crate::state::{reduce, Action, AppState, Command};
use crate::view::{render_screen, Pane, ViewState};

pub struct Session {
    state: AppState,
    view: ViewState,
    service: Arc<dyn SummaryService>,
    last_stats: Option<SummaryStats>,
}

impl Session {
    /// Build a session for the given config.
    ///
    /// # Errors
    /// Fails when no service can be resolved, typically
    /// [`SumflowError::ApiKeyMissing`].
    pub fn new(config: &SummaryConfig) -> Result<Self, SumflowError> {
        Ok(Self {
            state: AppState::default(),
            view: ViewState::default(),
            service: resolve_service(config)?,
            last_stats: None,
        })
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    /// Token usage of the most recent successful summary request.
    pub fn last_stats(&self) -> Option<SummaryStats> {
        self.last_stats
    }

    /// Apply one action and settle any operation it starts.
    pub async fn dispatch(&mut self, action: Action) -> &AppState {
        if let Some(command) = self.apply(action) {
            let completion = self.run(command).await;
            // Completion actions never request a second command.
            self.apply(completion);
        }
        &self.state
    }

    fn apply(&mut self, action: Action) -> Option<Command> {
        let (next, command) = reduce(std::mem::take(&mut self.state), action);
        self.state = next;
        self.view.observe(&self.state);
        command
    }

    async fn run(&mut self, command: Command) -> Action {
        match command {
            Command::ExtractText { media_type, bytes } => {
                let outcome =
                    tokio::task::spawn_blocking(move || extract::extract_text(&bytes, &media_type))
                        .await
                        .unwrap_or_else(|e| {
                            Err(SumflowError::Internal(format!("extraction task failed: {e}")))
                        });
                Action::ExtractionFinished(outcome)
            }
            Command::RequestSummary { text } => {
                let outcome = self.service.generate(&text).await;
                if let Ok(output) = &outcome {
                    self.last_stats = Some(output.stats);
                }
                Action::SummarizeFinished(outcome)
            }
        }
    }

    /// Switch panes. The diagram is rendered on its first activation and
    /// cached; a syntax error lands on the pane, not in the app state.
    pub fn activate_pane(&mut self, pane: Pane) {
        if let Some(source) = self.view.activate(pane, &self.state) {
            self.view.finish_render(diagram::render_flowchart(&source));
        }
    }

    /// PDF bytes for the current summary, or `None` when export is not
    /// available or rendering fails. A failure leaves a notice on the
    /// view and the result on screen.
    pub fn export_pdf(&mut self) -> Option<Vec<u8>> {
        if !self.view.can_export(&self.state) {
            return None;
        }
        let summary = self.state.result.as_ref()?.summary.clone();
        match export::render_summary_pdf(&summary, export::EXPORT_TITLE) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                warn!(error = %e, "summary export failed");
                self.view.note_export_failure(&e);
                None
            }
        }
    }

    /// Export the current summary straight to `path`. Returns whether
    /// the file was written.
    pub fn export_to_file(&mut self, path: &Path) -> bool {
        if !self.view.can_export(&self.state) {
            return false;
        }
        let Some(result) = self.state.result.as_ref() else {
            return false;
        };
        match export::export_to_file(&result.summary, export::EXPORT_TITLE, path) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "summary export failed");
                self.view.note_export_failure(&e);
                false
            }
        }
    }

    /// The current frame as plain text.
    pub fn screen(&self) -> String {
        render_screen(&self.state, &self.view)
    }
}
