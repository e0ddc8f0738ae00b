//! Presentation state around the core machine.
//!
//! [`ViewState`] holds everything the display needs that is not part of
//! the request lifecycle: which pane is showing, the lazily rendered
//! diagram for the current result, and a transient notice line. It never
//! feeds back into [`reduce`](crate::state::reduce); a diagram that fails
//! to render is reported inline on the diagram pane while the app state
//! keeps its result untouched.

use std::str::FromStr;

use crate::error::ViewError;
use crate::output::SummaryResult;
use crate::state::{AppState, PendingOp, RequestState};

/// Which face of the result is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pane {
    /// The summary text.
    #[default]
    Text,
    /// The rendered flowchart.
    Diagram,
}

impl Pane {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Diagram => "diagram",
        }
    }
}

impl FromStr for Pane {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "diagram" => Ok(Self::Diagram),
            other => Err(format!("unknown pane `{other}` (expected `text` or `diagram`)")),
        }
    }
}

/// Render state of the diagram pane for the current result.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DiagramRender {
    /// Nothing rendered yet; rendering starts on first activation.
    #[default]
    NotRendered,
    /// A render was requested and has not finished.
    Rendering,
    /// Cached rendering of the current result's diagram.
    Rendered(String),
    /// The diagram source did not parse; shown inline on the pane.
    Failed(String),
}

#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub pane: Pane,
    pub diagram: DiagramRender,
    /// One-shot message line, cleared by the next action.
    pub notice: Option<String>,
    seen_result: Option<SummaryResult>,
}

impl ViewState {
    /// Sync with the app state after an action was reduced.
    ///
    /// A changed result snaps the view back to the text pane and drops
    /// the diagram cache; any pending notice is consumed.
    pub fn observe(&mut self, app: &AppState) {
        self.notice = None;
        if self.seen_result != app.result {
            self.pane = Pane::Text;
            self.diagram = DiagramRender::NotRendered;
            self.seen_result = app.result.clone();
        }
    }

    /// Switch panes. Returns the diagram source when this activation
    /// should kick off a render; the caller reports back through
    /// [`finish_render`](Self::finish_render).
    ///
    /// Rendering happens at most once per result. A cached rendering is
    /// reused and a failed one stays failed until a new result arrives.
    pub fn activate(&mut self, pane: Pane, app: &AppState) -> Option<String> {
        self.pane = pane;
        if pane != Pane::Diagram {
            return None;
        }
        let result = app.result.as_ref()?;
        if self.diagram == DiagramRender::NotRendered {
            self.diagram = DiagramRender::Rendering;
            return Some(result.diagram.clone());
        }
        None
    }

    /// Complete the render kicked off by [`activate`](Self::activate).
    pub fn finish_render(&mut self, outcome: Result<String, ViewError>) {
        if self.diagram != DiagramRender::Rendering {
            return;
        }
        self.diagram = match outcome {
            Ok(rendered) => DiagramRender::Rendered(rendered),
            Err(e) => DiagramRender::Failed(e.to_string()),
        };
    }

    /// Download is offered only when a result exists and nothing is in
    /// flight.
    pub fn can_export(&self, app: &AppState) -> bool {
        app.result.is_some() && !app.request.is_loading()
    }

    /// Surface an export problem as a notice without disturbing the
    /// result on screen.
    pub fn note_export_failure(&mut self, e: &ViewError) {
        self.notice = Some(e.to_string());
    }
}

/// Lay the whole session out as plain text, one call per frame.
pub fn render_screen(app: &AppState, view: &ViewState) -> String {
    let mut out = String::new();
    match &app.request {
        RequestState::Loading(PendingOp::Extract) => {
            out.push_str("Extracting text from PDF...\n");
        }
        RequestState::Loading(PendingOp::Summarize) => {
            out.push_str("Generating summary...\n");
        }
        RequestState::Failed { reason } => {
            out.push_str(reason);
            out.push('\n');
        }
        RequestState::Idle | RequestState::Succeeded => {}
    }

    out.push_str(&format!(
        "Input: {} characters\n",
        app.input.chars().count()
    ));

    match &app.result {
        None => out.push_str("No summary yet.\n"),
        Some(result) => {
            match view.pane {
                Pane::Text => {
                    out.push_str("--- Summary ---\n");
                    out.push_str(&result.summary);
                }
                Pane::Diagram => {
                    out.push_str("--- Diagram ---\n");
                    match &view.diagram {
                        DiagramRender::NotRendered | DiagramRender::Rendering => {
                            out.push_str("Rendering diagram...");
                        }
                        DiagramRender::Rendered(rendered) => out.push_str(rendered),
                        DiagramRender::Failed(message) => out.push_str(message),
                    }
                }
            }
            if !out.ends_with('\n') {
                out.push('\n');
            }
        }
    }

    if let Some(notice) = &view.notice {
        out.push_str(notice);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Action;

    fn app_with_result() -> AppState {
        AppState {
            input: "Cats are mammals. Dogs are mammals.".into(),
            request: RequestState::Succeeded,
            result: Some(SummaryResult {
                summary: "* Cats are mammals\n* Dogs are mammals".into(),
                diagram: "flowchart TD\n  A[Cats] --> B[Mammals]\n  C[Dogs] --> B".into(),
            }),
        }
    }

    #[test]
    fn default_view_shows_the_text_pane() {
        let view = ViewState::default();
        assert_eq!(view.pane, Pane::Text);
        assert_eq!(view.diagram, DiagramRender::NotRendered);
    }

    #[test]
    fn pane_names_round_trip() {
        assert_eq!("text".parse::<Pane>(), Ok(Pane::Text));
        assert_eq!("Diagram".parse::<Pane>(), Ok(Pane::Diagram));
        assert!("chart".parse::<Pane>().is_err());
    }

    #[test]
    fn a_new_result_resets_pane_and_diagram() {
        let mut view = ViewState {
            pane: Pane::Diagram,
            diagram: DiagramRender::Rendered("old".into()),
            ..ViewState::default()
        };
        view.observe(&app_with_result());
        assert_eq!(view.pane, Pane::Text);
        assert_eq!(view.diagram, DiagramRender::NotRendered);
    }

    #[test]
    fn observing_the_same_result_keeps_the_cache() {
        let app = app_with_result();
        let mut view = ViewState::default();
        view.observe(&app);
        view.activate(Pane::Diagram, &app);
        view.finish_render(Ok("rendered".into()));
        view.observe(&app);
        assert_eq!(view.diagram, DiagramRender::Rendered("rendered".into()));
        assert_eq!(view.pane, Pane::Diagram);
    }

    #[test]
    fn activating_the_diagram_requests_one_render() {
        let app = app_with_result();
        let mut view = ViewState::default();
        view.observe(&app);
        let first = view.activate(Pane::Diagram, &app);
        assert!(first.is_some());
        assert_eq!(view.diagram, DiagramRender::Rendering);
        view.finish_render(Ok("rendered".into()));
        assert_eq!(view.activate(Pane::Diagram, &app), None);
    }

    #[test]
    fn activating_the_diagram_without_a_result_is_quiet() {
        let app = AppState::default();
        let mut view = ViewState::default();
        assert_eq!(view.activate(Pane::Diagram, &app), None);
        assert_eq!(view.pane, Pane::Diagram);
        assert_eq!(view.diagram, DiagramRender::NotRendered);
    }

    #[test]
    fn a_failed_render_sticks_until_the_next_result() {
        let app = app_with_result();
        let mut view = ViewState::default();
        view.observe(&app);
        view.activate(Pane::Diagram, &app);
        view.finish_render(Err(ViewError::DiagramSyntax {
            line: 2,
            detail: "unclosed bracket on node `A`".into(),
        }));
        assert!(matches!(view.diagram, DiagramRender::Failed(_)));
        // No retry on re-activation.
        assert_eq!(view.activate(Pane::Diagram, &app), None);
    }

    #[test]
    fn stale_finish_render_is_ignored() {
        let mut view = ViewState::default();
        view.finish_render(Ok("rendered".into()));
        assert_eq!(view.diagram, DiagramRender::NotRendered);
    }

    #[test]
    fn export_is_gated_on_result_and_idle_request() {
        let view = ViewState::default();
        assert!(!view.can_export(&AppState::default()));
        assert!(view.can_export(&app_with_result()));
        let loading = AppState {
            request: RequestState::Loading(PendingOp::Summarize),
            ..app_with_result()
        };
        assert!(!view.can_export(&loading));
    }

    #[test]
    fn export_failure_notice_is_cleared_by_the_next_action() {
        let app = app_with_result();
        let mut view = ViewState::default();
        view.observe(&app);
        view.note_export_failure(&ViewError::ExportFailure {
            detail: "disk full".into(),
        });
        assert_eq!(
            view.notice.as_deref(),
            Some("Failed to generate PDF for download.")
        );
        // Any reduced action re-syncs the view and consumes the notice.
        let (app, _) = crate::state::reduce(app, Action::EditInput("edited".into()));
        view.observe(&app);
        assert!(view.notice.is_none());
    }

    #[test]
    fn screen_shows_the_failure_banner() {
        let app = AppState {
            request: RequestState::Failed {
                reason: "Please enter some text to summarize.".into(),
            },
            ..AppState::default()
        };
        let screen = render_screen(&app, &ViewState::default());
        assert!(screen.contains("Please enter some text to summarize."));
        assert!(screen.contains("No summary yet."));
    }

    #[test]
    fn screen_shows_summary_text_on_the_text_pane() {
        let app = app_with_result();
        let mut view = ViewState::default();
        view.observe(&app);
        let screen = render_screen(&app, &view);
        assert!(screen.contains("--- Summary ---"));
        assert!(screen.contains("* Cats are mammals"));
    }

    #[test]
    fn screen_shows_the_rendered_diagram_on_the_diagram_pane() {
        let app = app_with_result();
        let mut view = ViewState::default();
        view.observe(&app);
        view.activate(Pane::Diagram, &app);
        view.finish_render(Ok("│ Cats │".into()));
        let screen = render_screen(&app, &view);
        assert!(screen.contains("--- Diagram ---"));
        assert!(screen.contains("│ Cats │"));
    }

    #[test]
    fn screen_announces_each_loading_kind() {
        let extracting = AppState {
            request: RequestState::Loading(PendingOp::Extract),
            ..AppState::default()
        };
        assert!(render_screen(&extracting, &ViewState::default())
            .contains("Extracting text from PDF..."));
        let summarizing = AppState {
            request: RequestState::Loading(PendingOp::Summarize),
            ..AppState::default()
        };
        assert!(render_screen(&summarizing, &ViewState::default())
            .contains("Generating summary..."));
    }
}
