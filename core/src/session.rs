//! Session context: the single-threaded loop tying editor events to
//! recomputes, decorations and the panel.

use crate::analysis::{AnalysisResult, Coordinator};
use crate::display::{DisplaySync, DisplayUpdate, PanelEvent, PanelHost};
use crate::editor::Editor;
use crate::error::FitzError;
use crate::tracker::{ChangeTracker, Decision, EditorEvent};
use crate::Config;

/// What handling one event did.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The event did not warrant any work.
    Skipped,
    Refreshed(AnalysisResult),
    /// A recompute ran but there was no document; the panel shows an error.
    NoDocument,
    Cleared,
}

pub struct Session<H: PanelHost> {
    coordinator: Coordinator,
    tracker: ChangeTracker,
    display: DisplaySync<H>,
}

impl<H: PanelHost> Session<H> {
    pub fn new(config: Config, host: H) -> Self {
        let tracker = ChangeTracker::new(config.selection_dedup, config.clear_on_no_editor);
        let display = DisplaySync::new(host, config.panel.clone());
        Self {
            coordinator: Coordinator::new(config),
            tracker,
            display,
        }
    }

    /// Swap in a new config. An open panel stays open and unrevealed.
    pub fn reconfigure(&mut self, config: Config) {
        self.tracker = ChangeTracker::new(config.selection_dedup, config.clear_on_no_editor);
        self.display.set_config(config.panel.clone());
        self.coordinator = Coordinator::new(config);
    }

    pub fn display(&self) -> &DisplaySync<H> {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut DisplaySync<H> {
        &mut self.display
    }

    /// Run at most one recompute for `event`.
    pub fn handle(&mut self, event: &EditorEvent, editor: &mut dyn Editor) -> Outcome {
        let active = editor.active_document().map(|d| d.id().clone());
        match self.tracker.observe(event, active.as_ref()) {
            Decision::Ignore => Outcome::Skipped,
            Decision::Clear => self.clear(),
            Decision::Recompute => self.refresh(editor),
        }
    }

    /// Recompute unconditionally and push the result to the panel.
    pub fn refresh(&mut self, editor: &mut dyn Editor) -> Outcome {
        match self.coordinator.recompute(editor) {
            Ok(result) => {
                self.push(DisplayUpdate::Result(&result));
                Outcome::Refreshed(result)
            }
            Err(err) => {
                tracing::debug!("{err}");
                self.push(DisplayUpdate::Error);
                Outcome::NoDocument
            }
        }
    }

    pub fn clear(&mut self) -> Outcome {
        self.push(DisplayUpdate::Clear);
        Outcome::Cleared
    }

    pub fn receive(&self, event: &PanelEvent) {
        self.display.receive(event);
    }

    fn push(&mut self, update: DisplayUpdate<'_>) {
        if let Err(err) = self.display.show(update) {
            match &err {
                FitzError::MissingHostContext => {
                    tracing::warn!("{err}; dropping panel update until the host is ready")
                }
                _ => tracing::warn!("panel update failed: {err}"),
            }
        }
    }
}
