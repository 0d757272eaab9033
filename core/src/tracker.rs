//! Decides which editor notifications warrant a recompute.

use std::sync::Arc;

use crate::editor::{selection_set, DocumentId, Selection, SelectionSet};
use crate::SelectionDedup;

/// Closed set of editor notifications the session consumes.
#[derive(Debug, Clone)]
pub enum EditorEvent {
    DocumentChanged {
        document: DocumentId,
    },
    /// `None` when focus moved to something that is not a text document.
    ActiveEditorChanged {
        document: Option<DocumentId>,
    },
    SelectionChanged {
        document: DocumentId,
        selections: SelectionSet,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Recompute,
    Clear,
    Ignore,
}

/// Remembers the last accepted non-empty selection list.
#[derive(Debug, Clone)]
pub struct ChangeTracker {
    dedup: SelectionDedup,
    clear_on_no_editor: bool,
    last: Option<SelectionSet>,
}

impl ChangeTracker {
    pub fn new(dedup: SelectionDedup, clear_on_no_editor: bool) -> Self {
        Self {
            dedup,
            clear_on_no_editor,
            last: None,
        }
    }

    pub fn last_selections(&self) -> Option<&SelectionSet> {
        self.last.as_ref()
    }

    /// Classify `event` given the document the editor currently shows.
    pub fn observe(&mut self, event: &EditorEvent, active: Option<&DocumentId>) -> Decision {
        let decision = match event {
            EditorEvent::DocumentChanged { document } => {
                if active != Some(document) {
                    Decision::Ignore
                } else {
                    self.last = None;
                    Decision::Recompute
                }
            }
            EditorEvent::ActiveEditorChanged { document: Some(_) } => {
                self.last = None;
                Decision::Recompute
            }
            EditorEvent::ActiveEditorChanged { document: None } => {
                self.last = None;
                if self.clear_on_no_editor {
                    Decision::Clear
                } else {
                    Decision::Ignore
                }
            }
            EditorEvent::SelectionChanged {
                document,
                selections,
            } => {
                if active != Some(document) {
                    Decision::Ignore
                } else {
                    self.accept_selections(selections)
                }
            }
        };
        tracing::debug!(?decision, "editor event classified");
        decision
    }

    fn accept_selections(&mut self, selections: &SelectionSet) -> Decision {
        let next = non_empty(selections);
        let unchanged = match (&self.last, &next) {
            (None, None) => true,
            (Some(prev), Some(next)) => match self.dedup {
                SelectionDedup::Identity => Arc::ptr_eq(prev, next),
                SelectionDedup::Structural => prev[..] == next[..],
            },
            _ => false,
        };
        if unchanged {
            return Decision::Ignore;
        }
        self.last = next;
        Decision::Recompute
    }
}

/// Drop carets. The incoming list is reused as-is when nothing was dropped,
/// so a host re-sending the same list keeps its identity.
fn non_empty(selections: &SelectionSet) -> Option<SelectionSet> {
    if selections.is_empty() || selections.iter().all(Selection::is_empty) {
        return None;
    }
    if selections.iter().all(|s| !s.is_empty()) {
        return Some(selections.clone());
    }
    Some(selection_set(
        selections.iter().filter(|s| !s.is_empty()).copied().collect(),
    ))
}
