//! Open documents, editor focus, and routing of editor triggers into the
//! highlight session.

use dashmap::DashMap;
use fitz_core::editor::selection_set;
use fitz_core::{
    DocumentId, Editor, EditorEvent, MemoryDocument, MemoryEditor, Outcome, PanelHost, Selection,
    Session,
};
use tower_lsp::lsp_types::{Diagnostic, Url};

use crate::convert::{self, WireSelection};

/// Document state cached by the server.
struct OpenDocument {
    content: String,
    version: i32,
    selections: Vec<Selection>,
}

/// What prompted a pass through the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    Edited(Url),
    Focused(Option<Url>),
    Selected(Url),
    /// Explicit "show stats" request; always recomputes.
    Refresh,
}

/// Every document the client has open, keyed by URI.
#[derive(Default)]
pub struct Documents {
    docs: DashMap<Url, OpenDocument>,
}

impl Documents {
    pub fn open(&self, uri: Url, content: String, version: i32) {
        self.docs.insert(
            uri,
            OpenDocument {
                content,
                version,
                selections: Vec::new(),
            },
        );
    }

    /// Replace the full text. Returns false for documents that are not open.
    pub fn change(&self, uri: &Url, content: String, version: i32) -> bool {
        let Some(mut doc) = self.docs.get_mut(uri) else {
            return false;
        };
        doc.content = content;
        doc.version = version;
        true
    }

    /// Store client selections in character columns.
    pub fn select(&self, uri: &Url, wire: &[WireSelection]) -> bool {
        let Some(mut doc) = self.docs.get_mut(uri) else {
            return false;
        };
        let selections = wire
            .iter()
            .map(|w| convert::selection(&doc.content, w))
            .collect();
        doc.selections = selections;
        true
    }

    pub fn close(&self, uri: &Url) {
        self.docs.remove(uri);
    }

    pub fn contains(&self, uri: &Url) -> bool {
        self.docs.contains_key(uri)
    }

    fn stored_selections(&self, uri: &Url) -> Vec<Selection> {
        self.docs
            .get(uri)
            .map(|doc| doc.selections.clone())
            .unwrap_or_default()
    }

    /// Editor view of `active`; text, version and selections come from one read.
    pub fn snapshot(&self, active: Option<&Url>) -> Snapshot {
        let mut editor = MemoryEditor::new();
        let mut version = None;
        if let Some(uri) = active {
            if let Some(doc) = self.docs.get(uri) {
                editor.open(MemoryDocument::new(uri.as_str(), doc.content.clone()));
                if !doc.selections.is_empty() {
                    editor.select(doc.selections.clone());
                }
                version = Some(doc.version);
            }
        }
        Snapshot {
            uri: active.cloned(),
            version,
            editor,
        }
    }
}

/// Which document the editor is showing.
#[derive(Debug, Default)]
pub struct Focus {
    active: Option<Url>,
}

impl Focus {
    pub fn active(&self) -> Option<&Url> {
        self.active.as_ref()
    }

    /// Until the client reports focus, the last opened document is active.
    pub fn opened(&mut self, uri: &Url) -> Trigger {
        self.active = Some(uri.clone());
        Trigger::Focused(Some(uri.clone()))
    }

    /// Closing the active document counts as leaving the editor.
    pub fn closed(&mut self, uri: &Url) -> Option<Trigger> {
        if self.active.as_ref() != Some(uri) {
            return None;
        }
        self.active = None;
        Some(Trigger::Focused(None))
    }

    /// Focus reported by the client; unknown documents count as no editor.
    pub fn focus(&mut self, uri: Option<Url>, documents: &Documents) -> Trigger {
        self.active = uri.filter(|uri| documents.contains(uri));
        Trigger::Focused(self.active.clone())
    }
}

pub struct Snapshot {
    pub uri: Option<Url>,
    pub version: Option<i32>,
    pub editor: MemoryEditor,
}

pub fn event_for(
    trigger: &Trigger,
    snapshot: &Snapshot,
    documents: &Documents,
) -> Option<EditorEvent> {
    let event = match trigger {
        Trigger::Edited(uri) => EditorEvent::DocumentChanged {
            document: DocumentId::new(uri.as_str()),
        },
        Trigger::Focused(uri) => EditorEvent::ActiveEditorChanged {
            document: uri.as_ref().map(|u| DocumentId::new(u.as_str())),
        },
        Trigger::Selected(uri) => {
            // The active editor already holds this list; reuse its handle.
            let selections = if snapshot.uri.as_ref() == Some(uri) {
                snapshot.editor.selections()
            } else {
                selection_set(documents.stored_selections(uri))
            };
            EditorEvent::SelectionChanged {
                document: DocumentId::new(uri.as_str()),
                selections,
            }
        }
        Trigger::Refresh => return None,
    };
    Some(event)
}

/// Diagnostics for one document at the version they were computed from.
#[derive(Debug)]
pub struct Publish {
    pub uri: Url,
    pub version: Option<i32>,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug)]
pub struct Pass {
    pub outcome: Outcome,
    pub publish: Option<Publish>,
}

/// Session and focus, guarded together so a pass sees one consistent state.
pub struct State<H: PanelHost> {
    pub session: Session<H>,
    pub focus: Focus,
}

impl<H: PanelHost> State<H> {
    pub fn new(session: Session<H>) -> Self {
        Self {
            session,
            focus: Focus::default(),
        }
    }

    pub fn pass(&mut self, trigger: &Trigger, documents: &Documents) -> Pass {
        let mut snapshot = documents.snapshot(self.focus.active());
        let event = event_for(trigger, &snapshot, documents);
        let outcome = match &event {
            Some(event) => self.session.handle(event, &mut snapshot.editor),
            None => self.session.refresh(&mut snapshot.editor),
        };

        let editor = &snapshot.editor;
        let diagnostics: Option<Vec<Diagnostic>> = match editor.active_document() {
            Some(doc) if editor.decoration_updates() > 0 => Some(
                editor
                    .decorations()
                    .iter()
                    .map(|d| convert::diagnostic(doc.text(), d))
                    .collect(),
            ),
            _ => None,
        };
        let publish = match (snapshot.uri, diagnostics) {
            (Some(uri), Some(diagnostics)) => Some(Publish {
                uri,
                version: snapshot.version,
                diagnostics,
            }),
            _ => None,
        };
        Pass { outcome, publish }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use fitz_core::{Config, Position};
    use tower_lsp::lsp_types;

    use super::*;
    use crate::host::ClientHost;

    const TEXT: &str = "Our determination held.";

    fn url(name: &str) -> Url {
        Url::parse(&format!("file:///notes/{name}.md")).unwrap()
    }

    fn state_with(config: Config) -> State<ClientHost> {
        let host = ClientHost {
            base: Some("file:///ext".into()),
            ..ClientHost::default()
        };
        State::new(Session::new(config, host))
    }

    fn state() -> State<ClientHost> {
        state_with(Config::default())
    }

    fn word_selection() -> WireSelection {
        WireSelection {
            anchor: lsp_types::Position::new(0, 4),
            active: lsp_types::Position::new(0, 17),
        }
    }

    #[test]
    fn last_opened_document_is_active() {
        let docs = Documents::default();
        let mut state = state();
        docs.open(url("a"), TEXT.into(), 1);
        state.focus.opened(&url("a"));
        docs.open(url("b"), TEXT.into(), 3);
        let trigger = state.focus.opened(&url("b"));
        assert_eq!(state.focus.active(), Some(&url("b")));

        let pass = state.pass(&trigger, &docs);
        assert!(matches!(pass.outcome, Outcome::Refreshed(_)));
        let publish = pass.publish.unwrap();
        assert_eq!(publish.uri, url("b"));
        assert_eq!(publish.version, Some(3));
        assert_eq!(publish.diagnostics.len(), 1);
    }

    #[test]
    fn closing_the_active_document_leaves_the_editor() {
        let docs = Documents::default();
        let mut state = state();
        docs.open(url("a"), TEXT.into(), 1);
        let opened = state.focus.opened(&url("a"));
        state.pass(&opened, &docs);

        assert_eq!(state.focus.closed(&url("other")), None);
        docs.close(&url("a"));
        let trigger = state.focus.closed(&url("a")).unwrap();
        assert_eq!(trigger, Trigger::Focused(None));
        assert_eq!(state.focus.active(), None);
        let pass = state.pass(&trigger, &docs);
        assert_eq!(pass.outcome, Outcome::Skipped);
        assert!(pass.publish.is_none());

        let mut config = Config::default();
        config.clear_on_no_editor = true;
        let mut clearing = state_with(config);
        docs.open(url("a"), TEXT.into(), 2);
        let opened = clearing.focus.opened(&url("a"));
        clearing.pass(&opened, &docs);
        docs.close(&url("a"));
        let trigger = clearing.focus.closed(&url("a")).unwrap();
        assert_eq!(clearing.pass(&trigger, &docs).outcome, Outcome::Cleared);
    }

    #[test]
    fn selections_in_an_inactive_document_are_ignored() {
        let docs = Documents::default();
        let mut state = state();
        docs.open(url("a"), TEXT.into(), 1);
        docs.open(url("b"), TEXT.into(), 1);
        state.focus.opened(&url("b"));
        assert!(docs.select(&url("a"), &[word_selection()]));

        let trigger = Trigger::Selected(url("a"));
        let snapshot = docs.snapshot(state.focus.active());
        match event_for(&trigger, &snapshot, &docs) {
            Some(EditorEvent::SelectionChanged {
                document,
                selections,
            }) => {
                assert_eq!(document, DocumentId::new(url("a").as_str()));
                assert_eq!(
                    selections[..],
                    [Selection::new(Position::new(0, 4), Position::new(0, 17))]
                );
            }
            other => panic!("expected a selection event, got {other:?}"),
        }

        let pass = state.pass(&trigger, &docs);
        assert_eq!(pass.outcome, Outcome::Skipped);
        assert!(pass.publish.is_none());
    }

    #[test]
    fn active_selection_events_share_the_editor_list() {
        let docs = Documents::default();
        let mut state = state();
        docs.open(url("a"), TEXT.into(), 1);
        state.focus.opened(&url("a"));
        docs.select(&url("a"), &[word_selection()]);

        let trigger = Trigger::Selected(url("a"));
        let snapshot = docs.snapshot(state.focus.active());
        let Some(EditorEvent::SelectionChanged { selections, .. }) =
            event_for(&trigger, &snapshot, &docs)
        else {
            panic!("expected a selection event");
        };
        assert!(Arc::ptr_eq(&selections, &snapshot.editor.selections()));

        match state.pass(&trigger, &docs).outcome {
            Outcome::Refreshed(result) => assert_eq!(result.text, "determination"),
            other => panic!("expected a refresh, got {other:?}"),
        }
    }

    #[test]
    fn diagnostics_carry_the_version_they_were_computed_from() {
        let docs = Documents::default();
        let mut state = state();
        docs.open(url("a"), "Plain words.".into(), 1);
        state.focus.opened(&url("a"));
        assert!(docs.change(&url("a"), TEXT.into(), 7));
        assert!(!docs.change(&url("missing"), TEXT.into(), 1));

        let pass = state.pass(&Trigger::Edited(url("a")), &docs);
        let publish = pass.publish.unwrap();
        assert_eq!(publish.version, Some(7));
        assert_eq!(publish.diagnostics[0].range.start.character, 4);
    }

    #[test]
    fn focus_on_unknown_documents_counts_as_no_editor() {
        let docs = Documents::default();
        let mut state = state();
        let trigger = state.focus.focus(Some(url("ghost")), &docs);
        assert_eq!(trigger, Trigger::Focused(None));
        assert_eq!(state.focus.active(), None);
    }
}
