//! Editor-side abstractions: documents, positions, selections, decorations.
//!
//! Hosts (the language server, the CLI, tests) implement [`Editor`]; the
//! engine never talks to a concrete editor directly.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Zero-based line / character position. Characters are Unicode scalar values.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Position {
    pub line: usize,
    pub character: usize,
}

impl Position {
    pub fn new(line: usize, character: usize) -> Self {
        Self { line, character }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextRange {
    pub start: Position,
    pub end: Position,
}

impl TextRange {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// A selection runs from `anchor` to `active`; either may come first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selection {
    pub anchor: Position,
    pub active: Position,
}

impl Selection {
    pub fn new(anchor: Position, active: Position) -> Self {
        Self { anchor, active }
    }

    /// A bare cursor.
    pub fn caret(at: Position) -> Self {
        Self::new(at, at)
    }

    pub fn start(&self) -> Position {
        self.anchor.min(self.active)
    }

    pub fn end(&self) -> Position {
        self.anchor.max(self.active)
    }

    pub fn range(&self) -> TextRange {
        TextRange::new(self.start(), self.end())
    }

    pub fn is_empty(&self) -> bool {
        self.anchor == self.active
    }
}

/// Selection lists are shared so that change tracking can compare them by
/// identity as well as by content.
pub type SelectionSet = Arc<[Selection]>;

pub fn selection_set(selections: Vec<Selection>) -> SelectionSet {
    Arc::from(selections)
}

/// Stable identifier of a document, usually its URI.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentId(pub String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Read access to an open document.
pub trait TextDocument {
    fn id(&self) -> &DocumentId;
    fn text(&self) -> &str;
    fn text_in(&self, range: TextRange) -> String;
    fn position_at(&self, offset: usize) -> Position;
    fn offset_at(&self, position: Position) -> usize;

    /// Move `position` forward by `delta` characters, continuing onto
    /// following lines as needed.
    fn translate(&self, position: Position, delta: usize) -> Position {
        self.position_at(self.offset_at(position) + delta)
    }
}

/// Highlight pushed to the editor for one difficult-word occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decoration {
    pub range: TextRange,
    pub hover_message: String,
}

pub trait Editor {
    fn active_document(&self) -> Option<&dyn TextDocument>;
    fn selections(&self) -> SelectionSet;
    /// Replace every decoration from the previous call.
    fn set_decorations(&mut self, decorations: Vec<Decoration>);
}

/// Line-indexed in-memory document.
#[derive(Debug, Clone)]
pub struct MemoryDocument {
    id: DocumentId,
    text: String,
    /// Char offset at which each line begins.
    line_starts: Vec<usize>,
    /// Byte offset of every char, plus one trailing entry for `text.len()`.
    byte_offsets: Vec<usize>,
}

impl MemoryDocument {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        let mut doc = Self {
            id: DocumentId::new(id),
            text: String::new(),
            line_starts: Vec::new(),
            byte_offsets: Vec::new(),
        };
        doc.set_text(text);
        doc
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.line_starts = vec![0];
        self.byte_offsets.clear();
        for (idx, (byte, ch)) in self.text.char_indices().enumerate() {
            self.byte_offsets.push(byte);
            if ch == '\n' {
                self.line_starts.push(idx + 1);
            }
        }
        self.byte_offsets.push(self.text.len());
    }

    pub fn char_len(&self) -> usize {
        self.byte_offsets.len() - 1
    }

    fn line_end(&self, line: usize) -> usize {
        match self.line_starts.get(line + 1) {
            Some(next) => next - 1,
            None => self.char_len(),
        }
    }
}

impl TextDocument for MemoryDocument {
    fn id(&self) -> &DocumentId {
        &self.id
    }

    fn text(&self) -> &str {
        &self.text
    }

    fn text_in(&self, range: TextRange) -> String {
        let start = self.offset_at(range.start);
        let end = self.offset_at(range.end).max(start);
        self.text[self.byte_offsets[start]..self.byte_offsets[end]].to_string()
    }

    /// Offsets past the end clamp to the end of the document.
    fn position_at(&self, offset: usize) -> Position {
        let offset = offset.min(self.char_len());
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        Position::new(line, offset - self.line_starts[line])
    }

    /// Positions past a line end clamp to that line end.
    fn offset_at(&self, position: Position) -> usize {
        let Some(&line_start) = self.line_starts.get(position.line) else {
            return self.char_len();
        };
        (line_start + position.character).min(self.line_end(position.line))
    }
}

/// Single-document editor used by batch front ends and tests.
#[derive(Debug, Clone)]
pub struct MemoryEditor {
    document: Option<MemoryDocument>,
    selections: SelectionSet,
    decorations: Vec<Decoration>,
    decoration_updates: usize,
}

impl Default for MemoryEditor {
    fn default() -> Self {
        Self {
            document: None,
            selections: selection_set(Vec::new()),
            decorations: Vec::new(),
            decoration_updates: 0,
        }
    }
}

impl MemoryEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(document: MemoryDocument) -> Self {
        let mut editor = Self::new();
        editor.open(document);
        editor
    }

    /// Make `document` the active one, resetting selections to a caret at 0.
    pub fn open(&mut self, document: MemoryDocument) {
        self.document = Some(document);
        self.selections = selection_set(vec![Selection::caret(Position::default())]);
    }

    pub fn close(&mut self) {
        self.document = None;
        self.selections = selection_set(Vec::new());
    }

    pub fn document_mut(&mut self) -> Option<&mut MemoryDocument> {
        self.document.as_mut()
    }

    /// Install a fresh selection list and hand back the shared handle.
    pub fn select(&mut self, selections: Vec<Selection>) -> SelectionSet {
        self.selections = selection_set(selections);
        self.selections.clone()
    }

    pub fn decorations(&self) -> &[Decoration] {
        &self.decorations
    }

    pub fn decoration_updates(&self) -> usize {
        self.decoration_updates
    }
}

impl Editor for MemoryEditor {
    fn active_document(&self) -> Option<&dyn TextDocument> {
        self.document.as_ref().map(|d| d as &dyn TextDocument)
    }

    fn selections(&self) -> SelectionSet {
        self.selections.clone()
    }

    fn set_decorations(&mut self, decorations: Vec<Decoration>) {
        self.decorations = decorations;
        self.decoration_updates += 1;
    }
}
