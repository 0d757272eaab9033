//! Position conversion between LSP (UTF-16 columns) and the core (chars).

use fitz_core::{Decoration, Position, Selection};
use serde::{Deserialize, Serialize};
use tower_lsp::lsp_types::{self, Diagnostic, DiagnosticSeverity, NumberOrString, Range};

/// A selection as the client sends it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireSelection {
    pub anchor: lsp_types::Position,
    pub active: lsp_types::Position,
}

fn line_of(text: &str, line: usize) -> &str {
    let line = text.split('\n').nth(line).unwrap_or("");
    line.strip_suffix('\r').unwrap_or(line)
}

pub fn to_core(text: &str, position: lsp_types::Position) -> Position {
    let line = position.line as usize;
    let mut units = 0usize;
    let mut chars = 0usize;
    for c in line_of(text, line).chars() {
        if units >= position.character as usize {
            break;
        }
        units += c.len_utf16();
        chars += 1;
    }
    Position::new(line, chars)
}

pub fn to_lsp(text: &str, position: Position) -> lsp_types::Position {
    let units: usize = line_of(text, position.line)
        .chars()
        .take(position.character)
        .map(char::len_utf16)
        .sum();
    lsp_types::Position::new(position.line as u32, units as u32)
}

pub fn selection(text: &str, wire: &WireSelection) -> Selection {
    Selection::new(to_core(text, wire.anchor), to_core(text, wire.active))
}

pub fn diagnostic(text: &str, decoration: &Decoration) -> Diagnostic {
    Diagnostic {
        range: Range::new(
            to_lsp(text, decoration.range.start),
            to_lsp(text, decoration.range.end),
        ),
        severity: Some(DiagnosticSeverity::INFORMATION),
        code: Some(NumberOrString::String("difficult-word".to_string())),
        source: Some("fitz".to_string()),
        message: decoration.hover_message.clone(),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fitz_core::TextRange;

    const TEXT: &str = "naïve 😀 collaboration\r\nsecond line";

    #[test]
    fn astral_chars_take_two_utf16_units() {
        let lsp = to_lsp(TEXT, Position::new(0, 8));
        assert_eq!(lsp, lsp_types::Position::new(0, 9));
        assert_eq!(to_core(TEXT, lsp), Position::new(0, 8));
    }

    #[test]
    fn columns_past_the_line_clamp_to_its_end() {
        let pos = to_core(TEXT, lsp_types::Position::new(1, 99));
        assert_eq!(pos, Position::new(1, 11));
        assert_eq!(to_core(TEXT, lsp_types::Position::new(0, 99)).character, 21);
    }

    #[test]
    fn decorations_become_information_diagnostics() {
        let decoration = Decoration {
            range: TextRange::new(Position::new(0, 8), Position::new(0, 21)),
            hover_message: "Difficult word!".into(),
        };
        let diag = diagnostic(TEXT, &decoration);
        assert_eq!(diag.severity, Some(DiagnosticSeverity::INFORMATION));
        assert_eq!(diag.range.start.character, 9);
        assert_eq!(diag.range.end.character, 22);
        assert_eq!(diag.message, "Difficult word!");
    }
}
