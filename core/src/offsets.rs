//! Maps spans in the analyzed text back onto document positions.

use crate::editor::{Decoration, Position, TextDocument, TextRange};
use crate::index::DifficultWordMap;

/// Resolve every span in `map` to a document range.
///
/// With an `anchor`, spans are relative to it and are translated forward by
/// character count. Without one they are absolute document offsets. No bounds
/// checks happen here; the document clamps as it sees fit.
pub fn apply(
    map: &DifficultWordMap,
    document: &dyn TextDocument,
    anchor: Option<Position>,
) -> Vec<TextRange> {
    map.spans()
        .map(|(start, end)| match anchor {
            Some(anchor) => TextRange::new(
                document.translate(anchor, start),
                document.translate(anchor, end),
            ),
            None => TextRange::new(document.position_at(start), document.position_at(end)),
        })
        .collect()
}

/// Wrap mapped ranges as hover-annotated decorations.
pub fn decorations(ranges: Vec<TextRange>, hover_message: &str) -> Vec<Decoration> {
    ranges
        .into_iter()
        .map(|range| Decoration {
            range,
            hover_message: hover_message.to_string(),
        })
        .collect()
}
