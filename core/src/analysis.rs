//! Full recompute of difficult words and readability stats for the active
//! document or its selections.

use serde::{Deserialize, Serialize};

use crate::editor::{Editor, Position, Selection, TextDocument};
use crate::error::{FitzError, Result};
use crate::index::{DifficultWordIndex, DifficultWordMap};
use crate::metrics::{Metrics, Readability};
use crate::offsets;
use crate::words::EasyWords;
use crate::Config;

/// Scalar readability stats plus the difficult-word list, in the shape the
/// panel's `refresh` message carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub syllables: usize,
    pub words: usize,
    pub sentences: usize,
    pub grade: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub friendly_grade: Option<String>,
    pub flesch: f64,
    pub flesch_kincaid: f64,
    pub gunning_fog: f64,
    pub smog: f64,
    pub automated_readability: f64,
    pub coleman_liau: f64,
    pub linsear_write: f64,
    pub dale_chall: f64,
    pub difficult_words: Vec<String>,
}

/// Immutable snapshot of one recompute.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    pub stats: Stats,
    pub difficult: DifficultWordMap,
    /// Document position of offset 0 of `text`.
    pub anchor: Position,
    /// True when `text` was assembled from selections.
    pub from_selection: bool,
    pub text: String,
}

/// The text a recompute analyzes and, for selections, where it starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzedText {
    pub text: String,
    pub anchor: Option<Position>,
}

impl AnalyzedText {
    /// Joined non-empty selections in order, or the whole document.
    ///
    /// Only the first selection's start anchors the joined text, so spans in
    /// later selections map relative to that start as well.
    pub fn collect(document: &dyn TextDocument, selections: &[Selection], separator: &str) -> Self {
        let chosen: Vec<&Selection> = selections.iter().filter(|s| !s.is_empty()).collect();
        match chosen.first() {
            Some(first) => Self {
                text: chosen
                    .iter()
                    .map(|s| document.text_in(s.range()))
                    .collect::<Vec<_>>()
                    .join(separator),
                anchor: Some(first.start()),
            },
            None => Self {
                text: document.text().to_string(),
                anchor: None,
            },
        }
    }
}

/// Orchestrates index building, metrics and decoration mapping.
pub struct Coordinator {
    config: Config,
    easy: EasyWords,
    metrics: Box<dyn Metrics + Send + Sync>,
}

impl Coordinator {
    pub fn new(config: Config) -> Self {
        let easy = EasyWords::with_extra(&config.easy_words.extra);
        let metrics =
            Readability::new(easy).with_candidate_threshold(config.thresholds.candidate);
        Self::with_metrics(config, Box::new(metrics))
    }

    /// Metrics must judge easy words from the same `easy_words.extra`.
    pub fn with_metrics(config: Config, metrics: Box<dyn Metrics + Send + Sync>) -> Self {
        let easy = EasyWords::with_extra(&config.easy_words.extra);
        tracing::debug!(easy_words = easy.len(), "coordinator configured");
        Self {
            config,
            easy,
            metrics,
        }
    }

    pub fn index(&self) -> DifficultWordIndex<'_, dyn Metrics + Send + Sync> {
        DifficultWordIndex::new(&self.easy, self.metrics.as_ref())
    }

    /// Stats and index for a piece of text, with no editor involved.
    pub fn analyze_text(&self, text: &str) -> (Stats, DifficultWordMap) {
        let difficult = self.index().build(text, self.config.thresholds.display);
        let m = self.metrics.as_ref();
        let grade = m.text_standard(text);
        let stats = Stats {
            syllables: m.syllable_count(text),
            words: m.lexicon_count(text),
            sentences: m.sentence_count(text),
            grade: grade.level,
            friendly_grade: Some(grade.friendly),
            flesch: m.flesch_reading_ease(text),
            flesch_kincaid: m.flesch_kincaid_grade(text),
            gunning_fog: m.gunning_fog(text),
            smog: m.smog_index(text),
            automated_readability: m.automated_readability_index(text),
            coleman_liau: m.coleman_liau_index(text),
            linsear_write: m.linsear_write_formula(text),
            dale_chall: m.dale_chall_readability_score(text),
            difficult_words: difficult.sorted_descending(),
        };
        (stats, difficult)
    }

    /// Recompute from the editor's current state and replace its decorations.
    #[tracing::instrument(skip_all)]
    pub fn recompute(&self, editor: &mut dyn Editor) -> Result<AnalysisResult> {
        let selections = editor.selections();
        let (result, decorations) = {
            let document = editor
                .active_document()
                .ok_or(FitzError::NoActiveDocument)?;
            let analyzed =
                AnalyzedText::collect(document, &selections, &self.config.selection_separator);
            let (stats, difficult) = self.analyze_text(&analyzed.text);

            let ranges = offsets::apply(&difficult, document, analyzed.anchor);
            let decorations =
                offsets::decorations(ranges, &self.config.panel.decoration_message);

            tracing::debug!(
                document = %document.id(),
                words = stats.words,
                difficult = difficult.len(),
                "recomputed analysis"
            );

            let result = AnalysisResult {
                stats,
                difficult,
                anchor: analyzed.anchor.unwrap_or_default(),
                from_selection: analyzed.anchor.is_some(),
                text: analyzed.text,
            };
            (result, decorations)
        };
        editor.set_decorations(decorations);
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::{MemoryDocument, MemoryEditor};
    use crate::syllables::SyllableCounter;

    fn coordinator() -> Coordinator {
        Coordinator::new(Config::default())
    }

    #[test]
    fn no_document_is_an_error() {
        let mut editor = MemoryEditor::new();
        let err = coordinator().recompute(&mut editor).unwrap_err();
        assert!(matches!(err, FitzError::NoActiveDocument));
        assert_eq!(editor.decoration_updates(), 0);
    }

    #[test]
    fn carets_fall_back_to_whole_document() {
        let doc = MemoryDocument::new("mem://a", "Determination matters.");
        let mut editor = MemoryEditor::with_document(doc);
        let result = coordinator().recompute(&mut editor).unwrap();
        assert_eq!(result.text, "Determination matters.");
        assert!(!result.from_selection);
        assert_eq!(result.anchor, Position::default());
    }

    #[test]
    fn selections_join_with_separator() {
        let doc = MemoryDocument::new("mem://a", "alpha beta\ngamma delta");
        let selections = [
            Selection::new(Position::new(0, 0), Position::new(0, 5)),
            Selection::caret(Position::new(0, 7)),
            Selection::new(Position::new(1, 6), Position::new(1, 11)),
        ];
        let analyzed = AnalyzedText::collect(&doc, &selections, " ");
        assert_eq!(analyzed.text, "alpha delta");
        assert_eq!(analyzed.anchor, Some(Position::new(0, 0)));
    }

    #[test]
    fn stats_list_words_descending() {
        let (stats, map) =
            coordinator().analyze_text("abbreviation and zoology and determination");
        assert_eq!(stats.difficult_words, map.sorted_descending());
        assert_eq!(stats.difficult_words[0], "zoology");
        assert!(stats.friendly_grade.is_some());
    }

    struct Flat;

    impl SyllableCounter for Flat {
        fn syllables(&self, _word: &str) -> usize {
            1
        }
    }

    #[test]
    fn custom_metrics_also_drive_the_index() {
        let metrics = Readability::default().with_counter(Flat);
        let coordinator = Coordinator::with_metrics(Config::default(), Box::new(metrics));
        let (stats, map) = coordinator.analyze_text("Determination and photosynthesis.");
        assert!(map.is_empty());
        assert!(stats.difficult_words.is_empty());
        assert_eq!(stats.syllables, stats.words);
    }

    #[test]
    fn stats_serialize_in_camel_case() {
        let (stats, _) = coordinator().analyze_text("The cat sat.");
        let value = serde_json::to_value(&stats).unwrap();
        assert!(value.get("fleschKincaid").is_some());
        assert!(value.get("automatedReadability").is_some());
        assert!(value.get("difficultWords").unwrap().is_array());
    }
}
