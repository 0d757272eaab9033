//! Fitzgerald core engine.
//! Finds "difficult" words and readability stats in a document, and keeps
//! editor highlights and a stats panel in step with a live editor.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

pub mod analysis;
pub mod display;
pub mod editor;
pub mod error;
pub mod index;
pub mod inflect;
pub mod metrics;
pub mod normalize;
pub mod offsets;
pub mod session;
pub mod syllables;
pub mod tracker;
pub mod words;

pub use analysis::{AnalysisResult, AnalyzedText, Coordinator, Stats};
pub use display::{
    DisplaySync, DisplayUpdate, FieldSchema, Panel, PanelEvent, PanelHost, PanelMessage,
    PanelOptions, StatField,
};
pub use editor::{
    Decoration, DocumentId, Editor, MemoryDocument, MemoryEditor, Position, Selection,
    SelectionSet, TextDocument, TextRange,
};
pub use error::{FitzError, Result};
pub use index::{DifficultWordIndex, DifficultWordMap, Span};
pub use metrics::{Grade, Metrics, Readability};
pub use session::{Outcome, Session};
pub use tracker::{ChangeTracker, Decision, EditorEvent};
pub use words::{EasyWords, Token};

/// Default config file name looked up next to the workspace root.
pub const DEFAULT_CONFIG_FILE: &str = "fitz.yml";

/// Syllable thresholds for the two classification paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Highlighted index shown in the editor and panel.
    pub display: usize,
    /// Candidate set feeding Dale-Chall and Gunning Fog.
    pub candidate: usize,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            display: index::DISPLAY_THRESHOLD,
            candidate: index::CANDIDATE_THRESHOLD,
        }
    }
}

/// How a new selection list is compared with the last accepted one.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionDedup {
    /// Same shared list only. Freshly built lists always count as changed.
    #[default]
    Identity,
    /// Same selections in the same order.
    Structural,
}

/// User additions to the built-in easy-word dictionary.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EasyWordConfig {
    pub extra: Vec<String>,
}

/// Panel presentation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    pub title: String,
    pub view_type: String,
    /// Directory under the host's base location holding panel assets.
    pub media_dir: String,
    pub error_message: String,
    pub decoration_message: String,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            title: "Fitzgerald".into(),
            view_type: "fitz".into(),
            media_dir: "media".into(),
            error_message: "Could not calculate statistics".into(),
            decoration_message: "Difficult word!".into(),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub thresholds: Thresholds,
    pub selection_separator: String,
    pub selection_dedup: SelectionDedup,
    /// Blank the panel when focus moves to something that is not a document.
    pub clear_on_no_editor: bool,
    pub easy_words: EasyWordConfig,
    pub panel: PanelConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            selection_separator: " ".into(),
            selection_dedup: SelectionDedup::Identity,
            clear_on_no_editor: false,
            easy_words: EasyWordConfig::default(),
            panel: PanelConfig::default(),
        }
    }
}

impl Config {
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).map_err(|e| FitzError::Config(e.to_string()))
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
            .map_err(|e| FitzError::Config(format!("{}: {e}", path.display())))
    }

    /// Load `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::from_yaml_file(path)
        } else {
            Ok(Self::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_display_and_candidate_paths() {
        let cfg = Config::default();
        assert_eq!(cfg.thresholds.display, 3);
        assert_eq!(cfg.thresholds.candidate, 2);
        assert_eq!(cfg.selection_separator, " ");
        assert_eq!(cfg.selection_dedup, SelectionDedup::Identity);
        assert!(!cfg.clear_on_no_editor);
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let cfg = Config::from_yaml_str(
            "thresholds:\n  display: 4\nselection_dedup: structural\neasy_words:\n  extra: [Rust]\n",
        )
        .unwrap();
        assert_eq!(cfg.thresholds.display, 4);
        assert_eq!(cfg.thresholds.candidate, 2);
        assert_eq!(cfg.selection_dedup, SelectionDedup::Structural);
        assert_eq!(cfg.easy_words.extra, vec!["Rust".to_string()]);
        assert_eq!(cfg.panel.title, "Fitzgerald");
    }

    #[test]
    fn invalid_yaml_is_a_config_error() {
        let err = Config::from_yaml_str("thresholds: [nope").unwrap_err();
        assert!(matches!(err, FitzError::Config(_)));
    }

    #[test]
    fn missing_file_loads_defaults() {
        let cfg = Config::load_or_default(Path::new("/definitely/not/here/fitz.yml")).unwrap();
        assert_eq!(cfg.panel.view_type, "fitz");
    }
}
