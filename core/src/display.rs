//! Stats panel ownership and the message protocol pushed to it.
//!
//! One panel per session. It is created lazily on the first update and only
//! revealed then, so later refreshes never pull focus away from the editor.

use serde::{Deserialize, Serialize};

use crate::analysis::{AnalysisResult, Stats};
use crate::error::{FitzError, Result};
use crate::PanelConfig;

/// Outbound panel messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum PanelMessage {
    Refresh { stats: Stats },
    Error { message: String },
    Clear,
}

/// Inbound panel messages. Purely observational.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum PanelEvent {
    WordActivated { word: String },
}

/// Every field a `refresh` can update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StatField {
    Syllables,
    Words,
    Sentences,
    Grade,
    FriendlyGrade,
    Flesch,
    FleschKincaid,
    GunningFog,
    Smog,
    AutomatedReadability,
    ColemanLiau,
    LinsearWrite,
    DaleChall,
    DifficultWords,
}

impl StatField {
    pub const ALL: [StatField; 14] = [
        StatField::Syllables,
        StatField::Words,
        StatField::Sentences,
        StatField::Grade,
        StatField::FriendlyGrade,
        StatField::Flesch,
        StatField::FleschKincaid,
        StatField::GunningFog,
        StatField::Smog,
        StatField::AutomatedReadability,
        StatField::ColemanLiau,
        StatField::LinsearWrite,
        StatField::DaleChall,
        StatField::DifficultWords,
    ];

    pub fn key(self) -> &'static str {
        match self {
            StatField::Syllables => "syllables",
            StatField::Words => "words",
            StatField::Sentences => "sentences",
            StatField::Grade => "grade",
            StatField::FriendlyGrade => "friendlyGrade",
            StatField::Flesch => "flesch",
            StatField::FleschKincaid => "fleschKincaid",
            StatField::GunningFog => "gunningFog",
            StatField::Smog => "smog",
            StatField::AutomatedReadability => "automatedReadability",
            StatField::ColemanLiau => "colemanLiau",
            StatField::LinsearWrite => "linsearWrite",
            StatField::DaleChall => "daleChall",
            StatField::DifficultWords => "difficultWords",
        }
    }

    /// Display text for this field of `stats`, `None` if the stats lack it.
    pub fn render(self, stats: &Stats) -> Option<String> {
        let text = match self {
            StatField::Syllables => stats.syllables.to_string(),
            StatField::Words => stats.words.to_string(),
            StatField::Sentences => stats.sentences.to_string(),
            StatField::Grade => stats.grade.to_string(),
            StatField::FriendlyGrade => stats.friendly_grade.clone()?,
            StatField::Flesch => stats.flesch.to_string(),
            StatField::FleschKincaid => stats.flesch_kincaid.to_string(),
            StatField::GunningFog => stats.gunning_fog.to_string(),
            StatField::Smog => stats.smog.to_string(),
            StatField::AutomatedReadability => stats.automated_readability.to_string(),
            StatField::ColemanLiau => stats.coleman_liau.to_string(),
            StatField::LinsearWrite => stats.linsear_write.to_string(),
            StatField::DaleChall => stats.dale_chall.to_string(),
            StatField::DifficultWords => stats.difficult_words.join(", "),
        };
        Some(text)
    }
}

/// Which stat fields a panel can show, resolved once when it is created.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSchema {
    pub present: Vec<StatField>,
    pub missing: Vec<StatField>,
}

impl FieldSchema {
    pub fn validate(panel: &dyn Panel) -> Self {
        let (present, missing): (Vec<StatField>, Vec<StatField>) = StatField::ALL
            .into_iter()
            .partition(|field| panel.has_field(*field));
        Self { present, missing }
    }

    pub fn lookup_misses(&self) -> impl Iterator<Item = FitzError> + '_ {
        self.missing.iter().map(|field| FitzError::LookupMiss {
            field: field.key().to_string(),
        })
    }

    /// Values for every present field; absent ones are left untouched.
    pub fn render(&self, stats: &Stats) -> Vec<(StatField, String)> {
        self.present
            .iter()
            .filter_map(|field| field.render(stats).map(|text| (*field, text)))
            .collect()
    }
}

/// Everything a host needs to create the panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelOptions {
    pub view_type: String,
    pub title: String,
    /// Directory the panel may load local resources from.
    pub resource_root: String,
}

pub trait Panel {
    fn post_message(&mut self, message: &PanelMessage);
    fn reveal(&mut self);

    fn has_field(&self, _field: StatField) -> bool {
        true
    }
}

/// Creates the panel and supplies the base resource location for it.
pub trait PanelHost {
    type Panel: Panel;

    fn base_location(&self) -> Option<String>;
    fn create_panel(&mut self, options: &PanelOptions) -> Self::Panel;
}

/// What a single `show` call pushes.
#[derive(Debug, Clone, Copy)]
pub enum DisplayUpdate<'a> {
    Result(&'a AnalysisResult),
    Error,
    Clear,
}

pub struct DisplaySync<H: PanelHost> {
    host: H,
    config: PanelConfig,
    panel: Option<H::Panel>,
    schema: FieldSchema,
}

impl<H: PanelHost> DisplaySync<H> {
    pub fn new(host: H, config: PanelConfig) -> Self {
        Self {
            host,
            config,
            panel: None,
            schema: FieldSchema::default(),
        }
    }

    /// Messages and panel options for later updates.
    pub fn set_config(&mut self, config: PanelConfig) {
        self.config = config;
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn panel(&self) -> Option<&H::Panel> {
        self.panel.as_ref()
    }

    pub fn schema(&self) -> &FieldSchema {
        &self.schema
    }

    pub fn is_open(&self) -> bool {
        self.panel.is_some()
    }

    /// Push one message, creating (and revealing) the panel on first use.
    ///
    /// `Clear` never creates a panel; blanking a panel nobody has seen is a no-op.
    pub fn show(&mut self, update: DisplayUpdate<'_>) -> Result<()> {
        if matches!(update, DisplayUpdate::Clear) && self.panel.is_none() {
            return Ok(());
        }
        let message = match update {
            DisplayUpdate::Result(result) => PanelMessage::Refresh {
                stats: result.stats.clone(),
            },
            DisplayUpdate::Error => PanelMessage::Error {
                message: self.config.error_message.clone(),
            },
            DisplayUpdate::Clear => PanelMessage::Clear,
        };
        let created = self.ensure_panel()?;
        let Some(panel) = self.panel.as_mut() else {
            return Ok(());
        };
        panel.post_message(&message);
        if created {
            panel.reveal();
        }
        Ok(())
    }

    /// Handle a message coming back from the panel.
    pub fn receive(&self, event: &PanelEvent) {
        match event {
            PanelEvent::WordActivated { word } => {
                tracing::info!(word = %word, "difficult word activated in panel");
            }
        }
    }

    /// Returns whether the panel was created by this call.
    fn ensure_panel(&mut self) -> Result<bool> {
        if self.panel.is_some() {
            return Ok(false);
        }
        let base = self
            .host
            .base_location()
            .ok_or(FitzError::MissingHostContext)?;
        let options = PanelOptions {
            view_type: self.config.view_type.clone(),
            title: self.config.title.clone(),
            resource_root: join_location(&base, &self.config.media_dir),
        };
        let panel = self.host.create_panel(&options);
        self.schema = FieldSchema::validate(&panel);
        for miss in self.schema.lookup_misses() {
            tracing::warn!("{miss}");
        }
        self.panel = Some(panel);
        Ok(true)
    }
}

fn join_location(base: &str, child: &str) -> String {
    if child.is_empty() {
        return base.to_string();
    }
    format!("{}/{}", base.trim_end_matches('/'), child.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[derive(Default)]
    struct RecordingPanel {
        messages: Vec<PanelMessage>,
        reveals: usize,
        hidden: HashSet<StatField>,
    }

    impl Panel for RecordingPanel {
        fn post_message(&mut self, message: &PanelMessage) {
            self.messages.push(message.clone());
        }

        fn reveal(&mut self) {
            self.reveals += 1;
        }

        fn has_field(&self, field: StatField) -> bool {
            !self.hidden.contains(&field)
        }
    }

    struct Host {
        base: Option<String>,
        created: Vec<PanelOptions>,
        hidden: HashSet<StatField>,
    }

    impl PanelHost for Host {
        type Panel = RecordingPanel;

        fn base_location(&self) -> Option<String> {
            self.base.clone()
        }

        fn create_panel(&mut self, options: &PanelOptions) -> RecordingPanel {
            self.created.push(options.clone());
            RecordingPanel {
                hidden: self.hidden.clone(),
                ..RecordingPanel::default()
            }
        }
    }

    fn display(base: Option<&str>) -> DisplaySync<Host> {
        let host = Host {
            base: base.map(str::to_string),
            created: Vec::new(),
            hidden: HashSet::new(),
        };
        DisplaySync::new(host, PanelConfig::default())
    }

    #[test]
    fn reveals_only_on_creation() {
        let mut sync = display(Some("file:///ext"));
        sync.show(DisplayUpdate::Error).unwrap();
        sync.show(DisplayUpdate::Error).unwrap();
        sync.show(DisplayUpdate::Error).unwrap();
        let panel = sync.panel().unwrap();
        assert_eq!(panel.reveals, 1);
        assert_eq!(panel.messages.len(), 3);
        assert_eq!(sync.host().created.len(), 1);
        assert_eq!(sync.host().created[0].resource_root, "file:///ext/media");
    }

    #[test]
    fn error_message_uses_fallback_text() {
        let mut sync = display(Some("file:///ext"));
        sync.show(DisplayUpdate::Error).unwrap();
        assert_eq!(
            sync.panel().unwrap().messages[0],
            PanelMessage::Error {
                message: "Could not calculate statistics".into()
            }
        );
    }

    #[test]
    fn missing_base_location_drops_the_request() {
        let mut sync = display(None);
        let err = sync.show(DisplayUpdate::Error).unwrap_err();
        assert!(matches!(err, FitzError::MissingHostContext));
        assert!(!sync.is_open());

        sync.host_mut().base = Some("file:///ext".into());
        sync.show(DisplayUpdate::Error).unwrap();
        assert_eq!(sync.panel().unwrap().reveals, 1);
    }

    #[test]
    fn clear_without_panel_is_a_no_op() {
        let mut sync = display(Some("file:///ext"));
        sync.show(DisplayUpdate::Clear).unwrap();
        assert!(!sync.is_open());
        sync.show(DisplayUpdate::Error).unwrap();
        sync.show(DisplayUpdate::Clear).unwrap();
        assert_eq!(sync.panel().unwrap().messages[1], PanelMessage::Clear);
    }

    #[test]
    fn schema_reports_missing_fields_once() {
        let mut sync = display(Some("file:///ext"));
        sync.host_mut().hidden.insert(StatField::Smog);
        sync.show(DisplayUpdate::Error).unwrap();
        assert_eq!(sync.schema().missing, vec![StatField::Smog]);
        assert_eq!(sync.schema().present.len(), StatField::ALL.len() - 1);
        let misses: Vec<String> = sync.schema().lookup_misses().map(|e| e.to_string()).collect();
        assert_eq!(misses, vec!["panel has no view for stat `smog`".to_string()]);
    }

    #[test]
    fn messages_serialize_with_command_tag() {
        let clear = serde_json::to_value(PanelMessage::Clear).unwrap();
        assert_eq!(clear, serde_json::json!({"command": "clear"}));
        let error = serde_json::to_value(PanelMessage::Error {
            message: "x".into(),
        })
        .unwrap();
        assert_eq!(error, serde_json::json!({"command": "error", "message": "x"}));
        let event: PanelEvent =
            serde_json::from_str(r#"{"command":"wordActivated","word":"zoology"}"#).unwrap();
        assert_eq!(
            event,
            PanelEvent::WordActivated {
                word: "zoology".into()
            }
        );
    }

    #[test]
    fn field_keys_match_serialized_stats() {
        for field in StatField::ALL {
            let json = serde_json::to_value(field).unwrap();
            assert_eq!(json, serde_json::Value::String(field.key().to_string()));
        }
    }
}
