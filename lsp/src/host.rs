//! Panel host backed by client notifications.
//!
//! The core pushes panel traffic synchronously while the session lock is
//! held; it is queued here and sent once the lock is released.

use std::sync::{Arc, Mutex};

use fitz_core::{Panel, PanelHost, PanelMessage, PanelOptions};
use serde::{Deserialize, Serialize};
use tower_lsp::lsp_types::notification::Notification;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePanelParams {
    pub view_type: String,
    pub title: String,
    pub base_uri: String,
    pub resource_root: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelParams {
    #[serde(flatten)]
    pub message: PanelMessage,
    pub reveal: bool,
}

pub enum CreatePanel {}

impl Notification for CreatePanel {
    type Params = CreatePanelParams;
    const METHOD: &'static str = "fitz/createPanel";
}

pub enum PanelUpdate {}

impl Notification for PanelUpdate {
    type Params = PanelParams;
    const METHOD: &'static str = "fitz/panel";
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outgoing {
    Create(CreatePanelParams),
    Panel(PanelParams),
}

#[derive(Debug, Clone, Default)]
pub struct Outbox(Arc<Mutex<Vec<Outgoing>>>);

impl Outbox {
    fn push(&self, item: Outgoing) {
        if let Ok(mut queue) = self.0.lock() {
            queue.push(item);
        }
    }

    fn mark_revealed(&self) {
        if let Ok(mut queue) = self.0.lock() {
            if let Some(Outgoing::Panel(params)) = queue.last_mut() {
                params.reveal = true;
            }
        }
    }

    pub fn drain(&self) -> Vec<Outgoing> {
        self.0
            .lock()
            .map(|mut queue| std::mem::take(&mut *queue))
            .unwrap_or_default()
    }
}

pub struct ClientPanel {
    outbox: Outbox,
}

impl Panel for ClientPanel {
    fn post_message(&mut self, message: &PanelMessage) {
        self.outbox.push(Outgoing::Panel(PanelParams {
            message: message.clone(),
            reveal: false,
        }));
    }

    // Always follows the first post, so it flags that message.
    fn reveal(&mut self) {
        self.outbox.mark_revealed();
    }
}

#[derive(Debug, Clone, Default)]
pub struct ClientHost {
    /// The `extensionUri` the client sent on initialize.
    pub base: Option<String>,
    pub outbox: Outbox,
}

impl PanelHost for ClientHost {
    type Panel = ClientPanel;

    fn base_location(&self) -> Option<String> {
        self.base.clone()
    }

    fn create_panel(&mut self, options: &PanelOptions) -> ClientPanel {
        self.outbox.push(Outgoing::Create(CreatePanelParams {
            view_type: options.view_type.clone(),
            title: options.title.clone(),
            base_uri: self.base.clone().unwrap_or_default(),
            resource_root: options.resource_root.clone(),
        }));
        ClientPanel {
            outbox: self.outbox.clone(),
        }
    }
}
