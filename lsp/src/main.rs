//! Fitzgerald Language Server Protocol implementation.
//!
//! Keeps one highlight session hot in memory. Editor state arrives through
//! document sync plus a few `fitz/*` notifications; difficult words go back as
//! diagnostics and stats panel traffic as custom notifications.

mod convert;
mod host;
mod workspace;

use std::path::{Path, PathBuf};

use anyhow::Context;
use fitz_core::{Config, Outcome, PanelEvent, Session, DEFAULT_CONFIG_FILE};
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::{Mutex, RwLock};
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer, LspService, Server};
use tracing_subscriber::EnvFilter;

use crate::convert::WireSelection;
use crate::host::{ClientHost, CreatePanel, Outbox, Outgoing, PanelUpdate};
use crate::workspace::{Documents, Pass, State, Trigger};

#[derive(Debug, Deserialize)]
struct SelectionChangedParams {
    uri: Url,
    selections: Vec<WireSelection>,
}

#[derive(Debug, Deserialize)]
struct ActiveEditorChangedParams {
    #[serde(default)]
    uri: Option<Url>,
}

#[derive(Debug, Deserialize)]
struct WordActivatedParams {
    word: String,
}

/// Fitzgerald Language Server backend.
struct Backend {
    client: Client,
    state: Mutex<State<ClientHost>>,
    outbox: Outbox,
    documents: Documents,
    workspace_root: RwLock<Option<PathBuf>>,
    config_path: RwLock<Option<PathBuf>>,
}

impl Backend {
    fn new(client: Client) -> Self {
        let host = ClientHost::default();
        let outbox = host.outbox.clone();
        Self {
            client,
            state: Mutex::new(State::new(Session::new(Config::default(), host))),
            outbox,
            documents: Documents::default(),
            workspace_root: RwLock::new(None),
            config_path: RwLock::new(None),
        }
    }

    fn load_config(path: &Path) -> anyhow::Result<Config> {
        Config::from_yaml_file(path).with_context(|| format!("Invalid config {}", path.display()))
    }

    async fn set_config_path(&self, raw: &str) {
        if raw.trim().is_empty() {
            *self.config_path.write().await = None;
            return;
        }
        let configured = PathBuf::from(raw);
        if configured.is_absolute() {
            *self.config_path.write().await = Some(configured);
        } else if let Some(root) = self.workspace_root.read().await.clone() {
            *self.config_path.write().await = Some(root.join(configured));
        }
    }

    async fn reload_config(&self) -> anyhow::Result<()> {
        let workspace_root = self.workspace_root.read().await.clone();
        let configured = self.config_path.read().await.clone();
        let Some(resolved) =
            configured.or_else(|| workspace_root.map(|r| r.join(DEFAULT_CONFIG_FILE)))
        else {
            return Ok(());
        };

        let cfg = if resolved.exists() {
            Self::load_config(&resolved)?
        } else {
            Config::default()
        };
        self.state.lock().await.session.reconfigure(cfg);

        self.client
            .log_message(
                MessageType::INFO,
                format!("Fitzgerald config loaded: {}", resolved.display()),
            )
            .await;
        Ok(())
    }

    async fn reload_and_refresh(&self) {
        if let Err(err) = self.reload_config().await {
            self.client
                .log_message(
                    MessageType::ERROR,
                    format!("Failed to reload config: {err:#}"),
                )
                .await;
        }
        let has_active = self.state.lock().await.focus.active().is_some();
        if has_active {
            self.run(Trigger::Refresh).await;
        }
    }

    async fn run(&self, trigger: Trigger) {
        let pass = self.state.lock().await.pass(&trigger, &self.documents);
        self.deliver(pass).await;
    }

    async fn deliver(&self, pass: Pass) {
        if pass.outcome == Outcome::NoDocument {
            tracing::debug!("recompute ran without an active document");
        }
        if let Some(publish) = pass.publish {
            self.client
                .publish_diagnostics(publish.uri, publish.diagnostics, publish.version)
                .await;
        }
        self.flush_panel().await;
    }

    async fn flush_panel(&self) {
        for item in self.outbox.drain() {
            match item {
                Outgoing::Create(params) => {
                    self.client.send_notification::<CreatePanel>(params).await
                }
                Outgoing::Panel(params) => {
                    self.client.send_notification::<PanelUpdate>(params).await
                }
            }
        }
    }

    async fn selection_changed(&self, params: SelectionChangedParams) {
        if self.documents.select(&params.uri, &params.selections) {
            self.run(Trigger::Selected(params.uri)).await;
        }
    }

    async fn active_editor_changed(&self, params: ActiveEditorChangedParams) {
        let pass = {
            let mut state = self.state.lock().await;
            let trigger = state.focus.focus(params.uri, &self.documents);
            state.pass(&trigger, &self.documents)
        };
        self.deliver(pass).await;
    }

    async fn word_activated(&self, params: WordActivatedParams) {
        self.state
            .lock()
            .await
            .session
            .receive(&PanelEvent::WordActivated { word: params.word });
    }

    async fn show_stats(&self) {
        self.run(Trigger::Refresh).await;
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        if let Some(root_uri) = params.root_uri.or_else(|| {
            params
                .workspace_folders
                .as_ref()
                .and_then(|folders| folders.first().map(|f| f.uri.clone()))
        }) {
            if let Ok(path) = root_uri.to_file_path() {
                *self.workspace_root.write().await = Some(path);
            }
        }

        if let Some(Value::Object(map)) = params.initialization_options {
            if let Some(Value::String(config_path)) = map.get("configPath") {
                self.set_config_path(config_path).await;
            }
            if let Some(Value::String(base)) = map.get("extensionUri") {
                self.state.lock().await.session.display_mut().host_mut().base =
                    Some(base.clone());
            }
        }

        if let Err(err) = self.reload_config().await {
            self.client
                .log_message(
                    MessageType::ERROR,
                    format!("Failed to load config: {err:#}"),
                )
                .await;
        }

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::FULL,
                )),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "Fitzgerald Language Server".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _params: InitializedParams) {
        let has_base = self.state.lock().await.session.display().host().base.is_some();
        if !has_base {
            self.client
                .log_message(
                    MessageType::WARNING,
                    "No extensionUri given; the stats panel stays closed",
                )
                .await;
        }
        self.client
            .log_message(MessageType::INFO, "Fitzgerald LSP initialized")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let doc = params.text_document;
        self.documents.open(doc.uri.clone(), doc.text, doc.version);
        let pass = {
            let mut state = self.state.lock().await;
            let trigger = state.focus.opened(&doc.uri);
            state.pass(&trigger, &self.documents)
        };
        self.deliver(pass).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        let version = params.text_document.version;

        // With FULL sync, we get the complete new content
        if let Some(change) = params.content_changes.into_iter().last() {
            self.documents.change(&uri, change.text, version);
        }

        self.run(Trigger::Edited(uri)).await;
    }

    async fn did_save(&self, params: DidSaveTextDocumentParams) {
        let saved_path = params.text_document.uri.to_file_path().ok();
        let config_path = self.config_path.read().await.clone();
        let is_config = match (&saved_path, &config_path) {
            (Some(saved), Some(config)) => saved == config,
            (Some(saved), None) => saved.ends_with(DEFAULT_CONFIG_FILE),
            _ => false,
        };
        if is_config {
            self.reload_and_refresh().await;
        }
    }

    async fn did_change_configuration(&self, params: DidChangeConfigurationParams) {
        if let Value::Object(map) = params.settings {
            if let Some(Value::String(config_path)) = map.get("configPath") {
                self.set_config_path(config_path).await;
            }
        }
        self.reload_and_refresh().await;
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        self.documents.close(&uri);
        let pass = {
            let mut state = self.state.lock().await;
            let left = state.focus.closed(&uri);
            left.map(|trigger| state.pass(&trigger, &self.documents))
        };
        if let Some(pass) = pass {
            self.deliver(pass).await;
        }
        // Clear diagnostics
        self.client.publish_diagnostics(uri, vec![], None).await;
    }
}

#[tokio::main]
async fn main() {
    // stdout carries the protocol.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("FITZ_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::build(Backend::new)
        .custom_method("fitz/selectionChanged", Backend::selection_changed)
        .custom_method("fitz/activeEditorChanged", Backend::active_editor_changed)
        .custom_method("fitz/wordActivated", Backend::word_activated)
        .custom_method("fitz/showStats", Backend::show_stats)
        .finish();
    Server::new(stdin, stdout, socket).serve(service).await;
}
