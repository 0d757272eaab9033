//! Error taxonomy for the analysis engine.
//!
//! None of these terminate the host: the session degrades each one to a
//! no-op, a log line, or the panel's `error` message.

use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FitzError {
    /// No text surface is available to analyze.
    #[error("no active document")]
    NoActiveDocument,

    /// A panel field the refresh message targets is not rendered by the panel.
    #[error("panel has no view for stat `{field}`")]
    LookupMiss { field: String },

    /// The panel was requested before the host supplied its resource root.
    #[error("display requested before the host supplied a base resource location")]
    MissingHostContext,

    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, FitzError>;
