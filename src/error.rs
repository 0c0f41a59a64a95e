//! Error types for the asmdoc worker.
//!
//! Library modules return [`AsmDocError`] through the crate-wide [`Result`]
//! alias. The decompiler backend has its own error type so that source
//! reconstruction can degrade locally without dragging pipeline errors into
//! the backend seam.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AsmDocError>;

/// Main error type for the documentation worker.
#[derive(Error, Debug)]
pub enum AsmDocError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Template registration error: {0}")]
    TemplateRegister(String),

    #[error("Template render error: {0}")]
    TemplateRender(String),

    #[error("Completion service error: {0}")]
    Completion(String),

    #[error("Snapshot error: {0}")]
    Snapshot(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors surfaced by a decompiler backend.
///
/// These never cross the reconstruction boundary: the reconstructor logs
/// them and degrades to absent source text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecompileError {
    #[error("type `{0}` not present in the decompilation context")]
    UnknownType(String),

    #[error("no method body for handle {0:#010x}")]
    UnknownHandle(u32),

    #[error("backend failure: {0}")]
    Backend(String),
}
