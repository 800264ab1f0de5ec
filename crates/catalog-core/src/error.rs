//! Error types for the catalog engine

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Catalog root not found: {}", .0.display())]
    CatalogNotFound(PathBuf),

    #[error("Period not found: {0}")]
    PeriodNotFound(String),

    #[error("Record already exists: {0}")]
    AlreadyExists(String),

    #[error("Draft targets period '{draft}' but ingestion was requested for '{target}'")]
    PeriodMismatch { draft: String, target: String },

    #[error("Invalid draft: {0}")]
    InvalidDraft(String),

    #[error("Malformed JSON in {}: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Missing file: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("Invalid config: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}
