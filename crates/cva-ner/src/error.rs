//! Error types for cva-ner

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, NerError>;

#[derive(Error, Debug)]
pub enum NerError {
    #[error("Recognizer model unavailable at {path}: {reason}")]
    ModelUnavailable { path: PathBuf, reason: String },

    #[error("Model fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("Invalid model: {0}")]
    InvalidModel(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<NerError> for cva_core::Error {
    fn from(err: NerError) -> Self {
        cva_core::Error::Recognizer(err.to_string())
    }
}
