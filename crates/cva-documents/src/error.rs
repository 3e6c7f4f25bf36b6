//! Error types for cva-documents

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DocumentError>;

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Page {page} could not be decoded: {reason}")]
    UnreadablePage { page: u32, reason: String },

    #[error("Missing document part: {0}")]
    MissingPart(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<DocumentError> for cva_core::Error {
    fn from(err: DocumentError) -> Self {
        cva_core::Error::Document(err.to_string())
    }
}
