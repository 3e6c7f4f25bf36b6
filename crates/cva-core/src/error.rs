use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(String),

    #[error("Entity recognizer error: {0}")]
    Recognizer(String),

    #[error("Document error: {0}")]
    Document(String),
}

pub type Result<T> = std::result::Result<T, Error>;
