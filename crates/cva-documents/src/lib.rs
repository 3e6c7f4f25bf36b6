//! Document text extraction and redaction
//!
//! Each supported format has a `DocumentHandler`; `DocumentRegistry` picks
//! the handler for a `DocumentFormat`. Both handlers locate targets with
//! `cva_core::mask_occurrences` over the same text they extract, so anything
//! detected in the extracted text can be found again when redacting.

pub mod docx;
pub mod error;
pub mod handler;
pub mod pdf;

pub use docx::DocxHandler;
pub use error::{DocumentError, Result};
pub use handler::{DocumentHandler, DocumentRegistry, RedactOptions};
pub use pdf::PdfHandler;
