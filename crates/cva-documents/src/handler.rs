//! Document handler trait and format registry

use std::collections::HashMap;

use cva_core::{DocumentFormat, Error, RedactionReport, RedactionTargets};

use crate::Result;
use crate::docx::DocxHandler;
use crate::pdf::PdfHandler;

/// Options for redacting a document
#[derive(Debug, Clone)]
pub struct RedactOptions {
    /// Replacement for each masked character in text based formats
    pub mask_char: char,
    /// RGB fill of the boxes painted over PDF glyphs, components in 0..=1
    pub fill_color: [f32; 3],
    /// Remove author and title metadata as well
    pub scrub_metadata: bool,
}

impl Default for RedactOptions {
    fn default() -> Self {
        Self {
            mask_char: '█',
            fill_color: [0.0, 0.0, 0.0],
            scrub_metadata: true,
        }
    }
}

/// Trait for handling one document format
pub trait DocumentHandler: Send + Sync {
    fn format(&self) -> DocumentFormat;

    /// Plain text of the whole document
    fn extract_text(&self, bytes: &[u8]) -> Result<String>;

    /// Copy of the document with every occurrence of every target obscured
    fn redact(
        &self,
        bytes: &[u8],
        targets: &RedactionTargets,
        options: &RedactOptions,
    ) -> Result<(Vec<u8>, RedactionReport)>;
}

/// Dispatches documents to the handler for their format
pub struct DocumentRegistry {
    handlers: HashMap<DocumentFormat, Box<dyn DocumentHandler>>,
}

impl DocumentRegistry {
    /// Registry with the PDF and DOCX handlers
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(PdfHandler));
        registry.register(Box::new(DocxHandler));
        registry
    }

    pub fn empty() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register a handler, replacing any handler for the same format
    pub fn register(&mut self, handler: Box<dyn DocumentHandler>) {
        self.handlers.insert(handler.format(), handler);
    }

    pub fn handler(&self, format: DocumentFormat) -> cva_core::Result<&dyn DocumentHandler> {
        self.handlers
            .get(&format)
            .map(|handler| handler.as_ref())
            .ok_or_else(|| Error::UnsupportedFormat(format!("no handler for {}", format)))
    }

    pub fn extract_text(&self, bytes: &[u8], format: DocumentFormat) -> cva_core::Result<String> {
        Ok(self.handler(format)?.extract_text(bytes)?)
    }

    pub fn redact(
        &self,
        bytes: &[u8],
        format: DocumentFormat,
        targets: &RedactionTargets,
        options: &RedactOptions,
    ) -> cva_core::Result<(Vec<u8>, RedactionReport)> {
        Ok(self.handler(format)?.redact(bytes, targets, options)?)
    }
}

impl Default for DocumentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_has_both_formats() {
        let registry = DocumentRegistry::new();
        assert_eq!(registry.handler(DocumentFormat::Pdf).unwrap().format(), DocumentFormat::Pdf);
        assert_eq!(registry.handler(DocumentFormat::Docx).unwrap().format(), DocumentFormat::Docx);
    }

    #[test]
    fn test_empty_registry_rejects() {
        let registry = DocumentRegistry::empty();
        assert!(matches!(
            registry.extract_text(b"%PDF-1.4", DocumentFormat::Pdf),
            Err(Error::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_corrupt_input_is_a_document_error() {
        let registry = DocumentRegistry::new();
        assert!(matches!(
            registry.extract_text(b"not a pdf", DocumentFormat::Pdf),
            Err(Error::Document(_))
        ));
        assert!(matches!(
            registry.extract_text(b"not a zip", DocumentFormat::Docx),
            Err(Error::Document(_))
        ));
    }
}
