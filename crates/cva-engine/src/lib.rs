use std::sync::Arc;

use cva_core::{
    DocumentFormat, EntityRecognizer, RedactionReport, RedactionTargets, Result, detect,
};
use cva_documents::{DocumentRegistry, RedactOptions};
use serde::Serialize;
use tracing::{info, warn};

/// What would be redacted in a document, for review before redacting
#[derive(Debug, Clone, Serialize)]
pub struct Inspection {
    pub format: DocumentFormat,
    pub text: String,
    pub targets: RedactionTargets,
}

#[derive(Debug, Clone)]
pub struct RedactionOutcome {
    pub bytes: Vec<u8>,
    pub report: RedactionReport,
}

/// Extract, detect and redact, one document at a time
pub struct Anonymiser {
    recognizer: Arc<dyn EntityRecognizer>,
    registry: DocumentRegistry,
    options: RedactOptions,
}

impl Anonymiser {
    pub fn new(
        recognizer: Arc<dyn EntityRecognizer>,
        registry: DocumentRegistry,
        options: RedactOptions,
    ) -> Self {
        Self {
            recognizer,
            registry,
            options,
        }
    }

    /// Anonymiser with the PDF and DOCX handlers and default options
    pub fn with_recognizer(recognizer: Arc<dyn EntityRecognizer>) -> Self {
        Self::new(recognizer, DocumentRegistry::new(), RedactOptions::default())
    }

    pub fn recognizer_name(&self) -> &str {
        self.recognizer.name()
    }

    /// Extracted text only
    pub fn extract_text(&self, bytes: &[u8], format: DocumentFormat) -> Result<String> {
        self.registry.extract_text(bytes, format)
    }

    pub fn inspect(&self, bytes: &[u8], format: DocumentFormat) -> Result<Inspection> {
        let text = self.registry.extract_text(bytes, format)?;
        let targets = detect(self.recognizer.as_ref(), &text)?;
        info!(
            "Detected {} redaction targets in {} document ({} chars)",
            targets.len(),
            format,
            text.chars().count()
        );

        Ok(Inspection {
            format,
            text,
            targets,
        })
    }

    pub fn redact(
        &self,
        bytes: &[u8],
        format: DocumentFormat,
        targets: &RedactionTargets,
    ) -> Result<RedactionOutcome> {
        let (bytes, report) = self.registry.redact(bytes, format, targets, &self.options)?;

        for target in report.unmatched() {
            warn!("Target not located in the document: {:?}", target);
        }
        info!(
            "Redacted {} occurrences across {}/{} units",
            report.total_occurrences(),
            report.units_modified,
            report.units_total
        );

        Ok(RedactionOutcome { bytes, report })
    }

    /// Inspect then redact everything detected
    pub fn anonymise(
        &self,
        bytes: &[u8],
        format: DocumentFormat,
    ) -> Result<(Inspection, RedactionOutcome)> {
        let inspection = self.inspect(bytes, format)?;
        let outcome = self.redact(bytes, format, &inspection.targets)?;
        Ok((inspection, outcome))
    }
}
