pub mod config;
pub mod detect;
pub mod model;
pub mod redact;
pub mod text;

use anyhow::{Context, Result};
use cva_config::Config;
use cva_core::DocumentFormat;
use cva_documents::{DocumentRegistry, RedactOptions};
use cva_engine::Anonymiser;
use cva_ner::ModelStore;
use std::path::Path;

/// Read a document and work out whether it is a PDF or a DOCX
pub fn read_document(path: &Path) -> Result<(Vec<u8>, DocumentFormat)> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let format = DocumentFormat::resolve(path, &bytes)?;
    Ok((bytes, format))
}

pub fn model_store(config: &Config) -> ModelStore {
    ModelStore::from_parts(config.ner.model_path.clone(), config.ner.model_url.clone())
}

pub fn redact_options(config: &Config) -> RedactOptions {
    RedactOptions {
        mask_char: config.redaction.mask_char,
        fill_color: config.redaction.fill_color,
        scrub_metadata: config.redaction.scrub_metadata,
    }
}

/// Anonymiser backed by the shared recognizer, provisioning the model on
/// first use
pub async fn anonymiser(config: &Config, options: RedactOptions) -> Result<Anonymiser> {
    let store = model_store(config);
    let recognizer = cva_ner::shared_recognizer(&store)
        .await
        .context("Entity recognizer is unavailable")?;

    Ok(Anonymiser::new(recognizer, DocumentRegistry::new(), options))
}
