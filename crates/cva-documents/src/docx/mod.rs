//! DOCX extraction and redaction over the raw package
//!
//! Only the parts that carry visible text (body, headers, footers, notes and
//! comments) are parsed. Redaction rewrites the masked `w:t` nodes of those
//! parts; every other part is copied byte for byte.

mod metadata;
mod package;
mod paragraphs;

use std::collections::HashMap;

use cva_core::{DocumentFormat, RedactionReport, RedactionTargets};
use tracing::debug;

use crate::{DocumentError, DocumentHandler, RedactOptions, Result};
use package::Package;
use paragraphs::XmlPart;

const MAIN_PART: &str = "word/document.xml";

/// Reading order of a text-bearing part, `None` for every other part
fn text_part_rank(name: &str) -> Option<u8> {
    let stem = name.strip_prefix("word/")?.strip_suffix(".xml")?;
    let numbered = |prefix: &str| {
        stem.strip_prefix(prefix)
            .is_some_and(|n| n.chars().all(|c| c.is_ascii_digit()))
    };

    match stem {
        "document" => Some(0),
        _ if numbered("header") => Some(1),
        _ if numbered("footer") => Some(2),
        "footnotes" => Some(3),
        "endnotes" => Some(4),
        "comments" => Some(5),
        _ => None,
    }
}

fn text_parts(names: &[String]) -> Result<Vec<String>> {
    let mut parts: Vec<(u8, &String)> = names
        .iter()
        .filter_map(|name| text_part_rank(name).map(|rank| (rank, name)))
        .collect();
    if !parts.iter().any(|(rank, _)| *rank == 0) {
        return Err(DocumentError::MissingPart(MAIN_PART.to_string()));
    }
    parts.sort();
    Ok(parts.into_iter().map(|(_, name)| name.clone()).collect())
}

pub struct DocxHandler;

impl DocumentHandler for DocxHandler {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Docx
    }

    fn extract_text(&self, bytes: &[u8]) -> Result<String> {
        let mut package = Package::open(bytes)?;
        let parts = text_parts(&package.names()?)?;
        let mut paragraphs = Vec::new();

        for name in &parts {
            let part = XmlPart::parse(&package.read_string(name)?)?;
            paragraphs.extend(part.paragraph_texts().map(str::to_string));
        }

        debug!(
            "Extracted {} paragraphs from {} DOCX parts",
            paragraphs.len(),
            parts.len()
        );
        Ok(paragraphs.join("\n"))
    }

    fn redact(
        &self,
        bytes: &[u8],
        targets: &RedactionTargets,
        options: &RedactOptions,
    ) -> Result<(Vec<u8>, RedactionReport)> {
        let mut package = Package::open(bytes)?;
        let names = package.names()?;
        let parts = text_parts(&names)?;

        let mut report = RedactionReport::new(DocumentFormat::Docx);
        for target in targets {
            report.record(target, 0);
        }
        report.units_total = parts.len();

        let mut replacements = HashMap::new();

        if !targets.is_empty() {
            for name in &parts {
                let mut part = XmlPart::parse(&package.read_string(name)?)?;
                let result = part.redact(targets, options.mask_char);
                for (target, hits) in targets.iter().zip(&result.hits) {
                    report.record(target, *hits);
                }
                if result.changed {
                    debug!("Redacted {}", name);
                    replacements.insert(name.clone(), part.to_xml()?);
                    report.units_modified += 1;
                }
            }
        }

        if options.scrub_metadata {
            let properties: [(&str, &[&[u8]]); 2] = [
                ("docProps/core.xml", &metadata::CORE_FIELDS),
                ("docProps/app.xml", &metadata::APP_FIELDS),
            ];
            for (name, fields) in properties {
                if !names.iter().any(|n| n == name) {
                    continue;
                }
                if let Some(xml) = metadata::blank_fields(&package.read_string(name)?, fields)? {
                    debug!("Blanked identifying properties in {}", name);
                    replacements.insert(name.to_string(), xml);
                    report.metadata_scrubbed = true;
                }
            }
        }

        if replacements.is_empty() {
            return Ok((bytes.to_vec(), report));
        }

        let out = package.rebuild(&replacements)?;
        Ok((out, report))
    }
}
