//! PDF extraction and redaction on top of lopdf
//!
//! Text is recovered by replaying each page's content stream through a small
//! font model. Redaction removes the matched glyphs from the showing
//! operators (keeping the pen position) and paints a box over them, then
//! replaces the page's content streams so the original text is gone from the
//! file. Inline images are carried through untouched. Text inside form
//! XObjects is neither extracted nor redacted. A page whose content cannot be
//! decoded fails the redaction instead of being copied.

mod cmap;
mod content;
mod fonts;
mod metadata;
mod redact;
mod text;

use std::collections::{HashMap, HashSet};

use cva_core::{DocumentFormat, RedactionReport, RedactionTargets, mask_occurrences};
use lopdf::content::Operation;
use lopdf::{Document, Object, ObjectId, Stream, dictionary};
use tracing::{debug, warn};

use crate::{DocumentError, DocumentHandler, RedactOptions, Result};
use content::PageContent;
use fonts::FontDecoder;
use text::PageLayout;

/// Follow indirect references to the object they point at
pub(crate) fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    let mut current = obj;
    for _ in 0..8 {
        match current {
            Object::Reference(id) => match doc.get_object(*id) {
                Ok(next) => current = next,
                Err(_) => return current,
            },
            _ => return current,
        }
    }
    current
}

pub(crate) fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r as f32),
        _ => None,
    }
}

/// Fonts visible to a page, honouring `Resources` inherited from the page tree
fn page_fonts(doc: &Document, page_id: ObjectId) -> HashMap<Vec<u8>, FontDecoder> {
    let mut fonts = HashMap::new();
    let mut node = doc.get_dictionary(page_id).ok();
    let mut depth = 0;

    while let Some(dict) = node {
        let resources = dict
            .get(b"Resources")
            .ok()
            .and_then(|obj| resolve(doc, obj).as_dict().ok());
        if let Some(resources) = resources {
            let font_dict = resources
                .get(b"Font")
                .ok()
                .and_then(|obj| resolve(doc, obj).as_dict().ok());
            for (name, font) in font_dict.into_iter().flat_map(|d| d.iter()) {
                if let Ok(font) = resolve(doc, font).as_dict() {
                    fonts.insert(name.clone(), FontDecoder::from_dict(doc, font));
                }
            }
            break;
        }

        depth += 1;
        if depth > 32 {
            break;
        }
        node = dict
            .get(b"Parent")
            .ok()
            .and_then(|obj| obj.as_reference().ok())
            .and_then(|id| doc.get_dictionary(id).ok());
    }

    fonts
}

fn read_page(doc: &Document, page_id: ObjectId) -> Result<(PageContent, PageLayout)> {
    let data = doc.get_page_content(page_id)?;
    let content = PageContent::decode(&data)?;
    let fonts = page_fonts(doc, page_id);
    let layout = text::layout(&content.operations, &fonts);
    Ok((content, layout))
}

/// Point the page at a single new content stream and drop the streams it
/// used to show, unless another page still shows them
fn replace_content(
    doc: &mut Document,
    page_id: ObjectId,
    content: &PageContent,
    operations: Vec<Operation>,
) -> Result<()> {
    let previous = doc.get_page_contents(page_id);
    let data = content.encode(operations)?;
    let stream_id = doc.add_object(Stream::new(dictionary! {}, data));

    doc.get_object_mut(page_id)
        .and_then(Object::as_dict_mut)?
        .set("Contents", stream_id);

    let still_shown: HashSet<ObjectId> = doc
        .get_pages()
        .values()
        .flat_map(|id| doc.get_page_contents(*id))
        .collect();
    for id in previous {
        if !still_shown.contains(&id) {
            doc.objects.remove(&id);
        }
    }

    Ok(())
}

pub struct PdfHandler;

impl DocumentHandler for PdfHandler {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Pdf
    }

    fn extract_text(&self, bytes: &[u8]) -> Result<String> {
        let doc = Document::load_mem(bytes)?;
        let mut pages = Vec::new();

        for (number, page_id) in doc.get_pages() {
            match read_page(&doc, page_id) {
                Ok((_, layout)) => pages.push(layout.text),
                Err(e) => {
                    warn!("Page {} could not be decoded: {}", number, e);
                    pages.push(String::new());
                }
            }
        }

        debug!("Extracted text from {} PDF pages", pages.len());
        Ok(pages.join("\n"))
    }

    fn redact(
        &self,
        bytes: &[u8],
        targets: &RedactionTargets,
        options: &RedactOptions,
    ) -> Result<(Vec<u8>, RedactionReport)> {
        let mut doc = Document::load_mem(bytes)?;
        let mut report = RedactionReport::new(DocumentFormat::Pdf);
        for target in targets {
            report.record(target, 0);
        }

        let pages: Vec<(u32, ObjectId)> = doc.get_pages().into_iter().collect();
        report.units_total = pages.len();

        if !targets.is_empty() {
            for (number, page_id) in pages {
                // an unreadable page could still show a target
                let (content, layout) =
                    read_page(&doc, page_id).map_err(|e| DocumentError::UnreadablePage {
                        page: number,
                        reason: e.to_string(),
                    })?;

                let mask = mask_occurrences(&layout.text, targets);
                for (target, hits) in targets.iter().zip(mask.hits()) {
                    report.record(target, *hits);
                }
                if !mask.any() {
                    continue;
                }

                let redacted = redact::redact_operations(
                    &content.operations,
                    &layout,
                    &mask,
                    options.fill_color,
                );
                replace_content(&mut doc, page_id, &content, redacted)?;
                report.units_modified += 1;
                debug!(
                    "Page {}: {} characters redacted",
                    number,
                    mask.masked_count()
                );
            }
        }

        if options.scrub_metadata {
            report.metadata_scrubbed = metadata::scrub(&mut doc);
        }

        if report.units_modified == 0 && !report.metadata_scrubbed {
            return Ok((bytes.to_vec(), report));
        }

        let mut out = Vec::new();
        doc.save_to(&mut out)?;
        Ok((out, report))
    }
}
