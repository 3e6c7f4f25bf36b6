//! WordprocessingML paragraph model
//!
//! A part is kept as its full event stream so it can be written back
//! unchanged except for the `w:t` text nodes that were masked. Paragraph
//! text is the concatenation of its runs: `w:t` content, `w:tab` as a tab
//! and `w:br`/`w:cr` as a line break.

use cva_core::{RedactionTargets, mask_occurrences};
use quick_xml::events::{BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::Result;

#[derive(Debug)]
enum Segment {
    /// Content of a text event inside `w:t`
    Text { event: usize, content: String },
    /// A tab or break, one character of paragraph text
    Fixed,
}

#[derive(Debug, Default)]
struct Paragraph {
    text: String,
    segments: Vec<Segment>,
}

impl Paragraph {
    fn push_text(&mut self, event: usize, content: String) {
        self.text.push_str(&content);
        self.segments.push(Segment::Text { event, content });
    }

    fn push_fixed(&mut self, c: char) {
        self.text.push(c);
        self.segments.push(Segment::Fixed);
    }
}

/// Per-target hit counts of one redaction pass over a part
#[derive(Debug, Default)]
pub(crate) struct PartHits {
    pub hits: Vec<usize>,
    pub changed: bool,
}

#[derive(Debug)]
pub(crate) struct XmlPart {
    events: Vec<Event<'static>>,
    paragraphs: Vec<Paragraph>,
}

impl XmlPart {
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(false);

        let mut events = Vec::new();
        let mut paragraphs: Vec<Paragraph> = Vec::new();
        let mut open: Vec<usize> = Vec::new();
        let mut run_depth = 0usize;
        let mut in_text = false;

        loop {
            let event = reader.read_event()?;
            match &event {
                Event::Eof => break,
                Event::Start(e) => match e.name().as_ref() {
                    b"w:p" => {
                        open.push(paragraphs.len());
                        paragraphs.push(Paragraph::default());
                    }
                    b"w:r" => run_depth += 1,
                    b"w:t" => in_text = true,
                    _ => {}
                },
                Event::End(e) => match e.name().as_ref() {
                    b"w:p" => {
                        open.pop();
                    }
                    b"w:r" => run_depth = run_depth.saturating_sub(1),
                    b"w:t" => in_text = false,
                    _ => {}
                },
                Event::Empty(e) => {
                    let fixed = match e.name().as_ref() {
                        b"w:p" => {
                            paragraphs.push(Paragraph::default());
                            None
                        }
                        b"w:tab" if run_depth > 0 => Some('\t'),
                        b"w:br" | b"w:cr" if run_depth > 0 => Some('\n'),
                        _ => None,
                    };
                    if let (Some(c), Some(&p)) = (fixed, open.last()) {
                        paragraphs[p].push_fixed(c);
                    }
                }
                Event::Text(t) if in_text => {
                    if let Some(&p) = open.last() {
                        let content = t.unescape()?.into_owned();
                        paragraphs[p].push_text(events.len(), content);
                    }
                }
                _ => {}
            }
            events.push(event.into_owned());
        }

        Ok(Self { events, paragraphs })
    }

    pub fn paragraph_texts(&self) -> impl Iterator<Item = &str> {
        self.paragraphs.iter().map(|p| p.text.as_str())
    }

    /// Mask every occurrence of every target, paragraph by paragraph
    pub fn redact(&mut self, targets: &RedactionTargets, mask_char: char) -> PartHits {
        let mut result = PartHits {
            hits: vec![0; targets.len()],
            changed: false,
        };

        for paragraph in &mut self.paragraphs {
            let mask = mask_occurrences(&paragraph.text, targets);
            for (total, hits) in result.hits.iter_mut().zip(mask.hits()) {
                *total += hits;
            }
            if !mask.any() {
                continue;
            }
            result.changed = true;

            let mut cursor = 0;
            for segment in &mut paragraph.segments {
                let Segment::Text { event, content } = segment else {
                    cursor += 1;
                    continue;
                };
                let masked: String = content
                    .chars()
                    .enumerate()
                    .map(|(i, c)| if mask.is_masked(cursor + i) { mask_char } else { c })
                    .collect();
                cursor += content.chars().count();

                if masked != *content {
                    self.events[*event] = Event::Text(BytesText::new(&masked).into_owned());
                    *content = masked;
                }
            }
            paragraph.text = mask.apply(&paragraph.text, mask_char);
        }

        result
    }

    pub fn to_xml(&self) -> Result<Vec<u8>> {
        let mut writer = Writer::new(Vec::new());
        for event in &self.events {
            writer.write_event(event)?;
        }
        Ok(writer.into_inner())
    }
}
