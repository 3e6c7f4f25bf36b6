use quick_xml::events::Event;
use quick_xml::{Reader, Writer};

use crate::Result;

/// Core properties naming the author or describing the document
pub(crate) const CORE_FIELDS: [&[u8]; 6] = [
    b"dc:creator",
    b"cp:lastModifiedBy",
    b"dc:title",
    b"dc:subject",
    b"dc:description",
    b"cp:keywords",
];

/// Extended properties naming the author's organisation
pub(crate) const APP_FIELDS: [&[u8]; 2] = [b"Company", b"Manager"];

/// Blank the text content of `fields`. `None` when nothing was removed.
pub(crate) fn blank_fields(xml: &str, fields: &[&[u8]]) -> Result<Option<Vec<u8>>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(false);
    let mut writer = Writer::new(Vec::new());
    let mut inside = 0usize;
    let mut changed = false;

    loop {
        let event = reader.read_event()?;
        match &event {
            Event::Eof => break,
            Event::Start(e) if fields.contains(&e.name().as_ref()) => inside += 1,
            Event::End(e) if fields.contains(&e.name().as_ref()) => {
                inside = inside.saturating_sub(1)
            }
            Event::Text(t) if inside > 0 => {
                changed |= !t.unescape()?.trim().is_empty();
                continue;
            }
            Event::CData(_) if inside > 0 => {
                changed = true;
                continue;
            }
            _ => {}
        }
        writer.write_event(&event)?;
    }

    Ok(changed.then(|| writer.into_inner()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_core_properties() {
        let xml = r#"<?xml version="1.0"?><cp:coreProperties xmlns:cp="c" xmlns:dc="d"><dc:creator>Jane Doe</dc:creator><cp:revision>3</cp:revision><dc:title>CV of Jane Doe</dc:title></cp:coreProperties>"#;
        let out = blank_fields(xml, &CORE_FIELDS).unwrap().unwrap();
        let out = String::from_utf8(out).unwrap();

        assert!(out.contains("<dc:creator></dc:creator>"));
        assert!(out.contains("<dc:title></dc:title>"));
        assert!(out.contains("<cp:revision>3</cp:revision>"));
        assert!(!out.contains("Jane"));
    }

    #[test]
    fn test_nothing_to_blank() {
        let xml = r#"<Properties><Company></Company><Pages>2</Pages></Properties>"#;
        assert!(blank_fields(xml, &APP_FIELDS).unwrap().is_none());
    }
}
