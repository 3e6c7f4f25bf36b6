use lopdf::{Dictionary, Document, Object};

/// Info dictionary entries that identify the author or the document
const INFO_KEYS: [&[u8]; 6] = [
    b"Author",
    b"Title",
    b"Subject",
    b"Keywords",
    b"Creator",
    b"Producer",
];

fn strip_info(info: &mut Dictionary) -> bool {
    INFO_KEYS
        .iter()
        .fold(false, |changed, key| info.remove(key).is_some() || changed)
}

/// Remove identifying Info entries and the XMP metadata stream.
/// Returns whether anything was removed.
pub(crate) fn scrub(doc: &mut Document) -> bool {
    let mut changed = false;

    let info_ref = doc
        .trailer
        .get(b"Info")
        .ok()
        .and_then(|obj| obj.as_reference().ok());
    match info_ref {
        Some(id) => {
            if let Ok(info) = doc.get_object_mut(id).and_then(Object::as_dict_mut) {
                changed |= strip_info(info);
            }
        }
        None => {
            if let Ok(Object::Dictionary(info)) = doc.trailer.get_mut(b"Info") {
                changed |= strip_info(info);
            }
        }
    }

    let catalog_ref = doc
        .trailer
        .get(b"Root")
        .ok()
        .and_then(|obj| obj.as_reference().ok());
    let removed = catalog_ref
        .and_then(|id| doc.get_object_mut(id).and_then(Object::as_dict_mut).ok())
        .and_then(|catalog| catalog.remove(b"Metadata"));
    if let Some(metadata) = removed {
        if let Object::Reference(id) = metadata {
            doc.objects.remove(&id);
        }
        changed = true;
    }

    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{Stream, dictionary};

    #[test]
    fn test_scrub_info_and_xmp() {
        let mut doc = Document::with_version("1.5");
        let xmp = doc.add_object(Stream::new(
            dictionary! { "Type" => "Metadata", "Subtype" => "XML" },
            b"<x:xmpmeta>Jane Doe</x:xmpmeta>".to_vec(),
        ));
        let catalog = doc.add_object(dictionary! { "Type" => "Catalog", "Metadata" => xmp });
        let info = doc.add_object(dictionary! {
            "Author" => Object::string_literal("Jane Doe"),
            "Title" => Object::string_literal("CV"),
            "CreationDate" => Object::string_literal("D:20240101"),
        });
        doc.trailer.set("Root", catalog);
        doc.trailer.set("Info", info);

        assert!(scrub(&mut doc));

        let info = doc.get_dictionary(info).unwrap();
        assert!(info.get(b"Author").is_err());
        assert!(info.get(b"Title").is_err());
        assert!(info.get(b"CreationDate").is_ok());
        assert!(doc.get_dictionary(catalog).unwrap().get(b"Metadata").is_err());
        assert!(doc.get_object(xmp).is_err());

        assert!(!scrub(&mut doc));
    }
}
