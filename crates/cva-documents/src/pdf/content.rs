//! Page content streams prepared for lopdf
//!
//! lopdf's content parser stops at the first token it cannot read and returns
//! the operations before it, so the binary data of an inline image
//! (`BI … ID … EI`) or a comment would silently cut the page short. Streams
//! are scanned first: inline images are cut out and stand in the operation
//! list as a single `InlineImage` operation carrying their index (written
//! back byte for byte on encode), comments are blanked, and operators are
//! counted so a short decode is reported as an error.

use lopdf::content::{Content, Operation};
use lopdf::{Error as PdfError, Object};

use crate::Result;

const INLINE_IMAGE: &str = "InlineImage";

fn is_delimiter(b: u8) -> bool {
    b"()<>[]{}/%".contains(&b)
}

fn is_regular(b: u8) -> bool {
    !b.is_ascii_whitespace() && b != 0 && !is_delimiter(b)
}

fn is_operator(word: &[u8]) -> bool {
    let starts_like_operator = word
        .first()
        .is_some_and(|b| b.is_ascii_alphabetic() || b"*'\"".contains(b));
    starts_like_operator && !matches!(word, b"true" | b"false" | b"null")
}

fn skip_regular(data: &[u8], mut i: usize) -> usize {
    while i < data.len() && is_regular(data[i]) {
        i += 1;
    }
    i
}

/// Index just past a literal string opening at `i`
fn skip_literal(data: &[u8], mut i: usize) -> usize {
    let mut depth = 0usize;
    while i < data.len() {
        match data[i] {
            b'\\' => i += 1,
            b'(' => depth += 1,
            b')' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return (i + 1).min(data.len());
                }
            }
            _ => {}
        }
        i += 1;
    }
    data.len()
}

/// Index just past a hex string opening at `i`
fn skip_hex(data: &[u8], i: usize) -> usize {
    data[i..]
        .iter()
        .position(|c| *c == b'>')
        .map_or(data.len(), |p| i + p + 1)
}

fn skip_comment(data: &[u8], mut i: usize) -> usize {
    while i < data.len() && data[i] != b'\n' && data[i] != b'\r' {
        i += 1;
    }
    i
}

/// End of the inline image whose `BI` keyword ends at `from`
fn inline_image_end(data: &[u8], from: usize) -> Option<usize> {
    let mut i = from;
    let id_end = loop {
        match *data.get(i)? {
            b'(' => i = skip_literal(data, i),
            b'<' if data.get(i + 1) == Some(&b'<') => i += 2,
            b'<' => i = skip_hex(data, i),
            b'/' => i = skip_regular(data, i + 1),
            b'%' => i = skip_comment(data, i),
            b if is_regular(b) => {
                let end = skip_regular(data, i);
                if &data[i..end] == b"ID" {
                    break end;
                }
                i = end;
            }
            _ => i += 1,
        }
    };

    // one whitespace byte separates ID from the image data
    let data_start = id_end + 1;
    (data_start..data.len().saturating_sub(1)).find_map(|j| {
        let preceded = data[j - 1].is_ascii_whitespace();
        let followed = data
            .get(j + 2)
            .is_none_or(|b| b.is_ascii_whitespace() || is_delimiter(*b));
        (preceded && followed && &data[j..j + 2] == b"EI").then_some(j + 2)
    })
}

/// Content ready for `Content::decode`
#[derive(Debug, Default)]
struct Prepared {
    data: Vec<u8>,
    inline_images: Vec<Vec<u8>>,
    operators: usize,
}

fn prepare(data: &[u8]) -> Prepared {
    let mut prepared = Prepared {
        data: Vec::with_capacity(data.len()),
        ..Prepared::default()
    };
    let mut i = 0;

    while i < data.len() {
        let end = match data[i] {
            b'%' => {
                let end = skip_comment(data, i);
                prepared.data.push(b' ');
                i = end;
                continue;
            }
            b'(' => skip_literal(data, i),
            b'<' if data.get(i + 1) == Some(&b'<') => i + 2,
            b'>' if data.get(i + 1) == Some(&b'>') => i + 2,
            b'<' => skip_hex(data, i),
            b'/' => skip_regular(data, i + 1),
            b if is_regular(b) => {
                let end = skip_regular(data, i);
                let word = &data[i..end];
                if word == b"BI"
                    && let Some(image_end) = inline_image_end(data, end)
                {
                    let placeholder = format!(" {} {} ", prepared.inline_images.len(), INLINE_IMAGE);
                    prepared.data.extend_from_slice(placeholder.as_bytes());
                    prepared.inline_images.push(data[i..image_end].to_vec());
                    prepared.operators += 1;
                    i = image_end;
                    continue;
                }
                if is_operator(word) {
                    prepared.operators += 1;
                }
                end
            }
            // lopdf only skips spaces, tabs and line breaks between tokens
            b if b.is_ascii_whitespace() || b == 0 => {
                prepared.data.push(b' ');
                i += 1;
                continue;
            }
            _ => i + 1,
        };
        prepared.data.extend_from_slice(&data[i..end]);
        i = end;
    }

    prepared
}

/// Decoded operations of one page plus the inline images cut out of them
#[derive(Debug, Default)]
pub(crate) struct PageContent {
    pub operations: Vec<Operation>,
    inline_images: Vec<Vec<u8>>,
}

impl PageContent {
    pub fn decode(data: &[u8]) -> Result<Self> {
        let prepared = prepare(data);
        let operations = Content::decode(&prepared.data)?.operations;
        if operations.len() != prepared.operators {
            return Err(PdfError::ContentDecode.into());
        }

        Ok(Self {
            operations,
            inline_images: prepared.inline_images,
        })
    }

    fn inline_image(&self, op: &Operation) -> Option<&[u8]> {
        if op.operator != INLINE_IMAGE {
            return None;
        }
        let index = op.operands.first().and_then(|o| Object::as_i64(o).ok())?;
        self.inline_images
            .get(usize::try_from(index).ok()?)
            .map(Vec::as_slice)
    }

    /// Encode `operations` (this page's operations or a rewrite of them),
    /// putting the inline images back in place
    pub fn encode(&self, operations: Vec<Operation>) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        let mut batch = Vec::new();

        for op in operations {
            match self.inline_image(&op) {
                Some(raw) => {
                    let before = Content {
                        operations: std::mem::take(&mut batch),
                    };
                    out.extend(before.encode()?);
                    out.push(b'\n');
                    out.extend_from_slice(raw);
                    out.push(b'\n');
                }
                None => batch.push(op),
            }
        }
        out.extend(Content { operations: batch }.encode()?);

        Ok(out)
    }
}
