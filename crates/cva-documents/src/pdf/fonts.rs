//! Font model: byte codes to text and glyph widths

use std::collections::HashMap;
use std::ops::Range;

use lopdf::{Dictionary, Document, Object};

use super::cmap::ToUnicode;
use super::{number, resolve};

/// Width used for simple fonts that carry no `Widths` array
const DEFAULT_SIMPLE_WIDTH: f32 = 500.0;
const DEFAULT_CID_WIDTH: f32 = 1000.0;

/// One shown glyph: its byte range in the string, text, and advance width in
/// thousandths of text space
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DecodedGlyph {
    pub range: Range<usize>,
    pub text: String,
    pub width: f32,
    /// Single-byte code 32, which also receives word spacing
    pub is_space: bool,
}

#[derive(Debug, Clone)]
enum Widths {
    Simple {
        first_char: u32,
        widths: Vec<f32>,
        missing: f32,
    },
    Cid {
        widths: HashMap<u32, f32>,
        default: f32,
    },
}

impl Widths {
    fn get(&self, code: u32) -> f32 {
        match self {
            Widths::Simple {
                first_char,
                widths,
                missing,
            } => code
                .checked_sub(*first_char)
                .and_then(|i| widths.get(i as usize))
                .copied()
                .unwrap_or(*missing),
            Widths::Cid { widths, default } => widths.get(&code).copied().unwrap_or(*default),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct FontDecoder {
    two_byte: bool,
    to_unicode: Option<ToUnicode>,
    /// Single-byte encoding, index by code
    encoding: Vec<Option<char>>,
    widths: Widths,
}

impl FontDecoder {
    /// Decoder for fonts that cannot be resolved: Latin-1 codes, fixed widths
    pub fn fallback() -> Self {
        Self {
            two_byte: false,
            to_unicode: None,
            encoding: win_ansi(),
            widths: Widths::Simple {
                first_char: 0,
                widths: Vec::new(),
                missing: DEFAULT_SIMPLE_WIDTH,
            },
        }
    }

    pub fn from_dict(doc: &Document, font: &Dictionary) -> Self {
        let subtype = name_of(doc, font, b"Subtype").unwrap_or_default();
        let two_byte = subtype == "Type0";

        let to_unicode = font
            .get(b"ToUnicode")
            .ok()
            .and_then(|obj| resolve(doc, obj).as_stream().ok())
            .and_then(|stream| {
                stream
                    .decompressed_content()
                    .ok()
                    .or_else(|| Some(stream.content.clone()))
            })
            .map(|data| ToUnicode::parse(&data))
            .filter(|cmap| !cmap.is_empty());

        let widths = if two_byte {
            cid_widths(doc, font)
        } else {
            simple_widths(doc, font)
        };

        Self {
            two_byte,
            to_unicode,
            encoding: simple_encoding(doc, font),
            widths,
        }
    }

    /// Split a shown string into glyphs
    pub fn glyphs(&self, bytes: &[u8]) -> Vec<DecodedGlyph> {
        let mut glyphs = Vec::new();
        let mut i = 0;

        while i < bytes.len() {
            let default_len = if self.two_byte { 2 } else { 1 };
            let len = self
                .to_unicode
                .as_ref()
                .and_then(|cmap| cmap.code_len(&bytes[i..]))
                .unwrap_or(default_len)
                .max(1)
                .min(bytes.len() - i);
            let code = &bytes[i..i + len];
            let value = code.iter().fold(0u32, |acc, b| (acc << 8) | u32::from(*b));

            let text = match self.to_unicode.as_ref().and_then(|cmap| cmap.lookup(code)) {
                Some(text) => text.to_string(),
                None if len == 1 => self.encoding[code[0] as usize]
                    .map(String::from)
                    .unwrap_or_default(),
                None => String::new(),
            };

            glyphs.push(DecodedGlyph {
                range: i..i + len,
                text,
                width: self.widths.get(value),
                is_space: len == 1 && code[0] == b' ',
            });
            i += len;
        }

        glyphs
    }
}

fn name_of(doc: &Document, dict: &Dictionary, key: &[u8]) -> Option<String> {
    match dict.get(key).ok().map(|obj| resolve(doc, obj)) {
        Some(Object::Name(name)) => Some(String::from_utf8_lossy(name).into_owned()),
        _ => None,
    }
}

fn descriptor_missing_width(doc: &Document, font: &Dictionary) -> Option<f32> {
    let descriptor = font
        .get(b"FontDescriptor")
        .ok()
        .and_then(|obj| resolve(doc, obj).as_dict().ok())?;
    descriptor
        .get(b"MissingWidth")
        .ok()
        .and_then(|obj| number(resolve(doc, obj)))
}

fn simple_widths(doc: &Document, font: &Dictionary) -> Widths {
    let first_char = font
        .get(b"FirstChar")
        .ok()
        .and_then(|obj| number(resolve(doc, obj)))
        .unwrap_or(0.0) as u32;
    let widths = font
        .get(b"Widths")
        .ok()
        .and_then(|obj| resolve(doc, obj).as_array().ok())
        .map(|array| {
            array
                .iter()
                .map(|w| number(resolve(doc, w)).unwrap_or(0.0))
                .collect()
        })
        .unwrap_or_default();

    let base_font = name_of(doc, font, b"BaseFont").unwrap_or_default();
    let missing = descriptor_missing_width(doc, font).unwrap_or(
        // the Courier family is monospaced; other standard fonts are estimated
        if base_font.contains("Courier") {
            600.0
        } else {
            DEFAULT_SIMPLE_WIDTH
        },
    );

    Widths::Simple {
        first_char,
        widths,
        missing,
    }
}

fn cid_widths(doc: &Document, font: &Dictionary) -> Widths {
    let descendant = font
        .get(b"DescendantFonts")
        .ok()
        .and_then(|obj| resolve(doc, obj).as_array().ok())
        .and_then(|array| array.first())
        .and_then(|obj| resolve(doc, obj).as_dict().ok());

    let Some(descendant) = descendant else {
        return Widths::Cid {
            widths: HashMap::new(),
            default: DEFAULT_CID_WIDTH,
        };
    };

    let default = descendant
        .get(b"DW")
        .ok()
        .and_then(|obj| number(resolve(doc, obj)))
        .unwrap_or(DEFAULT_CID_WIDTH);

    let mut widths = HashMap::new();
    let entries = descendant
        .get(b"W")
        .ok()
        .and_then(|obj| resolve(doc, obj).as_array().ok());

    if let Some(entries) = entries {
        // `c [w1 w2 ...]` or `c_first c_last w`
        let mut i = 0;
        while i < entries.len() {
            let Some(first) = number(resolve(doc, &entries[i])) else {
                break;
            };
            let first = first as u32;
            match entries.get(i + 1).map(|obj| resolve(doc, obj)) {
                Some(Object::Array(list)) => {
                    for (offset, w) in list.iter().enumerate() {
                        if let Some(w) = number(resolve(doc, w)) {
                            widths.insert(first + offset as u32, w);
                        }
                    }
                    i += 2;
                }
                Some(last) => {
                    let last = number(last).unwrap_or(first as f32) as u32;
                    let w = entries
                        .get(i + 2)
                        .and_then(|obj| number(resolve(doc, obj)))
                        .unwrap_or(default);
                    if last >= first && last - first <= 0xFFFF {
                        for code in first..=last {
                            widths.insert(code, w);
                        }
                    }
                    i += 3;
                }
                None => break,
            }
        }
    }

    Widths::Cid { widths, default }
}

fn simple_encoding(doc: &Document, font: &Dictionary) -> Vec<Option<char>> {
    let mut table = win_ansi();

    let Some(encoding) = font.get(b"Encoding").ok().map(|obj| resolve(doc, obj)) else {
        return table;
    };
    let Object::Dictionary(encoding) = encoding else {
        return table;
    };
    let Some(differences) = encoding
        .get(b"Differences")
        .ok()
        .and_then(|obj| resolve(doc, obj).as_array().ok())
    else {
        return table;
    };

    let mut code = 0usize;
    for item in differences {
        match resolve(doc, item) {
            Object::Integer(start) => code = (*start).clamp(0, 255) as usize,
            Object::Name(name) => {
                if code < table.len() {
                    table[code] = glyph_name_char(&String::from_utf8_lossy(name));
                }
                code += 1;
            }
            _ => {}
        }
    }

    table
}

/// WinAnsi: Latin-1 with the Windows-1252 additions in 0x80..0x9F
fn win_ansi() -> Vec<Option<char>> {
    const HIGH: [Option<char>; 32] = [
        Some('€'), None, Some('‚'), Some('ƒ'), Some('„'), Some('…'), Some('†'), Some('‡'),
        Some('ˆ'), Some('‰'), Some('Š'), Some('‹'), Some('Œ'), None, Some('Ž'), None,
        None, Some('‘'), Some('’'), Some('“'), Some('”'), Some('•'), Some('–'), Some('—'),
        Some('˜'), Some('™'), Some('š'), Some('›'), Some('œ'), None, Some('ž'), Some('Ÿ'),
    ];

    (0u32..256)
        .map(|code| match code {
            0x20..=0x7E | 0xA0..=0xFF => char::from_u32(code),
            0x80..=0x9F => HIGH[(code - 0x80) as usize],
            _ => None,
        })
        .collect()
}

/// Character for an Adobe glyph name, covering the names `Differences`
/// arrays use in practice
fn glyph_name_char(name: &str) -> Option<char> {
    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Some(c);
    }
    if let Some(hex) = name.strip_prefix("uni").filter(|h| h.len() == 4) {
        return u32::from_str_radix(hex, 16).ok().and_then(char::from_u32);
    }

    const DIGITS: [&str; 10] = [
        "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine",
    ];
    if let Some(d) = DIGITS.iter().position(|d| *d == name) {
        return char::from_digit(d as u32, 10);
    }

    Some(match name {
        "space" | "nbspace" => ' ',
        "period" => '.',
        "comma" => ',',
        "hyphen" | "minus" => '-',
        "colon" => ':',
        "semicolon" => ';',
        "quoteright" | "quotesingle" => '\'',
        "parenleft" => '(',
        "parenright" => ')',
        "slash" => '/',
        "at" => '@',
        "ampersand" => '&',
        "endash" => '–',
        "emdash" => '—',
        "bullet" => '•',
        "eacute" => 'é',
        "egrave" => 'è',
        "adieresis" => 'ä',
        "odieresis" => 'ö',
        "udieresis" => 'ü',
        "germandbls" => 'ß',
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{Stream, dictionary};

    #[test]
    fn test_fallback_decodes_latin1() {
        let glyphs = FontDecoder::fallback().glyphs(b"Jo \xe9");
        let text: String = glyphs.iter().map(|g| g.text.as_str()).collect();

        assert_eq!(text, "Jo é");
        assert_eq!(glyphs.len(), 4);
        assert!(glyphs[2].is_space);
        assert_eq!(glyphs[3].range, 3..4);
    }

    #[test]
    fn test_simple_widths_and_differences() {
        let doc = Document::with_version("1.5");
        let font = dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "FirstChar" => 65,
            "Widths" => vec![Object::Integer(667), Object::Integer(611)],
            "Encoding" => dictionary! {
                "Differences" => vec![Object::Integer(66), "eacute".into()],
            },
        };
        let decoder = FontDecoder::from_dict(&doc, &font);
        let glyphs = decoder.glyphs(b"ABC");

        assert_eq!(glyphs[0].text, "A");
        assert_eq!(glyphs[0].width, 667.0);
        assert_eq!(glyphs[1].text, "é");
        assert_eq!(glyphs[1].width, 611.0);
        assert_eq!(glyphs[2].width, DEFAULT_SIMPLE_WIDTH);
    }

    #[test]
    fn test_courier_is_monospaced() {
        let doc = Document::with_version("1.5");
        let font = dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        };
        let glyphs = FontDecoder::from_dict(&doc, &font).glyphs(b"ab");
        assert!(glyphs.iter().all(|g| g.width == 600.0));
    }

    #[test]
    fn test_type0_with_to_unicode() {
        let mut doc = Document::with_version("1.5");
        let cmap = doc.add_object(Stream::new(
            dictionary! {},
            b"1 begincodespacerange <0000> <FFFF> endcodespacerange \
              1 beginbfrange <0010> <0012> <004A> endbfrange"
                .to_vec(),
        ));
        let font = dictionary! {
            "Type" => "Font",
            "Subtype" => "Type0",
            "BaseFont" => "Custom",
            "Encoding" => "Identity-H",
            "ToUnicode" => cmap,
            "DescendantFonts" => vec![Object::Dictionary(dictionary! {
                "Type" => "Font",
                "Subtype" => "CIDFontType2",
                "DW" => 900,
                "W" => vec![
                    Object::Integer(16),
                    Object::Array(vec![Object::Integer(700)]),
                    Object::Integer(17),
                    Object::Integer(18),
                    Object::Integer(550),
                ],
            })],
        };

        let glyphs = FontDecoder::from_dict(&doc, &font).glyphs(&[0x00, 0x10, 0x00, 0x11, 0x00, 0x20]);
        assert_eq!(glyphs.len(), 3);
        assert_eq!(glyphs[0].text, "J");
        assert_eq!(glyphs[1].text, "K");
        assert_eq!(glyphs[2].text, "");
        assert_eq!(glyphs[0].width, 700.0);
        assert_eq!(glyphs[1].width, 550.0);
        assert_eq!(glyphs[2].width, 900.0);
        assert_eq!(glyphs[1].range, 2..4);
    }

    #[test]
    fn test_empty_codespace_bound_still_advances() {
        let mut doc = Document::with_version("1.5");
        let cmap = doc.add_object(Stream::new(
            dictionary! {},
            b"1 begincodespacerange <> <FF> endcodespacerange \
              1 beginbfchar <41> <0041> endbfchar"
                .to_vec(),
        ));
        let font = dictionary! {
            "Type" => "Font",
            "Subtype" => "TrueType",
            "BaseFont" => "Broken",
            "ToUnicode" => cmap,
        };

        let glyphs = FontDecoder::from_dict(&doc, &font).glyphs(b"AB");
        assert_eq!(glyphs.len(), 2);
        assert_eq!(glyphs[0].text, "A");
        assert_eq!(glyphs[1].range, 1..2);
    }
}
