//! ToUnicode CMap parsing

use std::collections::HashMap;

/// Largest `bfrange` expanded entry by entry
const MAX_RANGE: u32 = 0xFFFF;

#[derive(Debug, PartialEq)]
enum Token {
    Hex(Vec<u8>),
    Word(String),
    ArrayOpen,
    ArrayClose,
}

fn tokenize(data: &[u8]) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < data.len() {
        let b = data[i];
        match b {
            b'%' => {
                while i < data.len() && data[i] != b'\n' && data[i] != b'\r' {
                    i += 1;
                }
            }
            b'<' if data.get(i + 1) == Some(&b'<') => i += 2,
            b'>' if data.get(i + 1) == Some(&b'>') => i += 2,
            b'<' => {
                let start = i + 1;
                let end = data[start..]
                    .iter()
                    .position(|c| *c == b'>')
                    .map_or(data.len(), |p| start + p);
                tokens.push(Token::Hex(decode_hex(&data[start..end])));
                i = end + 1;
            }
            b'[' => {
                tokens.push(Token::ArrayOpen);
                i += 1;
            }
            b']' => {
                tokens.push(Token::ArrayClose);
                i += 1;
            }
            b'(' => {
                // literal strings only appear in header dictionaries
                let mut depth = 0;
                while i < data.len() {
                    match data[i] {
                        b'\\' => i += 1,
                        b'(' => depth += 1,
                        b')' => {
                            depth -= 1;
                            if depth == 0 {
                                break;
                            }
                        }
                        _ => {}
                    }
                    i += 1;
                }
                i += 1;
            }
            _ if b.is_ascii_whitespace() => i += 1,
            _ => {
                let start = i;
                while i < data.len()
                    && !data[i].is_ascii_whitespace()
                    && !b"<>[]()%".contains(&data[i])
                {
                    i += 1;
                }
                if i == start {
                    i += 1;
                    continue;
                }
                tokens.push(Token::Word(
                    String::from_utf8_lossy(&data[start..i]).into_owned(),
                ));
            }
        }
    }

    tokens
}

fn decode_hex(raw: &[u8]) -> Vec<u8> {
    let digits: Vec<u8> = raw
        .iter()
        .filter_map(|c| (*c as char).to_digit(16).map(|d| d as u8))
        .collect();
    digits
        .chunks(2)
        .map(|pair| (pair[0] << 4) | pair.get(1).copied().unwrap_or(0))
        .collect()
}

fn code_value(bytes: &[u8]) -> u32 {
    bytes.iter().fold(0u32, |acc, b| (acc << 8) | u32::from(*b))
}

fn utf16_text(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks(2)
        .map(|pair| match pair {
            [hi, lo] => u16::from_be_bytes([*hi, *lo]),
            [single] => u16::from(*single),
            _ => 0,
        })
        .collect();
    String::from_utf16_lossy(&units)
}

/// Destination for the `offset`th code of a range: the last byte pair is
/// incremented
fn offset_destination(base: &[u8], offset: u32) -> String {
    let mut bytes = base.to_vec();
    let len = bytes.len();
    if len >= 2 {
        let last = u16::from_be_bytes([bytes[len - 2], bytes[len - 1]]);
        let next = last.wrapping_add(offset as u16).to_be_bytes();
        bytes[len - 2] = next[0];
        bytes[len - 1] = next[1];
    } else if len == 1 {
        bytes[0] = bytes[0].wrapping_add(offset as u8);
    }
    utf16_text(&bytes)
}

#[derive(Debug, Clone, Copy)]
struct CodespaceRange {
    len: usize,
    low: u32,
    high: u32,
}

/// Code to Unicode mapping of one font
#[derive(Debug, Default, Clone)]
pub(crate) struct ToUnicode {
    codespace: Vec<CodespaceRange>,
    map: HashMap<(usize, u32), String>,
}

impl ToUnicode {
    pub fn parse(data: &[u8]) -> Self {
        let tokens = tokenize(data);
        let mut cmap = ToUnicode::default();
        let mut i = 0;

        while i < tokens.len() {
            let Token::Word(word) = &tokens[i] else {
                i += 1;
                continue;
            };
            i += 1;
            match word.as_str() {
                "begincodespacerange" => {
                    while let (Some(Token::Hex(low)), Some(Token::Hex(high))) =
                        (tokens.get(i), tokens.get(i + 1))
                    {
                        // Codes are 1 to 4 bytes; bounds of unequal length are unusable
                        if (1..=4).contains(&low.len()) && low.len() == high.len() {
                            cmap.codespace.push(CodespaceRange {
                                len: low.len(),
                                low: code_value(low),
                                high: code_value(high),
                            });
                        }
                        i += 2;
                    }
                }
                "beginbfchar" => {
                    while let (Some(Token::Hex(code)), Some(Token::Hex(dst))) =
                        (tokens.get(i), tokens.get(i + 1))
                    {
                        cmap.map
                            .insert((code.len(), code_value(code)), utf16_text(dst));
                        i += 2;
                    }
                }
                "beginbfrange" => {
                    while let (Some(Token::Hex(low)), Some(Token::Hex(high))) =
                        (tokens.get(i), tokens.get(i + 1))
                    {
                        let len = low.len();
                        let (low, high) = (code_value(low), code_value(high));
                        i += 2;
                        match tokens.get(i) {
                            Some(Token::Hex(dst)) => {
                                if high >= low && high - low <= MAX_RANGE {
                                    for code in low..=high {
                                        cmap.map.insert(
                                            (len, code),
                                            offset_destination(dst, code - low),
                                        );
                                    }
                                }
                                i += 1;
                            }
                            Some(Token::ArrayOpen) => {
                                i += 1;
                                let mut code = low;
                                while let Some(Token::Hex(dst)) = tokens.get(i) {
                                    cmap.map.insert((len, code), utf16_text(dst));
                                    code += 1;
                                    i += 1;
                                }
                                if tokens.get(i) == Some(&Token::ArrayClose) {
                                    i += 1;
                                }
                            }
                            _ => break,
                        }
                    }
                }
                _ => {}
            }
        }

        cmap
    }

    /// Length of the code starting at `bytes`, if the codespace defines one
    pub fn code_len(&self, bytes: &[u8]) -> Option<usize> {
        self.codespace
            .iter()
            .filter(|range| range.len <= bytes.len())
            .find(|range| {
                let value = code_value(&bytes[..range.len]);
                value >= range.low && value <= range.high
            })
            .map(|range| range.len)
    }

    pub fn lookup(&self, code: &[u8]) -> Option<&str> {
        self.map
            .get(&(code.len(), code_value(code)))
            .map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
