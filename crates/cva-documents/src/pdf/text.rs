//! Content stream walker
//!
//! Replays the text and graphics state operators of a page and places every
//! shown glyph in user space. The same layout drives text extraction and
//! redaction, so a string found in the extracted text can always be traced
//! back to the glyphs that produced it.

use std::collections::HashMap;
use std::ops::Range;

use lopdf::Object;
use lopdf::content::Operation;

use super::fonts::FontDecoder;
use super::number;

/// Row-vector affine matrix `[a b c d e f]`
pub(crate) type Matrix = [f32; 6];

pub(crate) const IDENTITY: Matrix = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

pub(crate) fn multiply(l: &Matrix, r: &Matrix) -> Matrix {
    [
        l[0] * r[0] + l[1] * r[2],
        l[0] * r[1] + l[1] * r[3],
        l[2] * r[0] + l[3] * r[2],
        l[2] * r[1] + l[3] * r[3],
        l[4] * r[0] + l[5] * r[2] + r[4],
        l[4] * r[1] + l[5] * r[3] + r[5],
    ]
}

pub(crate) fn transform(m: &Matrix, x: f32, y: f32) -> (f32, f32) {
    (x * m[0] + y * m[2] + m[4], x * m[1] + y * m[3] + m[5])
}

fn translation(tx: f32, ty: f32) -> Matrix {
    [1.0, 0.0, 0.0, 1.0, tx, ty]
}

/// A glyph shown on the page
#[derive(Debug, Clone)]
pub(crate) struct PlacedGlyph {
    /// Index of the showing operator in the page's operations
    pub op_index: usize,
    /// Index of the string within a `TJ` array (0 for the other operators)
    pub element: usize,
    pub range: Range<usize>,
    pub text: String,
    /// Horizontal displacement in thousandths of unscaled text space, the
    /// unit of `TJ` adjustments
    pub displacement: f32,
    /// Axis-aligned box in user space: `[x0, y0, x1, y1]`
    pub bbox: [f32; 4],
    origin: (f32, f32),
    end: (f32, f32),
    size: f32,
}

#[derive(Debug, Clone)]
struct GraphicsState {
    ctm: Matrix,
    char_spacing: f32,
    word_spacing: f32,
    horizontal_scale: f32,
    leading: f32,
    font: Option<Vec<u8>>,
    font_size: f32,
    rise: f32,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            ctm: IDENTITY,
            char_spacing: 0.0,
            word_spacing: 0.0,
            horizontal_scale: 1.0,
            leading: 0.0,
            font: None,
            font_size: 0.0,
            rise: 0.0,
        }
    }
}

/// Placed glyphs of one page plus the text they spell
#[derive(Debug, Default)]
pub(crate) struct PageLayout {
    pub glyphs: Vec<PlacedGlyph>,
    pub text: String,
    /// For every char of `text`, the glyph it came from (`None` for
    /// inferred spaces and line breaks)
    pub sources: Vec<Option<usize>>,
}

struct Walker<'a> {
    fonts: &'a HashMap<Vec<u8>, FontDecoder>,
    fallback: FontDecoder,
    state: GraphicsState,
    stack: Vec<GraphicsState>,
    text_matrix: Matrix,
    line_matrix: Matrix,
    glyphs: Vec<PlacedGlyph>,
}

impl<'a> Walker<'a> {
    fn new(fonts: &'a HashMap<Vec<u8>, FontDecoder>) -> Self {
        Self {
            fonts,
            fallback: FontDecoder::fallback(),
            state: GraphicsState::default(),
            stack: Vec::new(),
            text_matrix: IDENTITY,
            line_matrix: IDENTITY,
            glyphs: Vec::new(),
        }
    }

    fn next_line(&mut self, tx: f32, ty: f32) {
        self.line_matrix = multiply(&translation(tx, ty), &self.line_matrix);
        self.text_matrix = self.line_matrix;
    }

    fn operation(&mut self, op_index: usize, op: &Operation) {
        let nums: Vec<f32> = op.operands.iter().filter_map(number).collect();
        let num = |i: usize| nums.get(i).copied().unwrap_or(0.0);

        match op.operator.as_str() {
            "q" => self.stack.push(self.state.clone()),
            "Q" => {
                if let Some(state) = self.stack.pop() {
                    self.state = state;
                }
            }
            "cm" if nums.len() == 6 => {
                let m = [num(0), num(1), num(2), num(3), num(4), num(5)];
                self.state.ctm = multiply(&m, &self.state.ctm);
            }
            "BT" => {
                self.text_matrix = IDENTITY;
                self.line_matrix = IDENTITY;
            }
            "Tc" => self.state.char_spacing = num(0),
            "Tw" => self.state.word_spacing = num(0),
            "Tz" => self.state.horizontal_scale = num(0) / 100.0,
            "TL" => self.state.leading = num(0),
            "Ts" => self.state.rise = num(0),
            "Tf" => {
                if let Some(Object::Name(name)) = op.operands.first() {
                    self.state.font = Some(name.clone());
                }
                self.state.font_size = nums.last().copied().unwrap_or(0.0);
            }
            "Td" => self.next_line(num(0), num(1)),
            "TD" => {
                self.state.leading = -num(1);
                self.next_line(num(0), num(1));
            }
            "Tm" if nums.len() == 6 => {
                self.line_matrix = [num(0), num(1), num(2), num(3), num(4), num(5)];
                self.text_matrix = self.line_matrix;
            }
            "T*" => self.next_line(0.0, -self.state.leading),
            "Tj" => {
                if let Some(Object::String(bytes, _)) = op.operands.first() {
                    self.show(op_index, 0, bytes);
                }
            }
            "'" => {
                self.next_line(0.0, -self.state.leading);
                if let Some(Object::String(bytes, _)) = op.operands.first() {
                    self.show(op_index, 0, bytes);
                }
            }
            "\"" => {
                self.state.word_spacing = num(0);
                self.state.char_spacing = num(1);
                self.next_line(0.0, -self.state.leading);
                if let Some(Object::String(bytes, _)) = op.operands.get(2) {
                    self.show(op_index, 0, bytes);
                }
            }
            "TJ" => {
                if let Some(Object::Array(items)) = op.operands.first() {
                    for (element, item) in items.iter().enumerate() {
                        match item {
                            Object::String(bytes, _) => self.show(op_index, element, bytes),
                            other => {
                                let adjust = number(other).unwrap_or(0.0);
                                let tx = -adjust / 1000.0
                                    * self.state.font_size
                                    * self.state.horizontal_scale;
                                self.text_matrix =
                                    multiply(&translation(tx, 0.0), &self.text_matrix);
                            }
                        }
                    }
                }
            }
            _ => {}
        }
    }

    fn show(&mut self, op_index: usize, element: usize, bytes: &[u8]) {
        let font = self
            .state
            .font
            .as_ref()
            .and_then(|name| self.fonts.get(name))
            .unwrap_or(&self.fallback);
        let decoded = font.glyphs(bytes);

        let size = self.state.font_size;
        let scale = self.state.horizontal_scale;
        let rise = self.state.rise;

        for glyph in decoded {
            let spacing = self.state.char_spacing
                + if glyph.is_space {
                    self.state.word_spacing
                } else {
                    0.0
                };
            let tx = (glyph.width / 1000.0 * size + spacing) * scale;

            let render = multiply(&self.text_matrix, &self.state.ctm);
            let origin = transform(&render, 0.0, rise);
            let end = transform(&render, tx, rise);
            let corners = [
                transform(&render, 0.0, rise - 0.25 * size),
                transform(&render, tx, rise - 0.25 * size),
                transform(&render, 0.0, rise + 0.85 * size),
                transform(&render, tx, rise + 0.85 * size),
            ];
            let bbox = corners.iter().fold(
                [f32::MAX, f32::MAX, f32::MIN, f32::MIN],
                |b, (x, y)| [b[0].min(*x), b[1].min(*y), b[2].max(*x), b[3].max(*y)],
            );
            let device_size = size * render[2].hypot(render[3]);

            let displacement = if size * scale != 0.0 {
                tx / (size * scale) * 1000.0
            } else {
                glyph.width
            };

            self.glyphs.push(PlacedGlyph {
                op_index,
                element,
                range: glyph.range,
                text: glyph.text,
                displacement,
                bbox,
                origin,
                end,
                size: device_size.abs(),
            });

            self.text_matrix = multiply(&translation(tx, 0.0), &self.text_matrix);
        }
    }
}

/// Place every glyph of `operations` and assemble the page text
pub(crate) fn layout(operations: &[Operation], fonts: &HashMap<Vec<u8>, FontDecoder>) -> PageLayout {
    let mut walker = Walker::new(fonts);
    for (index, op) in operations.iter().enumerate() {
        walker.operation(index, op);
    }

    let glyphs = walker.glyphs;
    let mut text = String::new();
    let mut sources = Vec::new();
    let mut previous: Option<&PlacedGlyph> = None;

    for (index, glyph) in glyphs.iter().enumerate() {
        if glyph.text.is_empty() {
            continue;
        }

        if let Some(prev) = previous {
            let size = prev.size.max(glyph.size).max(1e-3);
            let same_line = (glyph.origin.1 - prev.end.1).abs() <= 0.5 * size;
            let ends_blank = text.ends_with(char::is_whitespace);
            let starts_blank = glyph.text.starts_with(char::is_whitespace);

            if !same_line {
                text.push('\n');
                sources.push(None);
            } else if glyph.origin.0 - prev.end.0 > 0.2 * size && !ends_blank && !starts_blank {
                text.push(' ');
                sources.push(None);
            }
        }

        for c in glyph.text.chars() {
            text.push(c);
            sources.push(Some(index));
        }
        previous = Some(glyph);
    }

    PageLayout {
        glyphs,
        text,
        sources,
    }
}
