//! Glyph removal and box painting for one page

use std::collections::BTreeMap;

use cva_core::OccurrenceMask;
use lopdf::Object;
use lopdf::content::Operation;

use super::number;
use super::text::{PageLayout, PlacedGlyph};

/// Rewrite a page so the masked glyphs are no longer shown and a filled box
/// covers each masked run
pub(crate) fn redact_operations(
    operations: &[Operation],
    layout: &PageLayout,
    mask: &OccurrenceMask,
    fill: [f32; 3],
) -> Vec<Operation> {
    let mut masked = vec![false; layout.glyphs.len()];
    for (index, source) in layout.sources.iter().enumerate() {
        if let Some(glyph) = source
            && mask.is_masked(index)
        {
            masked[*glyph] = true;
        }
    }

    let mut by_op: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (index, glyph) in layout.glyphs.iter().enumerate() {
        by_op.entry(glyph.op_index).or_default().push(index);
    }
    by_op.retain(|_, glyphs| glyphs.iter().any(|g| masked[*g]));

    let mut out = Vec::with_capacity(operations.len() + 8);
    out.push(Operation::new("q", vec![]));
    for (index, op) in operations.iter().enumerate() {
        match by_op.get(&index) {
            Some(glyphs) => out.extend(rewrite_show(op, glyphs, &layout.glyphs, &masked)),
            None => out.push(op.clone()),
        }
    }
    out.push(Operation::new("Q", vec![]));

    for bbox in masked_boxes(&layout.glyphs, &masked) {
        out.push(Operation::new("q", vec![]));
        out.push(Operation::new(
            "rg",
            fill.iter().map(|c| Object::Real((*c).into())).collect(),
        ));
        out.push(Operation::new(
            "re",
            vec![
                Object::Real(bbox[0].into()),
                Object::Real(bbox[1].into()),
                Object::Real((bbox[2] - bbox[0]).into()),
                Object::Real((bbox[3] - bbox[1]).into()),
            ],
        ));
        out.push(Operation::new("f", vec![]));
        out.push(Operation::new("Q", vec![]));
    }

    out
}

/// Boxes over runs of consecutive masked glyphs of the same operator
fn masked_boxes(glyphs: &[PlacedGlyph], masked: &[bool]) -> Vec<[f32; 4]> {
    let mut boxes: Vec<[f32; 4]> = Vec::new();
    let mut previous: Option<usize> = None;

    for (index, glyph) in glyphs.iter().enumerate() {
        if !masked[index] {
            previous = None;
            continue;
        }
        let b = glyph.bbox;
        match (previous, boxes.last_mut()) {
            (Some(prev), Some(last)) if glyphs[prev].op_index == glyph.op_index => {
                *last = [
                    last[0].min(b[0]),
                    last[1].min(b[1]),
                    last[2].max(b[2]),
                    last[3].max(b[3]),
                ];
            }
            _ => boxes.push(b),
        }
        previous = Some(index);
    }

    boxes
}

/// Add a `TJ` adjustment, folding it into a preceding one
fn push_adjustment(items: &mut Vec<Object>, value: f32) {
    if let Some(last) = items.last_mut()
        && let Some(previous) = number(last)
    {
        *last = Object::Real((previous + value).into());
        return;
    }
    items.push(Object::Real(value.into()));
}

/// Replace a text-showing operator with an equivalent `TJ` that skips the
/// masked glyphs but advances the pen by the same amount
fn rewrite_show(
    op: &Operation,
    op_glyphs: &[usize],
    glyphs: &[PlacedGlyph],
    masked: &[bool],
) -> Vec<Operation> {
    let operands = &op.operands;
    let (mut ops, items): (Vec<Operation>, Vec<Object>) = match op.operator.as_str() {
        "TJ" => match operands.first() {
            Some(Object::Array(items)) => (Vec::new(), items.clone()),
            _ => return vec![op.clone()],
        },
        "Tj" => (Vec::new(), operands.iter().take(1).cloned().collect()),
        "'" => (
            vec![Operation::new("T*", vec![])],
            operands.iter().take(1).cloned().collect(),
        ),
        "\"" if operands.len() == 3 => (
            vec![
                Operation::new("Tw", vec![operands[0].clone()]),
                Operation::new("Tc", vec![operands[1].clone()]),
                Operation::new("T*", vec![]),
            ],
            vec![operands[2].clone()],
        ),
        _ => return vec![op.clone()],
    };

    let mut rewritten = Vec::with_capacity(items.len() + 2);
    for (element, item) in items.iter().enumerate() {
        let Object::String(bytes, format) = item else {
            match number(item) {
                Some(value) => push_adjustment(&mut rewritten, value),
                None => rewritten.push(item.clone()),
            }
            continue;
        };

        let mut kept = Vec::new();
        let mut covered = 0;
        for &index in op_glyphs.iter().filter(|g| glyphs[**g].element == element) {
            let glyph = &glyphs[index];
            if masked[index] {
                if !kept.is_empty() {
                    rewritten.push(Object::String(std::mem::take(&mut kept), format.clone()));
                }
                push_adjustment(&mut rewritten, -glyph.displacement);
            } else {
                kept.extend_from_slice(&bytes[glyph.range.clone()]);
            }
            covered = glyph.range.end;
        }
        kept.extend_from_slice(&bytes[covered.min(bytes.len())..]);
        if !kept.is_empty() {
            rewritten.push(Object::String(kept, format.clone()));
        }
    }

    ops.push(Operation::new("TJ", vec![Object::Array(rewritten)]));
    ops
}
