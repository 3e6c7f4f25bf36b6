//! Literal occurrence masking
//!
//! Every redactor works the same way: lay the text of one unit (a PDF page,
//! a DOCX paragraph) out as characters, find every target in it, and
//! obscure the union of the matched characters. Occurrences of each target
//! are located against the original text, so redacting one target never
//! hides an overlapping one.

use crate::RedactionTargets;

/// Per-character mask over one unit of text plus per-target hit counts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccurrenceMask {
    masked: Vec<bool>,
    hits: Vec<usize>,
}

impl OccurrenceMask {
    /// Mask indexed by character position (not byte offset)
    pub fn is_masked(&self, char_index: usize) -> bool {
        self.masked.get(char_index).copied().unwrap_or(false)
    }

    pub fn any(&self) -> bool {
        self.masked.iter().any(|m| *m)
    }

    pub fn masked_count(&self) -> usize {
        self.masked.iter().filter(|m| **m).count()
    }

    pub fn len(&self) -> usize {
        self.masked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.masked.is_empty()
    }

    /// Hit counts in the iteration order of the targets that built the mask
    pub fn hits(&self) -> &[usize] {
        &self.hits
    }

    /// Apply the mask to `text`, replacing each masked character with `mask_char`
    pub fn apply(&self, text: &str, mask_char: char) -> String {
        text.chars()
            .enumerate()
            .map(|(i, c)| if self.is_masked(i) { mask_char } else { c })
            .collect()
    }
}

/// Find all leftmost non-overlapping occurrences of every target in `text`
pub fn mask_occurrences(text: &str, targets: &RedactionTargets) -> OccurrenceMask {
    // byte offset -> char index, with one trailing entry for text.len()
    let mut char_at = vec![0usize; text.len() + 1];
    let mut char_count = 0;
    for (index, (offset, c)) in text.char_indices().enumerate() {
        for slot in &mut char_at[offset..offset + c.len_utf8()] {
            *slot = index;
        }
        char_count = index + 1;
    }
    char_at[text.len()] = char_count;

    let mut masked = vec![false; char_count];
    let mut hits = Vec::with_capacity(targets.len());

    for target in targets {
        let mut count = 0;
        for (offset, matched) in text.match_indices(target) {
            let first = char_at[offset];
            let last = char_at[offset + matched.len()];
            for slot in &mut masked[first..last] {
                *slot = true;
            }
            count += 1;
        }
        hits.push(count);
    }

    OccurrenceMask { masked, hits }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn targets(literals: &[&str]) -> RedactionTargets {
        literals.iter().copied().collect()
    }

    #[test]
    fn test_single_target() {
        let mask = mask_occurrences("Hi John Smith!", &targets(&["John Smith"]));
        assert_eq!(mask.apply("Hi John Smith!", '█'), "Hi ██████████!");
        assert_eq!(mask.hits(), &[1]);
    }

    #[test]
    fn test_every_occurrence_is_masked() {
        let text = "Ann met Ann";
        let mask = mask_occurrences(text, &targets(&["Ann"]));
        assert_eq!(mask.apply(text, '#'), "### met ###");
        assert_eq!(mask.hits(), &[2]);
    }

    #[test]
    fn test_short_target_masks_inside_longer_word() {
        let text = "John";
        let mask = mask_occurrences(text, &targets(&["Jo"]));
        assert_eq!(mask.apply(text, '█'), "██hn");
    }

    #[test]
    fn test_overlapping_targets_are_independent() {
        let text = "Mary Ann Lee";
        let forward = mask_occurrences(text, &targets(&["Mary Ann", "Ann Lee"]));
        let reverse = mask_occurrences(text, &targets(&["Ann Lee", "Mary Ann"]));

        assert_eq!(forward.apply(text, '█'), "████████████");
        assert_eq!(forward.apply(text, '█'), reverse.apply(text, '█'));
    }

    #[test]
    fn test_non_overlapping_within_target() {
        let text = "aaa";
        let mask = mask_occurrences(text, &targets(&["aa"]));
        assert_eq!(mask.apply(text, '█'), "██a");
        assert_eq!(mask.hits(), &[1]);
    }

    #[test]
    fn test_multibyte_characters() {
        let text = "Zoë Müller — Universität Zürich";
        let mask = mask_occurrences(text, &targets(&["Müller", "Zürich"]));
        let redacted = mask.apply(text, '█');

        assert_eq!(redacted, "Zoë ██████ — Universität ██████");
        assert_eq!(redacted.chars().count(), text.chars().count());
    }

    #[test]
    fn test_no_targets() {
        let mask = mask_occurrences("John", &RedactionTargets::new());
        assert!(!mask.any());
        assert_eq!(mask.len(), 4);
    }

    #[test]
    fn test_case_sensitive() {
        let mask = mask_occurrences("john smith", &targets(&["John Smith"]));
        assert!(!mask.any());
        assert_eq!(mask.hits(), &[0]);
    }
}
