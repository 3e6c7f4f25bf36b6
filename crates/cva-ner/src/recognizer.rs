//! Gazetteer and rule based entity recognizer
//!
//! Spans are maximal runs of capitalised (or all-caps) words on one line,
//! bridged by lowercase connectors such as "of" or "van". Each span is then
//! labelled from the lexicon: organisation cue words win, then honorifics,
//! locations, and finally person evidence (a known given name, a `Name:`
//! label, or a bare name heading the document).

use cva_core::{Entity, EntityLabel, EntityRecognizer};
use regex::Regex;
use tracing::trace;

use crate::{Lexicon, NerModel};

const TOKEN_PATTERN: &str = r"[\p{L}\p{M}]+(?:['’\-][\p{L}\p{M}]+)*";

/// Connectors that may only join words inside an organisation name, so that
/// "Jane Doe and John Smith" stays two people
const ORG_ONLY_CONNECTORS: [&str; 3] = ["and", "&", "y"];

#[derive(Debug)]
struct Token<'a> {
    text: &'a str,
    lower: String,
    start: usize,
    end: usize,
}

impl Token<'_> {
    fn is_capitalized(&self) -> bool {
        self.text.chars().next().is_some_and(char::is_uppercase)
    }
}

pub struct RuleRecognizer {
    lexicon: Lexicon,
    token_re: Regex,
}

impl RuleRecognizer {
    pub fn new(model: &NerModel) -> Self {
        Self {
            lexicon: Lexicon::from(model),
            token_re: Regex::new(TOKEN_PATTERN).expect("token pattern is valid"),
        }
    }

    fn recognize_line(&self, line: &str, offset: usize, is_header: bool, out: &mut Vec<Entity>) {
        let tokens: Vec<Token> = self
            .token_re
            .find_iter(line)
            .map(|m| Token {
                text: m.as_str(),
                lower: m.as_str().to_lowercase(),
                start: m.start(),
                end: m.end(),
            })
            .collect();

        let mut i = 0;
        while i < tokens.len() {
            if !tokens[i].is_capitalized() {
                i += 1;
                continue;
            }

            let first = i;
            let mut last = i;
            let mut has_cue = self.lexicon.org_cues.contains(&tokens[i].lower);

            while last + 1 < tokens.len() {
                let next = &tokens[last + 1];
                let gap = &line[tokens[last].end..next.start];

                if next.is_capitalized() && self.joinable(gap, &tokens[last]) {
                    if gap.trim() == "&" && !has_cue {
                        break;
                    }
                    last += 1;
                    has_cue |= self.lexicon.org_cues.contains(&next.lower);
                    continue;
                }

                // lowercase connector bridging two capitalised words
                if !next.is_capitalized()
                    && self.lexicon.connectors.contains(&next.lower)
                    && is_word_gap(gap)
                    && let Some(after) = tokens.get(last + 2)
                    && after.is_capitalized()
                    && is_word_gap(&line[next.end..after.start])
                {
                    if ORG_ONLY_CONNECTORS.contains(&next.lower.as_str()) && !has_cue {
                        break;
                    }
                    last += 2;
                    has_cue |= self.lexicon.org_cues.contains(&after.lower);
                    continue;
                }

                break;
            }

            self.classify(line, offset, &tokens[first..=last], is_header, out);
            i = last + 1;
        }
    }

    fn joinable(&self, gap: &str, prev: &Token) -> bool {
        let trimmed = gap.trim();
        if trimmed.is_empty() {
            return is_word_gap(gap);
        }
        if trimmed == "." {
            // initials and abbreviated honorifics: "J. Smith", "Dr. Jones"
            return prev.text.chars().count() == 1 || self.lexicon.honorifics.contains(&prev.lower);
        }
        trimmed == "&"
    }

    fn is_filler(&self, token: &Token) -> bool {
        self.lexicon.stopwords.contains(&token.lower) || self.lexicon.connectors.contains(&token.lower)
    }

    fn follows_name_label(&self, prefix: &str) -> bool {
        let Some(label) = prefix.trim_end().strip_suffix(':') else {
            return false;
        };
        let label = label.trim().to_lowercase();
        self.lexicon
            .name_labels
            .iter()
            .any(|name_label| label.ends_with(name_label.as_str()))
    }

    fn classify(
        &self,
        line: &str,
        offset: usize,
        span: &[Token],
        is_header: bool,
        out: &mut Vec<Entity>,
    ) {
        let mut tokens = span;
        let mut honorific = false;

        while let Some((first, rest)) = tokens.split_first() {
            if rest.is_empty() || !self.lexicon.honorifics.contains(&first.lower) {
                break;
            }
            honorific = true;
            tokens = rest;
        }
        while let Some((first, rest)) = tokens.split_first() {
            if !self.is_filler(first) {
                break;
            }
            tokens = rest;
        }
        while let Some((last, rest)) = tokens.split_last() {
            if !self.is_filler(last) {
                break;
            }
            tokens = rest;
        }

        let (Some(first), Some(last)) = (tokens.first(), tokens.last()) else {
            return;
        };
        let text = &line[first.start..last.end];
        let has_cue = tokens
            .iter()
            .any(|t| self.lexicon.org_cues.contains(&t.lower));

        if tokens.len() == 1 && !honorific && (has_cue || first.text.chars().count() < 2) {
            return;
        }

        let words = tokens.iter().filter(|t| t.is_capitalized()).count();
        let phrase = tokens
            .iter()
            .map(|t| t.lower.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let name_shaped = (2..=4).contains(&words);

        let label = if has_cue {
            EntityLabel::Org
        } else if honorific {
            EntityLabel::Person
        } else if self.lexicon.locations.contains(&phrase) {
            EntityLabel::Gpe
        } else if name_shaped
            && (self.lexicon.given_names.contains(&first.lower)
                || self.follows_name_label(&line[..span[0].start])
                || (is_header && line.trim() == text))
        {
            EntityLabel::Person
        } else {
            EntityLabel::Misc
        };

        trace!(text, label = %label, "Span classified");
        out.push(Entity::new(
            text,
            label,
            offset + first.start,
            offset + last.end,
        ));
    }
}

/// A single space-like character between two words of one name
fn is_word_gap(gap: &str) -> bool {
    let mut chars = gap.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if c.is_whitespace() && c != '\t')
}

impl EntityRecognizer for RuleRecognizer {
    fn recognize(&self, text: &str) -> cva_core::Result<Vec<Entity>> {
        let mut entities = Vec::new();
        let mut offset = 0;
        let mut seen_content = false;

        for line in text.split('\n') {
            let has_content = !line.trim().is_empty();
            let is_header = has_content && !seen_content;
            seen_content |= has_content;

            self.recognize_line(line, offset, is_header, &mut entities);
            offset += line.len() + 1;
        }

        Ok(entities)
    }

    fn name(&self) -> &str {
        "rule-gazetteer"
    }
}
