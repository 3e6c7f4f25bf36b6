//! Redaction target extraction
//!
//! Turns recognizer output into the set of literal strings that must be
//! obscured in a document: every person span, plus every span naming an
//! educational institution.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

use crate::{EntityRecognizer, Result};

/// Substrings (lowercase) that mark an entity as an educational institution
pub const INSTITUTION_KEYWORDS: [&str; 6] = [
    "university",
    "college",
    "institute",
    "school",
    "faculty",
    "academy",
];

/// Literal substring test, no token boundaries ("schoolmaster" matches "school")
pub fn is_institution(text: &str) -> bool {
    let lowered = text.to_lowercase();
    INSTITUTION_KEYWORDS
        .iter()
        .any(|keyword| lowered.contains(keyword))
}

/// Distinct trimmed literals, kept in first-seen order for display
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct RedactionTargets {
    ordered: Vec<String>,
    seen: HashSet<String>,
}

impl RedactionTargets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a literal after trimming. Empty literals are rejected.
    /// Returns true if the literal was not already present.
    pub fn insert(&mut self, literal: &str) -> bool {
        let trimmed = literal.trim();
        if trimmed.is_empty() || self.seen.contains(trimmed) {
            return false;
        }
        self.seen.insert(trimmed.to_string());
        self.ordered.push(trimmed.to_string());
        true
    }

    pub fn remove(&mut self, literal: &str) -> bool {
        let trimmed = literal.trim();
        if !self.seen.remove(trimmed) {
            return false;
        }
        self.ordered.retain(|t| t != trimmed);
        true
    }

    pub fn contains(&self, literal: &str) -> bool {
        self.seen.contains(literal)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ordered.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.ordered
    }
}

impl From<Vec<String>> for RedactionTargets {
    fn from(literals: Vec<String>) -> Self {
        literals.iter().map(String::as_str).collect()
    }
}

impl From<RedactionTargets> for Vec<String> {
    fn from(targets: RedactionTargets) -> Self {
        targets.ordered
    }
}

impl<'a> FromIterator<&'a str> for RedactionTargets {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut targets = RedactionTargets::new();
        for literal in iter {
            targets.insert(literal);
        }
        targets
    }
}

impl<'a> Extend<&'a str> for RedactionTargets {
    fn extend<I: IntoIterator<Item = &'a str>>(&mut self, iter: I) {
        for literal in iter {
            self.insert(literal);
        }
    }
}

impl<'a> IntoIterator for &'a RedactionTargets {
    type Item = &'a str;
    type IntoIter = std::iter::Map<std::slice::Iter<'a, String>, fn(&'a String) -> &'a str>;

    fn into_iter(self) -> Self::IntoIter {
        self.ordered
            .iter()
            .map(String::as_str as fn(&'a String) -> &'a str)
    }
}

/// Run the recognizer and keep person and institution spans
pub fn detect(recognizer: &dyn EntityRecognizer, text: &str) -> Result<RedactionTargets> {
    let mut targets = RedactionTargets::new();
    if text.is_empty() {
        return Ok(targets);
    }

    let entities = recognizer.recognize(text)?;
    debug!(
        recognizer = recognizer.name(),
        entities = entities.len(),
        "Recognized entities"
    );

    for entity in &entities {
        if entity.label.is_person() || is_institution(&entity.text) {
            targets.insert(&entity.text);
        }
    }

    Ok(targets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Entity, EntityLabel, Error};

    struct FixedRecognizer(Vec<(&'static str, &'static str)>);

    impl EntityRecognizer for FixedRecognizer {
        fn recognize(&self, text: &str) -> Result<Vec<Entity>> {
            Ok(self
                .0
                .iter()
                .map(|(span, label)| {
                    let start = text.find(span).unwrap_or(0);
                    Entity::new(*span, label.parse().unwrap(), start, start + span.len())
                })
                .collect())
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    struct FailingRecognizer;

    impl EntityRecognizer for FailingRecognizer {
        fn recognize(&self, _text: &str) -> Result<Vec<Entity>> {
            Err(Error::Recognizer("model not loaded".to_string()))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    #[test]
    fn test_person_and_institution() {
        let recognizer = FixedRecognizer(vec![
            ("John Smith", "PERSON"),
            ("Springfield University", "ORG"),
        ]);
        let targets = detect(
            &recognizer,
            "John Smith studied at Springfield University.",
        )
        .unwrap();

        assert_eq!(targets.len(), 2);
        assert!(targets.contains("John Smith"));
        assert!(targets.contains("Springfield University"));
    }

    #[test]
    fn test_no_entities() {
        let recognizer = FixedRecognizer(vec![]);
        let targets = detect(&recognizer, "No names or schools here.").unwrap();
        assert!(targets.is_empty());
    }

    #[test]
    fn test_empty_text_skips_recognizer() {
        let targets = detect(&FailingRecognizer, "").unwrap();
        assert!(targets.is_empty());
    }

    #[test]
    fn test_recognizer_error_propagates() {
        let result = detect(&FailingRecognizer, "John Smith");
        assert!(matches!(result, Err(Error::Recognizer(_))));
    }

    #[test]
    fn test_non_person_non_institution_ignored() {
        let recognizer = FixedRecognizer(vec![
            ("Acme Corp", "ORG"),
            ("London", "GPE"),
            ("2019", "DATE"),
        ]);
        let targets = detect(&recognizer, "Acme Corp, London, 2019").unwrap();
        assert!(targets.is_empty());
    }

    #[test]
    fn test_keyword_is_plain_substring() {
        let recognizer = FixedRecognizer(vec![("Schoolmaster Trust", "ORG")]);
        let targets = detect(&recognizer, "Schoolmaster Trust").unwrap();
        assert!(targets.contains("Schoolmaster Trust"));
    }

    #[test]
    fn test_institution_keyword_under_any_label() {
        let recognizer = FixedRecognizer(vec![
            ("Springfield University", "ORG"),
            ("springfield university", "MISC"),
        ]);
        let targets = detect(
            &recognizer,
            "Springfield University and springfield university",
        )
        .unwrap();

        assert_eq!(targets.len(), 2);
        assert!(targets.contains("springfield university"));
    }

    #[test]
    fn test_person_label_casing() {
        let upper = FixedRecognizer(vec![("Ada Lovelace", "PERSON")]);
        let lower = FixedRecognizer(vec![("Ada Lovelace", "person")]);
        let text = "Ada Lovelace";

        assert_eq!(detect(&upper, text).unwrap(), detect(&lower, text).unwrap());
    }

    #[test]
    fn test_whitespace_trimmed_and_empty_dropped() {
        let recognizer = FixedRecognizer(vec![("  John Smith\n", "PERSON"), ("   ", "PERSON")]);
        let targets = detect(&recognizer, "  John Smith\n   ").unwrap();

        assert_eq!(targets.as_slice(), ["John Smith".to_string()]);
    }

    #[test]
    fn test_dedup_is_case_sensitive() {
        let recognizer = FixedRecognizer(vec![
            ("John Smith", "PERSON"),
            ("john smith", "PERSON"),
            ("John Smith", "PERSON"),
        ]);
        let targets = detect(&recognizer, "John Smith john smith John Smith").unwrap();

        assert_eq!(
            targets.as_slice(),
            ["John Smith".to_string(), "john smith".to_string()]
        );
    }

    #[test]
    fn test_substring_targets_stay_distinct() {
        let recognizer = FixedRecognizer(vec![("Dr John Smith", "PERSON"), ("John Smith", "PERSON")]);
        let targets = detect(&recognizer, "Dr John Smith").unwrap();

        assert_eq!(targets.len(), 2);
    }

    #[test]
    fn test_detect_is_idempotent() {
        let recognizer = FixedRecognizer(vec![
            ("Jane Doe", "PERSON"),
            ("Royal Academy", "ORG"),
        ]);
        let text = "Jane Doe, Royal Academy";

        assert_eq!(
            detect(&recognizer, text).unwrap(),
            detect(&recognizer, text).unwrap()
        );
    }

    #[test]
    fn test_every_target_satisfies_membership_rule() {
        let recognizer = FixedRecognizer(vec![
            ("Jane Doe", "PERSON"),
            ("Faculty of Law", "ORG"),
            ("Paris", "GPE"),
            ("Google", "ORG"),
        ]);
        let text = "Jane Doe, Faculty of Law, Paris, Google";
        let entities = recognizer.recognize(text).unwrap();
        let targets = detect(&recognizer, text).unwrap();

        for target in &targets {
            assert!(!target.trim().is_empty());
            let from_person = entities
                .iter()
                .any(|e| e.label == EntityLabel::Person && e.text.trim() == target);
            assert!(from_person || is_institution(target));
        }
    }

    #[test]
    fn test_targets_serde_roundtrip() {
        let targets: RedactionTargets = ["B", "A", "B", " "].into_iter().collect();
        let json = serde_json::to_string(&targets).unwrap();
        assert_eq!(json, r#"["B","A"]"#);

        let parsed: RedactionTargets = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, targets);
    }

    #[test]
    fn test_remove_target() {
        let mut targets: RedactionTargets = ["Alice", "Bob"].into_iter().collect();
        assert!(targets.remove("Alice"));
        assert!(!targets.remove("Alice"));
        assert_eq!(targets.as_slice(), ["Bob".to_string()]);
    }
}
