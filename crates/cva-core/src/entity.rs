use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::Result;

/// Semantic label attached to a recognized span
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntityLabel {
    Person,
    Org,
    Gpe,
    Date,
    Misc,
    Other(String),
}

impl EntityLabel {
    pub fn as_str(&self) -> &str {
        match self {
            EntityLabel::Person => "PERSON",
            EntityLabel::Org => "ORG",
            EntityLabel::Gpe => "GPE",
            EntityLabel::Date => "DATE",
            EntityLabel::Misc => "MISC",
            EntityLabel::Other(label) => label,
        }
    }

    pub fn is_person(&self) -> bool {
        matches!(self, EntityLabel::Person)
    }
}

impl FromStr for EntityLabel {
    type Err = std::convert::Infallible;

    /// Label names from different recognizers are accepted in any casing
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let label = match s.trim().to_ascii_uppercase().as_str() {
            "PERSON" | "PER" | "PEOPLE" => EntityLabel::Person,
            "ORG" | "ORGANIZATION" | "ORGANISATION" => EntityLabel::Org,
            "GPE" | "LOC" | "LOCATION" => EntityLabel::Gpe,
            "DATE" => EntityLabel::Date,
            "MISC" => EntityLabel::Misc,
            _ => EntityLabel::Other(s.trim().to_string()),
        };
        Ok(label)
    }
}

impl fmt::Display for EntityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for EntityLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EntityLabel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        match raw.parse::<EntityLabel>() {
            Ok(label) => Ok(label),
            Err(never) => match never {},
        }
    }
}

/// A span produced by a recognizer over the text it was given
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub text: String,
    pub label: EntityLabel,
    /// Byte offset of the span start in the recognizer input
    pub start: usize,
    /// Byte offset one past the span end
    pub end: usize,
}

impl Entity {
    pub fn new(text: impl Into<String>, label: EntityLabel, start: usize, end: usize) -> Self {
        Self {
            text: text.into(),
            label,
            start,
            end,
        }
    }
}

/// Named-entity recognizer: text in, ordered entity spans out
pub trait EntityRecognizer: Send + Sync {
    fn recognize(&self, text: &str) -> Result<Vec<Entity>>;

    /// Identifier used in logs
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_parsing_ignores_case() {
        assert_eq!("PERSON".parse::<EntityLabel>().unwrap(), EntityLabel::Person);
        assert_eq!("person".parse::<EntityLabel>().unwrap(), EntityLabel::Person);
        assert_eq!("Per".parse::<EntityLabel>().unwrap(), EntityLabel::Person);
        assert_eq!("org".parse::<EntityLabel>().unwrap(), EntityLabel::Org);
        assert_eq!(
            "WORK_OF_ART".parse::<EntityLabel>().unwrap(),
            EntityLabel::Other("WORK_OF_ART".to_string())
        );
    }

    #[test]
    fn test_label_serde() {
        let entity = Entity::new("John Smith", EntityLabel::Person, 0, 10);
        let json = serde_json::to_string(&entity).unwrap();
        assert!(json.contains("\"label\":\"PERSON\""));

        let parsed: Entity = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, entity);
    }
}
