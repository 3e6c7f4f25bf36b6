use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::Result;

/// Default model shipped with the binary
pub const BUNDLED_MODEL: &str = include_str!("../models/default-model.json");

/// On-disk recognizer model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NerModel {
    pub version: u32,
    #[serde(default)]
    pub given_names: Vec<String>,
    #[serde(default)]
    pub honorifics: Vec<String>,
    #[serde(default)]
    pub org_cues: Vec<String>,
    #[serde(default)]
    pub connectors: Vec<String>,
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default)]
    pub stopwords: Vec<String>,
    #[serde(default)]
    pub name_labels: Vec<String>,
}

impl NerModel {
    pub fn bundled() -> Result<Self> {
        Self::from_json(BUNDLED_MODEL)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Lowercased lookup sets compiled from a model
#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    pub given_names: HashSet<String>,
    pub honorifics: HashSet<String>,
    pub org_cues: HashSet<String>,
    pub connectors: HashSet<String>,
    pub locations: HashSet<String>,
    pub stopwords: HashSet<String>,
    pub name_labels: HashSet<String>,
}

impl From<&NerModel> for Lexicon {
    fn from(model: &NerModel) -> Self {
        fn compile(words: &[String]) -> HashSet<String> {
            words
                .iter()
                .map(|w| w.trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect()
        }

        Self {
            given_names: compile(&model.given_names),
            honorifics: compile(&model.honorifics),
            org_cues: compile(&model.org_cues),
            connectors: compile(&model.connectors),
            locations: compile(&model.locations),
            stopwords: compile(&model.stopwords),
            name_labels: compile(&model.name_labels),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_model_parses() {
        let model = NerModel::bundled().unwrap();
        assert_eq!(model.version, 1);
        assert!(model.given_names.iter().any(|n| n == "john"));
        assert!(model.org_cues.iter().any(|c| c == "university"));
    }

    #[test]
    fn test_lexicon_lowercases() {
        let model = NerModel::from_json(
            r#"{"version": 1, "given_names": [" Alice ", "BOB", ""], "honorifics": ["Dr"]}"#,
        )
        .unwrap();
        let lexicon = Lexicon::from(&model);

        assert!(lexicon.given_names.contains("alice"));
        assert!(lexicon.given_names.contains("bob"));
        assert_eq!(lexicon.given_names.len(), 2);
        assert!(lexicon.honorifics.contains("dr"));
        assert!(lexicon.org_cues.is_empty());
    }

    #[test]
    fn test_missing_version_is_invalid() {
        assert!(NerModel::from_json(r#"{"given_names": []}"#).is_err());
    }
}
