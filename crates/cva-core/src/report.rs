use serde::{Deserialize, Serialize};

use crate::DocumentFormat;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetHits {
    pub target: String,
    pub occurrences: usize,
}

/// Summary of one redaction pass over a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedactionReport {
    pub format: DocumentFormat,
    pub targets: Vec<TargetHits>,
    /// Pages (PDF) or package parts (DOCX) that were rewritten
    pub units_modified: usize,
    pub units_total: usize,
    pub metadata_scrubbed: bool,
}

impl RedactionReport {
    pub fn new(format: DocumentFormat) -> Self {
        Self {
            format,
            targets: Vec::new(),
            units_modified: 0,
            units_total: 0,
            metadata_scrubbed: false,
        }
    }

    /// Add `count` occurrences for `target`, creating its entry if needed
    pub fn record(&mut self, target: &str, count: usize) {
        match self.targets.iter_mut().find(|hit| hit.target == target) {
            Some(hit) => hit.occurrences += count,
            None => self.targets.push(TargetHits {
                target: target.to_string(),
                occurrences: count,
            }),
        }
    }

    pub fn total_occurrences(&self) -> usize {
        self.targets.iter().map(|hit| hit.occurrences).sum()
    }

    /// Targets that were requested but never found in the document
    pub fn unmatched(&self) -> impl Iterator<Item = &str> {
        self.targets
            .iter()
            .filter(|hit| hit.occurrences == 0)
            .map(|hit| hit.target.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_accumulates() {
        let mut report = RedactionReport::new(DocumentFormat::Pdf);
        report.record("John", 1);
        report.record("Oxford University", 0);
        report.record("John", 2);

        assert_eq!(report.targets.len(), 2);
        assert_eq!(report.total_occurrences(), 3);
        assert_eq!(report.unmatched().collect::<Vec<_>>(), vec!["Oxford University"]);
    }
}
