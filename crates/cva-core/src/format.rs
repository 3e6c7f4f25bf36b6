use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentFormat {
    Pdf,
    Docx,
}

impl DocumentFormat {
    pub fn from_extension(extension: &str) -> Result<Self> {
        match extension.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "pdf" => Ok(DocumentFormat::Pdf),
            "docx" => Ok(DocumentFormat::Docx),
            other => Err(Error::UnsupportedFormat(format!(
                "'.{}' (expected .pdf or .docx)",
                other
            ))),
        }
    }

    /// Identify a document from its leading bytes
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(b"%PDF-") {
            return Some(DocumentFormat::Pdf);
        }
        // OOXML packages are zip archives; part names are stored uncompressed
        if bytes.starts_with(b"PK\x03\x04")
            && bytes
                .windows(b"word/document.xml".len())
                .any(|w| w == b"word/document.xml")
        {
            return Some(DocumentFormat::Docx);
        }
        None
    }

    /// Resolve by file extension, falling back to content sniffing
    pub fn resolve(path: &Path, bytes: &[u8]) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some(extension) => Self::from_extension(extension),
            None => Self::sniff(bytes).ok_or_else(|| {
                Error::UnsupportedFormat(format!(
                    "cannot determine the format of {}",
                    path.display()
                ))
            }),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Docx => "docx",
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DocumentFormat::Pdf => "PDF",
            DocumentFormat::Docx => "DOCX",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_from_extension() {
        assert_eq!(DocumentFormat::from_extension("pdf").unwrap(), DocumentFormat::Pdf);
        assert_eq!(DocumentFormat::from_extension("DOCX").unwrap(), DocumentFormat::Docx);
        assert!(matches!(
            DocumentFormat::from_extension("doc"),
            Err(Error::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_sniff() {
        assert_eq!(DocumentFormat::sniff(b"%PDF-1.7\n"), Some(DocumentFormat::Pdf));
        assert_eq!(
            DocumentFormat::sniff(b"PK\x03\x04....word/document.xml...."),
            Some(DocumentFormat::Docx)
        );
        // zip without a word document part
        assert_eq!(DocumentFormat::sniff(b"PK\x03\x04....xl/workbook.xml"), None);
        assert_eq!(DocumentFormat::sniff(b"hello"), None);
    }

    #[test]
    fn test_resolve_prefers_extension() {
        let path = PathBuf::from("cv.txt");
        assert!(DocumentFormat::resolve(&path, b"%PDF-1.4").is_err());

        let path = PathBuf::from("cv");
        assert_eq!(
            DocumentFormat::resolve(&path, b"%PDF-1.4").unwrap(),
            DocumentFormat::Pdf
        );
        assert!(DocumentFormat::resolve(&path, b"plain text").is_err());
    }
}
