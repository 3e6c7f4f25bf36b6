//! Core domain models and logic for the CV anonymiser
//!
//! This crate contains:
//! - Domain models (Entity, RedactionTargets, DocumentFormat)
//! - Target extraction (`detect`) over any `EntityRecognizer`
//! - Literal occurrence masking shared by every document redactor

pub mod entity;
pub mod error;
pub mod format;
pub mod matching;
pub mod report;
pub mod targets;

pub use entity::{Entity, EntityLabel, EntityRecognizer};
pub use error::{Error, Result};
pub use format::DocumentFormat;
pub use matching::{OccurrenceMask, mask_occurrences};
pub use report::{RedactionReport, TargetHits};
pub use targets::{INSTITUTION_KEYWORDS, RedactionTargets, detect, is_institution};
