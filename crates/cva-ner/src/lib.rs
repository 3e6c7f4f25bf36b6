//! Named-entity recognition for CV text
//!
//! A gazetteer and rule recognizer driven by a JSON model artifact. The
//! model is provisioned once per process (local file, one-time fetch, or the
//! bundled default) and shared read-only by every request.

pub mod error;
pub mod model;
pub mod provision;
pub mod recognizer;

pub use error::{NerError, Result};
pub use model::{Lexicon, NerModel};
pub use provision::{ModelStore, shared_recognizer};
pub use recognizer::RuleRecognizer;
