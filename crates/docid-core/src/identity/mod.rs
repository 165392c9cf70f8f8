//! Identity field extraction module.

mod parser;
pub mod rules;

pub use parser::{ExtractionResult, IdentityParser};
pub use rules::{FieldRule, PatternRule, RuleSet};

use crate::models::identity::IdentityRecord;

/// Extract an identity record from plain text with the built-in layout.
pub fn extract_identity(text: &str) -> IdentityRecord {
    IdentityParser::new().extract(text)
}
