//! Rule-based field extractors for identity documents.

pub mod cpf;
pub mod dates;
pub mod patterns;

pub use cpf::{cpf_digits, format_cpf, validate_cpf};
pub use dates::parse_birth_date;

use regex::Regex;

use crate::models::identity::IdentityField;

/// Name of the built-in rule table.
pub const DEFAULT_LAYOUT: &str = "cpf-registration-v1";

/// A single extraction rule for one identity field.
pub trait FieldRule: Send + Sync {
    /// The field this rule fills.
    fn field(&self) -> IdentityField;

    /// Extract the value from the full document text.
    fn extract(&self, text: &str) -> Option<String>;
}

/// Rule backed by a regex whose first capture group holds the value.
#[derive(Debug, Clone)]
pub struct PatternRule {
    field: IdentityField,
    pattern: Regex,
}

impl PatternRule {
    pub fn new(field: IdentityField, pattern: Regex) -> Self {
        Self { field, pattern }
    }

    /// Compile a rule from a pattern string.
    pub fn from_pattern(field: IdentityField, pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self::new(field, Regex::new(pattern)?))
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }
}

impl FieldRule for PatternRule {
    fn field(&self) -> IdentityField {
        self.field
    }

    fn extract(&self, text: &str) -> Option<String> {
        let caps = self.pattern.captures(text)?;
        let value = caps.get(1)?.as_str().trim();
        (!value.is_empty()).then(|| value.to_string())
    }
}

/// Ordered, named collection of field rules.
///
/// Rules run independently over the whole text. When a field has more than
/// one rule, the first one that yields a value wins.
pub struct RuleSet {
    name: String,
    rules: Vec<Box<dyn FieldRule>>,
}

impl RuleSet {
    /// An empty rule set.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rules: Vec::new(),
        }
    }

    /// Append a rule.
    pub fn push(mut self, rule: impl FieldRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Replace every rule for the rule's field with this one.
    ///
    /// The new rule takes the position of the first rule it replaces, or is
    /// appended if the field had none.
    pub fn replace(mut self, rule: impl FieldRule + 'static) -> Self {
        let field = rule.field();
        let position = self.rules.iter().position(|r| r.field() == field);
        self.rules.retain(|r| r.field() != field);
        match position {
            Some(idx) => self.rules.insert(idx, Box::new(rule)),
            None => self.rules.push(Box::new(rule)),
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules in application order.
    pub fn rules(&self) -> impl Iterator<Item = &dyn FieldRule> {
        self.rules.iter().map(|r| r.as_ref())
    }

    /// Rules for one field, in order.
    pub fn rules_for(&self, field: IdentityField) -> impl Iterator<Item = &dyn FieldRule> {
        self.rules().filter(move |r| r.field() == field)
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        use patterns::*;

        RuleSet::new(DEFAULT_LAYOUT)
            .push(PatternRule::new(IdentityField::Name, NAME.clone()))
            .push(PatternRule::new(IdentityField::Cpf, CPF.clone()))
            .push(PatternRule::new(IdentityField::MotherName, MOTHER_NAME.clone()))
            .push(PatternRule::new(IdentityField::BirthDate, BIRTH_DATE.clone()))
            .push(PatternRule::new(IdentityField::Nationality, NATIONALITY.clone()))
            .push(PatternRule::new(IdentityField::Sex, SEX.clone()))
            .push(PatternRule::new(IdentityField::MaritalStatus, MARITAL_STATUS.clone()))
    }
}

impl std::fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleSet")
            .field("name", &self.name)
            .field("rules", &self.rules.len())
            .finish()
    }
}
