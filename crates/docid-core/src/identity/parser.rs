//! Identity parser applying a rule set to document text.

use std::time::Instant;

use serde::Serialize;
use tracing::{debug, trace};

use crate::models::identity::{IdentityField, IdentityRecord};

use super::rules::RuleSet;

/// Result of identity extraction.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionResult {
    /// Extracted record.
    pub record: IdentityRecord,
    /// Name of the rule set that produced the record.
    pub layout: String,
    /// Number of fields that matched.
    pub matched_fields: usize,
    /// Plausibility warnings about extracted values.
    pub warnings: Vec<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Rule-driven identity field parser.
///
/// Parsing is pure: the same text always yields the same record.
#[derive(Debug)]
pub struct IdentityParser {
    rules: RuleSet,
    validate: bool,
}

impl IdentityParser {
    /// Create a parser with the built-in layout and validation enabled.
    pub fn new() -> Self {
        Self::with_rules(RuleSet::default())
    }

    /// Create a parser over a custom rule set.
    pub fn with_rules(rules: RuleSet) -> Self {
        Self {
            rules,
            validate: true,
        }
    }

    /// Set whether extracted values are checked for plausibility.
    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Extract the identity record only.
    pub fn extract(&self, text: &str) -> IdentityRecord {
        let mut record = IdentityRecord::default();

        for field in IdentityField::ALL {
            let value = self
                .rules
                .rules_for(field)
                .find_map(|rule| rule.extract(text));

            trace!(field = %field, matched = value.is_some(), "applied field rules");
            record.set(field, value);
        }

        record
    }

    /// Parse text into a full extraction result.
    pub fn parse(&self, text: &str) -> ExtractionResult {
        let start = Instant::now();

        let record = self.extract(text);
        let matched_fields = record.matched_count();
        let warnings = if self.validate {
            record.validate()
        } else {
            Vec::new()
        };

        debug!(
            "Extracted {}/{} fields with layout {} ({} warnings)",
            matched_fields,
            IdentityField::ALL.len(),
            self.rules.name(),
            warnings.len()
        );

        ExtractionResult {
            record,
            layout: self.rules.name().to_string(),
            matched_fields,
            warnings,
            processing_time_ms: start.elapsed().as_millis() as u64,
        }
    }
}

impl Default for IdentityParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = "Comprovante de Situação Cadastral no CPF\n\
        Nome JOAO DA SILVA\n\
        CPF 529.982.247-25\n\
        Nome da Mãe MARIA APARECIDA DA SILVA\n\
        Data de Nascimento 15/03/1985\n\
        Nacionalidade BRASILEIRA\n\
        Sexo MASCULINO\n\
        Estado Civil CASADO\n";

    #[test]
    fn test_parse_full_document() {
        let result = IdentityParser::new().parse(SAMPLE);

        let expected = IdentityRecord {
            name: Some("JOAO DA SILVA".to_string()),
            cpf: Some("529.982.247-25".to_string()),
            mother_name: Some("MARIA APARECIDA DA SILVA".to_string()),
            birth_date: Some("15/03/1985".to_string()),
            nationality: Some("BRASILEIRA".to_string()),
            sex: Some("MASCULINO".to_string()),
            marital_status: Some("CASADO".to_string()),
        };

        assert_eq!(result.record, expected);
        assert_eq!(result.matched_fields, 7);
        assert!(result.warnings.is_empty());
        assert_eq!(result.layout, "cpf-registration-v1");
    }

    #[test]
    fn test_name_and_cpf_scenario() {
        let record = IdentityParser::new().extract("Nome JOAO DA SILVA\nCPF 123.456.789-00");

        assert_eq!(record.name.as_deref(), Some("JOAO DA SILVA"));
        assert_eq!(record.cpf.as_deref(), Some("123.456.789-00"));
        assert_eq!(record.matched_count(), 2);
    }

    #[test]
    fn test_sex_scenarios() {
        let parser = IdentityParser::new();
        assert_eq!(parser.extract("Sexo FEMININO").sex.as_deref(), Some("FEMININO"));
        assert_eq!(parser.extract("sexo masculino").sex.as_deref(), Some("masculino"));
    }

    #[test]
    fn test_missing_mother_label_keeps_other_fields() {
        let text = SAMPLE.replace("Nome da Mãe MARIA APARECIDA DA SILVA\n", "");
        let record = IdentityParser::new().extract(&text);

        assert!(record.mother_name.is_none());
        assert_eq!(record.matched_count(), 6);
        assert_eq!(record.name.as_deref(), Some("JOAO DA SILVA"));
        assert_eq!(record.marital_status.as_deref(), Some("CASADO"));
    }

    #[test]
    fn test_each_rule_is_independent() {
        let parser = IdentityParser::new();
        let full = parser.extract(SAMPLE);

        for line in SAMPLE.lines().skip(1) {
            let text = SAMPLE.replace(line, "");
            let record = parser.extract(&text);

            // Only fields whose label lived on the removed line may disappear
            for field in IdentityField::ALL {
                if record.get(field).is_none() && full.get(field).is_some() {
                    assert!(
                        line.contains(label_of(field)) || dependent_on(field, line),
                        "{field} lost after removing {line:?}"
                    );
                }
            }
        }
    }

    fn label_of(field: IdentityField) -> &'static str {
        match field {
            IdentityField::Name => "Nome",
            IdentityField::Cpf => "CPF",
            IdentityField::MotherName => "Nome da Mãe",
            IdentityField::BirthDate => "Data de Nascimento",
            IdentityField::Nationality => "Nacionalidade",
            IdentityField::Sex => "Sexo",
            IdentityField::MaritalStatus => "Estado Civil",
        }
    }

    // Layout terminators: name ends at the CPF label, nationality needs Sexo
    fn dependent_on(field: IdentityField, line: &str) -> bool {
        matches!(
            (field, line.split_whitespace().next()),
            (IdentityField::Name, Some("CPF")) | (IdentityField::Nationality, Some("Sexo"))
        )
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let parser = IdentityParser::new();
        let first = parser.extract(SAMPLE);
        let second = parser.extract(SAMPLE);
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_text() {
        let result = IdentityParser::new().parse("");
        assert!(result.record.is_empty());
        assert_eq!(result.matched_fields, 0);
    }

    #[test]
    fn test_validation_warnings() {
        let text = "Nome JOAO\nCPF 123.456.789-00\nData de Nascimento 31/02/1990";

        let result = IdentityParser::new().parse(text);
        assert_eq!(result.warnings.len(), 2);

        let result = IdentityParser::new().with_validation(false).parse(text);
        assert!(result.warnings.is_empty());
        assert_eq!(result.record.cpf.as_deref(), Some("123.456.789-00"));
    }
}
