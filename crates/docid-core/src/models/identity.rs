//! Identity record produced by field extraction.

use serde::{Deserialize, Serialize};

use crate::identity::rules::{parse_birth_date, validate_cpf};

/// The seven fields recognised on an identity registration document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentityField {
    Name,
    Cpf,
    MotherName,
    BirthDate,
    Nationality,
    Sex,
    MaritalStatus,
}

impl IdentityField {
    /// All fields in document order.
    pub const ALL: [IdentityField; 7] = [
        IdentityField::Name,
        IdentityField::Cpf,
        IdentityField::MotherName,
        IdentityField::BirthDate,
        IdentityField::Nationality,
        IdentityField::Sex,
        IdentityField::MaritalStatus,
    ];

    /// Key used in serialized records.
    pub fn key(&self) -> &'static str {
        match self {
            IdentityField::Name => "nome",
            IdentityField::Cpf => "cpf",
            IdentityField::MotherName => "nomeMae",
            IdentityField::BirthDate => "dataNascimento",
            IdentityField::Nationality => "nacionalidade",
            IdentityField::Sex => "sexo",
            IdentityField::MaritalStatus => "estadoCivil",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            IdentityField::Name => "Name",
            IdentityField::Cpf => "CPF",
            IdentityField::MotherName => "Mother's name",
            IdentityField::BirthDate => "Birth date",
            IdentityField::Nationality => "Nationality",
            IdentityField::Sex => "Sex",
            IdentityField::MaritalStatus => "Marital status",
        }
    }
}

impl std::fmt::Display for IdentityField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Structured identity data lifted from document text.
///
/// A field whose rule did not match is `None` and serializes as `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRecord {
    /// Full name.
    #[serde(rename = "nome")]
    pub name: Option<String>,

    /// National taxpayer number (CPF), as printed.
    pub cpf: Option<String>,

    /// Mother's full name.
    #[serde(rename = "nomeMae")]
    pub mother_name: Option<String>,

    /// Birth date as printed (DD/MM/YYYY).
    #[serde(rename = "dataNascimento")]
    pub birth_date: Option<String>,

    /// Nationality.
    #[serde(rename = "nacionalidade")]
    pub nationality: Option<String>,

    /// Sex, with the casing found in the document.
    #[serde(rename = "sexo")]
    pub sex: Option<String>,

    /// Marital status.
    #[serde(rename = "estadoCivil")]
    pub marital_status: Option<String>,
}

impl IdentityRecord {
    /// Value of a field.
    pub fn get(&self, field: IdentityField) -> Option<&str> {
        self.slot(field).as_deref()
    }

    /// Set a field value.
    pub fn set(&mut self, field: IdentityField, value: Option<String>) {
        *self.slot_mut(field) = value;
    }

    /// Number of fields that carry a value.
    pub fn matched_count(&self) -> usize {
        IdentityField::ALL
            .iter()
            .filter(|f| self.get(**f).is_some())
            .count()
    }

    /// Whether no field matched at all.
    pub fn is_empty(&self) -> bool {
        self.matched_count() == 0
    }

    /// Fields that are absent.
    pub fn missing_fields(&self) -> Vec<IdentityField> {
        IdentityField::ALL
            .into_iter()
            .filter(|f| self.get(*f).is_none())
            .collect()
    }

    /// Check extracted values for plausibility.
    ///
    /// Values are never rewritten; issues are reported as messages.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if let Some(cpf) = &self.cpf {
            if !validate_cpf(cpf) {
                issues.push(format!("CPF {} has an invalid check digit", cpf));
            }
        }

        if let Some(date) = &self.birth_date {
            if parse_birth_date(date).is_none() {
                issues.push(format!("Birth date {} is not a calendar date", date));
            }
        }

        issues
    }

    fn slot(&self, field: IdentityField) -> &Option<String> {
        match field {
            IdentityField::Name => &self.name,
            IdentityField::Cpf => &self.cpf,
            IdentityField::MotherName => &self.mother_name,
            IdentityField::BirthDate => &self.birth_date,
            IdentityField::Nationality => &self.nationality,
            IdentityField::Sex => &self.sex,
            IdentityField::MaritalStatus => &self.marital_status,
        }
    }

    fn slot_mut(&mut self, field: IdentityField) -> &mut Option<String> {
        match field {
            IdentityField::Name => &mut self.name,
            IdentityField::Cpf => &mut self.cpf,
            IdentityField::MotherName => &mut self.mother_name,
            IdentityField::BirthDate => &mut self.birth_date,
            IdentityField::Nationality => &mut self.nationality,
            IdentityField::Sex => &mut self.sex,
            IdentityField::MaritalStatus => &mut self.marital_status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_absent_fields_serialize_as_null() {
        let mut record = IdentityRecord::default();
        record.set(IdentityField::Name, Some("JOAO DA SILVA".to_string()));

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["nome"], "JOAO DA SILVA");
        assert!(json["nomeMae"].is_null());
        assert_eq!(json.as_object().unwrap().len(), 7);
    }

    #[test]
    fn test_matched_and_missing() {
        let mut record = IdentityRecord::default();
        assert!(record.is_empty());

        record.set(IdentityField::Sex, Some("FEMININO".to_string()));
        record.set(IdentityField::Cpf, Some("529.982.247-25".to_string()));

        assert_eq!(record.matched_count(), 2);
        assert_eq!(record.get(IdentityField::Sex), Some("FEMININO"));
        assert_eq!(record.missing_fields().len(), 5);
        assert!(!record.missing_fields().contains(&IdentityField::Cpf));
    }

    #[test]
    fn test_validate_reports_bad_values() {
        let record = IdentityRecord {
            cpf: Some("123.456.789-00".to_string()),
            birth_date: Some("31/02/1990".to_string()),
            ..Default::default()
        };

        let issues = record.validate();
        assert_eq!(issues.len(), 2);
        assert!(issues[0].contains("CPF"));
        assert!(issues[1].contains("31/02/1990"));
    }

    #[test]
    fn test_validate_accepts_good_values() {
        let record = IdentityRecord {
            cpf: Some("529.982.247-25".to_string()),
            birth_date: Some("15/03/1985".to_string()),
            ..Default::default()
        };

        assert!(record.validate().is_empty());
    }
}
