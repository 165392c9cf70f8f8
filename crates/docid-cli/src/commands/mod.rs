//! CLI subcommands.

pub mod batch;
pub mod config;
pub mod process;
pub mod serve;

use std::path::Path;

use docid_core::models::config::DocidConfig;
use docid_core::{IdentityField, IdentityRecord};

/// Output format for extracted records.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

/// Load configuration from `path`, or defaults when no path is given.
pub fn load_config(path: Option<&str>) -> anyhow::Result<DocidConfig> {
    match path {
        Some(path) => Ok(DocidConfig::from_file(Path::new(path))?),
        None => Ok(DocidConfig::default()),
    }
}

pub fn format_record(record: &IdentityRecord, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(record)?),
        OutputFormat::Csv => format_csv(record),
        OutputFormat::Text => Ok(format_text(record)),
    }
}

fn format_csv(record: &IdentityRecord) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(IdentityField::ALL.iter().map(|f| f.key()))?;
    wtr.write_record(
        IdentityField::ALL
            .iter()
            .map(|f| record.get(*f).unwrap_or_default()),
    )?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(record: &IdentityRecord) -> String {
    let mut output = String::new();

    for field in IdentityField::ALL {
        let value = record.get(field).unwrap_or("-");
        output.push_str(&format!("{:<20} {}\n", format!("{}:", field.label()), value));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record() -> IdentityRecord {
        IdentityRecord {
            name: Some("JOAO DA SILVA".to_string()),
            cpf: Some("529.982.247-25".to_string()),
            sex: Some("MASCULINO".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_format_csv() {
        let csv = format_record(&record(), OutputFormat::Csv).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("nome,cpf,nomeMae,dataNascimento,nacionalidade,sexo,estadoCivil")
        );
        assert_eq!(lines.next(), Some("JOAO DA SILVA,529.982.247-25,,,,MASCULINO,"));
    }

    #[test]
    fn test_format_text_marks_absent_fields() {
        let text = format_record(&record(), OutputFormat::Text).unwrap();
        assert!(text.contains("JOAO DA SILVA"));
        assert_eq!(text.lines().count(), 7);
        assert!(text.lines().any(|l| l.ends_with(" -")));
    }

    #[test]
    fn test_format_json_keeps_nulls() {
        let json = format_record(&record(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["nome"], "JOAO DA SILVA");
        assert!(value["estadoCivil"].is_null());
    }

    #[test]
    fn test_load_config_defaults() {
        let config = load_config(None).unwrap();
        assert_eq!(config.server.port, 3000);
    }
}
