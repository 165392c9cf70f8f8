//! Regex patterns for the CPF registration document layout.
//!
//! Each pattern is anchored on a literal label and captures the value in
//! group 1. The `regex` crate has no lookaround, so trailing context that the
//! layout requires (e.g. `Sexo` after the nationality) is matched outside the
//! capture group.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Name ends on the line before the CPF label
    pub static ref NAME: Regex = Regex::new(
        r"Nome\s+(\p{Lu}[\p{Lu}\s]*?)\nCPF"
    ).unwrap();

    pub static ref CPF: Regex = Regex::new(
        r"CPF\s+([0-9.\-]+)"
    ).unwrap();

    // Mother's name must end at a line break
    pub static ref MOTHER_NAME: Regex = Regex::new(
        r"Nome da Mãe\s+(\p{Lu}[\p{Lu} \t]*)\r?\n"
    ).unwrap();

    pub static ref BIRTH_DATE: Regex = Regex::new(
        r"Data de Nascimento\s+([0-9]{2}/[0-9]{2}/[0-9]{4})"
    ).unwrap();

    pub static ref NATIONALITY: Regex = Regex::new(
        r"Nacionalidade\s+(\p{Lu}+)\r?\nSexo"
    ).unwrap();

    pub static ref SEX: Regex = Regex::new(
        r"(?i)Sexo\s+(masculino|feminino)"
    ).unwrap();

    // Letters of any case; the anchor is case-insensitive too
    pub static ref MARITAL_STATUS: Regex = Regex::new(
        r"(?i)Estado Civil\s+(\p{L}+)"
    ).unwrap();
}
