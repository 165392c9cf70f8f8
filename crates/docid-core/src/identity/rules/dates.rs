//! Birth date parsing.

use chrono::NaiveDate;

/// Parse a `DD/MM/YYYY` birth date into a calendar date.
pub fn parse_birth_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%d/%m/%Y").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_birth_date() {
        assert_eq!(
            parse_birth_date("15/03/1985"),
            NaiveDate::from_ymd_opt(1985, 3, 15)
        );
        assert_eq!(
            parse_birth_date("29/02/2000"),
            NaiveDate::from_ymd_opt(2000, 2, 29)
        );
    }

    #[test]
    fn test_rejects_impossible_dates() {
        assert!(parse_birth_date("31/02/1990").is_none());
        assert!(parse_birth_date("29/02/2001").is_none());
        assert!(parse_birth_date("1985-03-15").is_none());
    }
}
