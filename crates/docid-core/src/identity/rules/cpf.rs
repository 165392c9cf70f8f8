//! CPF (Brazilian taxpayer number) validation and formatting.

/// Digits of a CPF with separators removed.
pub fn cpf_digits(cpf: &str) -> String {
    cpf.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Validate a CPF using its two check digits.
///
/// CPF format: 11 digits, the last two are mod-11 check digits computed with
/// weights 10..2 and 11..2. Sequences of one repeated digit are rejected.
pub fn validate_cpf(cpf: &str) -> bool {
    let digits: Vec<u32> = cpf
        .chars()
        .filter_map(|c| c.to_digit(10))
        .collect();

    if digits.len() != 11 {
        return false;
    }

    if digits.iter().all(|d| *d == digits[0]) {
        return false;
    }

    check_digit(&digits[..9]) == digits[9] && check_digit(&digits[..10]) == digits[10]
}

fn check_digit(digits: &[u32]) -> u32 {
    let top = digits.len() as u32 + 1;
    let sum: u32 = digits
        .iter()
        .enumerate()
        .map(|(i, d)| d * (top - i as u32))
        .sum();

    let remainder = sum % 11;
    if remainder < 2 { 0 } else { 11 - remainder }
}

/// Format CPF with separators (XXX.XXX.XXX-XX).
pub fn format_cpf(cpf: &str) -> String {
    let digits = cpf_digits(cpf);

    if digits.len() != 11 {
        return cpf.to_string();
    }

    format!(
        "{}.{}.{}-{}",
        &digits[0..3],
        &digits[3..6],
        &digits[6..9],
        &digits[9..11]
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_cpf_valid() {
        assert!(validate_cpf("52998224725"));
        assert!(validate_cpf("529.982.247-25"));
        assert!(validate_cpf("123.456.789-09"));
    }

    #[test]
    fn test_validate_cpf_invalid() {
        assert!(!validate_cpf("123.456.789-00")); // Wrong check digits
        assert!(!validate_cpf("111.111.111-11")); // Repeated digit
        assert!(!validate_cpf("5299822472")); // Too short
        assert!(!validate_cpf("529982247250")); // Too long
    }

    #[test]
    fn test_format_cpf() {
        assert_eq!(format_cpf("52998224725"), "529.982.247-25");
        assert_eq!(format_cpf("529.982.247-25"), "529.982.247-25");
        assert_eq!(format_cpf("1234"), "1234");
    }
}
