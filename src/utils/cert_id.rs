// src/utils/cert_id.rs
//! Certificate identifier derivation.
//!
//! The identifier is a wire contract: third parties type it into the public
//! verification form, so the format is fixed as
//! `lowercase(shortCode) + last2digits(passOutYear) + rollNumber` with no
//! separators (e.g. `cmr2510143`).

use crate::error::ValidationError;

/// Derives the globally unique certificate identifier.
///
/// # Errors
/// Returns `ValidationError` if the short code or roll number is blank.
pub fn generate_certificate_id(
    short_code: &str,
    pass_out_year: u16,
    roll_number: &str,
) -> Result<String, ValidationError> {
    let code = short_code.trim().to_lowercase();
    if code.is_empty() {
        return Err(ValidationError::MissingField("short_code"));
    }
    let roll = roll_number.trim();
    if roll.is_empty() {
        return Err(ValidationError::MissingField("roll_number"));
    }
    Ok(format!("{}{:02}{}", code, pass_out_year % 100, roll))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composes_code_year_and_roll() {
        let id = generate_certificate_id("CMR", 2025, "10143").unwrap();
        assert_eq!(id, "cmr2510143");
    }

    #[test]
    fn short_code_is_lowercased() {
        let id = generate_certificate_id("XYZ", 2025, "10099").unwrap();
        assert_eq!(id, "xyz2510099");
    }

    #[test]
    fn year_keeps_two_digits() {
        // Years ending in 0x must not collapse to one digit.
        let id = generate_certificate_id("abc", 2007, "5").unwrap();
        assert_eq!(id, "abc075");
    }

    #[test]
    fn blank_inputs_are_rejected() {
        assert_eq!(
            generate_certificate_id("  ", 2025, "10143"),
            Err(ValidationError::MissingField("short_code"))
        );
        assert_eq!(
            generate_certificate_id("cmr", 2025, ""),
            Err(ValidationError::MissingField("roll_number"))
        );
    }
}
