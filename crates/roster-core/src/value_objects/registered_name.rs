//! Registered (in-game) name validation
//!
//! A registered name is trimmed, must be 2-16 characters long, and may not
//! contain control, separator (including spaces), combining mark, or
//! punctuation characters.

use std::sync::LazyLock;

use regex::Regex;

/// Minimum accepted name length in characters
pub const MIN_NAME_LENGTH: usize = 2;
/// Maximum accepted name length in characters
pub const MAX_NAME_LENGTH: usize = 16;

static FORBIDDEN_CHARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\p{C}\p{Z}\p{M}\p{P}]").unwrap_or_else(|e| panic!("invalid name regex: {e}"))
});

/// Why a candidate name was rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NameRejection {
    #[error("Name cannot be empty")]
    Empty,

    #[error("Name must be at least 2 characters long")]
    TooShort,

    #[error("Name cannot be longer than 16 characters")]
    TooLong,

    #[error("Name cannot contain spaces, punctuation marks, or certain special characters.")]
    InvalidCharacters,
}

/// Validate a candidate name, returning the normalized (trimmed) form
pub fn validate_registered_name(candidate: &str) -> Result<String, NameRejection> {
    let trimmed = candidate.trim();
    if trimmed.is_empty() {
        return Err(NameRejection::Empty);
    }

    let length = trimmed.chars().count();
    if length < MIN_NAME_LENGTH {
        return Err(NameRejection::TooShort);
    }
    if length > MAX_NAME_LENGTH {
        return Err(NameRejection::TooLong);
    }

    if FORBIDDEN_CHARS.is_match(trimmed) {
        return Err(NameRejection::InvalidCharacters);
    }

    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_bounds() {
        assert_eq!(validate_registered_name("Al"), Ok("Al".to_string()));
        assert_eq!(validate_registered_name("A"), Err(NameRejection::TooShort));
        assert_eq!(
            validate_registered_name("ABCDEFGHIJKLMNOP"),
            Ok("ABCDEFGHIJKLMNOP".to_string())
        );
        assert_eq!(
            validate_registered_name("ABCDEFGHIJKLMNOPQ"),
            Err(NameRejection::TooLong)
        );
    }

    #[test]
    fn test_trims_before_checking() {
        assert_eq!(validate_registered_name("  Kaelthas "), Ok("Kaelthas".to_string()));
        assert_eq!(validate_registered_name(" A "), Err(NameRejection::TooShort));
        assert_eq!(validate_registered_name("   "), Err(NameRejection::Empty));
        assert_eq!(validate_registered_name(""), Err(NameRejection::Empty));
    }

    #[test]
    fn test_rejects_spaces_and_punctuation() {
        assert_eq!(
            validate_registered_name("Big Bob"),
            Err(NameRejection::InvalidCharacters)
        );
        assert_eq!(
            validate_registered_name("Bob!"),
            Err(NameRejection::InvalidCharacters)
        );
        assert_eq!(
            validate_registered_name("bob_the_tank"),
            Err(NameRejection::InvalidCharacters)
        );
        assert_eq!(
            validate_registered_name("Bo\u{0301}b"),
            Err(NameRejection::InvalidCharacters)
        );
    }

    #[test]
    fn test_accepts_letters_digits_and_symbols() {
        assert!(validate_registered_name("Tank42").is_ok());
        assert!(validate_registered_name("세승").is_ok());
        assert!(validate_registered_name("Ünterwald").is_ok());
        // Symbols (category S) are allowed
        assert!(validate_registered_name("Bob+").is_ok());
    }

    #[test]
    fn test_rejection_messages() {
        assert_eq!(
            NameRejection::TooShort.to_string(),
            "Name must be at least 2 characters long"
        );
        assert_eq!(
            NameRejection::TooLong.to_string(),
            "Name cannot be longer than 16 characters"
        );
    }
}
