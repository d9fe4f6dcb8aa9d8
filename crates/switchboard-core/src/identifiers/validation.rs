//! Identifier validation rules

use std::fmt;

/// Maximum length for operation and provider names
pub const MAX_ID_LENGTH: usize = 128;

/// Error type for identifier validation failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdValidationError {
    /// The identifier string is empty
    Empty,
    /// The identifier has leading or trailing whitespace
    LeadingTrailingWhitespace,
    /// The identifier contains a character outside `[A-Za-z0-9_.-]`
    InvalidCharacter(char),
    /// The identifier exceeds the maximum length
    TooLong { length: usize, max: usize },
}

impl fmt::Display for IdValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "identifier cannot be empty"),
            Self::LeadingTrailingWhitespace => {
                write!(f, "identifier cannot have leading or trailing whitespace")
            }
            Self::InvalidCharacter(c) => write!(
                f,
                "identifier contains invalid character {c:?} (allowed: ASCII letters, digits, '-', '_', '.')"
            ),
            Self::TooLong { length, max } => {
                write!(f, "identifier too long ({length} chars, max {max})")
            }
        }
    }
}

impl std::error::Error for IdValidationError {}

/// Validator shared by every name that crosses the provider boundary.
///
/// Operation names end up in the reasoning engine's function list and in
/// log fields, so the accepted alphabet is deliberately narrow:
///
/// - non-empty, at most [`MAX_ID_LENGTH`] characters
/// - no leading or trailing whitespace
/// - ASCII alphanumerics, `-`, `_` and `.` only
///
/// ```rust
/// use switchboard_core::identifiers::IdValidator;
///
/// assert!(IdValidator::validate("unit_conversion").is_ok());
/// assert!(IdValidator::validate("math.v2").is_ok());
/// assert!(IdValidator::validate("").is_err());
/// assert!(IdValidator::validate("web search").is_err());
/// ```
pub struct IdValidator;

impl IdValidator {
    pub fn validate(id: &str) -> Result<&str, IdValidationError> {
        if id.is_empty() {
            return Err(IdValidationError::Empty);
        }

        if id != id.trim() {
            return Err(IdValidationError::LeadingTrailingWhitespace);
        }

        if id.len() > MAX_ID_LENGTH {
            return Err(IdValidationError::TooLong {
                length: id.len(),
                max: MAX_ID_LENGTH,
            });
        }

        if let Some(bad) = id.chars().find(|c| !Self::is_valid_char(*c)) {
            return Err(IdValidationError::InvalidCharacter(bad));
        }

        Ok(id)
    }

    /// Check if a character is valid in an identifier
    pub fn is_valid_char(c: char) -> bool {
        c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.'
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_valid_ids() {
        assert!(IdValidator::validate("add").is_ok());
        assert!(IdValidator::validate("percent_of").is_ok());
        assert!(IdValidator::validate("weather-provider").is_ok());
        assert!(IdValidator::validate("tools.v1").is_ok());
        assert!(IdValidator::validate("a").is_ok());
    }

    #[test]
    fn test_validate_empty() {
        assert_eq!(IdValidator::validate(""), Err(IdValidationError::Empty));
    }

    #[test]
    fn test_validate_whitespace() {
        assert_eq!(
            IdValidator::validate(" add"),
            Err(IdValidationError::LeadingTrailingWhitespace)
        );
        assert_eq!(
            IdValidator::validate("   "),
            Err(IdValidationError::LeadingTrailingWhitespace)
        );
        assert_eq!(
            IdValidator::validate("web search"),
            Err(IdValidationError::InvalidCharacter(' '))
        );
    }

    #[test]
    fn test_validate_too_long() {
        let long = "x".repeat(MAX_ID_LENGTH + 1);
        assert_eq!(
            IdValidator::validate(&long),
            Err(IdValidationError::TooLong {
                length: MAX_ID_LENGTH + 1,
                max: MAX_ID_LENGTH
            })
        );
        assert!(IdValidator::validate(&"x".repeat(MAX_ID_LENGTH)).is_ok());
    }

    #[test]
    fn test_validate_rejects_non_ascii_and_punctuation() {
        assert_eq!(
            IdValidator::validate("café"),
            Err(IdValidationError::InvalidCharacter('é'))
        );
        assert_eq!(
            IdValidator::validate("tools/list"),
            Err(IdValidationError::InvalidCharacter('/'))
        );
    }
}
