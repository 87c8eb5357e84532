//! Field-level validation primitives shared by every payload and query validator.

pub mod error;
pub mod field_types;
pub mod validation;

pub use error::{Result, ValidationErrors};
pub use field_types::{Field, FieldType};
pub use validation::{
    parse_leading_int, parse_number, round_to, FieldValidator, ValidatedPayload, ValidationMode,
};

/// Length of a document identifier in hexadecimal characters.
pub const ID_LENGTH: usize = 24;

/// Whether `candidate` is a syntactically valid document identifier.
pub fn is_valid_id(candidate: &str) -> bool {
    candidate.len() == ID_LENGTH && candidate.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Escape regular expression metacharacters so user text matches literally.
pub fn escape_regex(literal: &str) -> String {
    regex::escape(literal)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_regex() {
        assert_eq!(escape_regex("C++"), r"C\+\+");
        assert_eq!(escape_regex("a.b*(c)"), r"a\.b\*\(c\)");
        assert_eq!(escape_regex("plain"), "plain");
    }

    #[test]
    fn test_is_valid_id() {
        assert!(is_valid_id("65a1b2c3d4e5f60718293a4b"));
        assert!(!is_valid_id("65a1b2c3"));
        assert!(!is_valid_id("zzzzzzzzzzzzzzzzzzzzzzzz"));
    }
}
