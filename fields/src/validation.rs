use crate::{is_valid_id, Field, FieldType, ValidationErrors};
use serde_json::{Map, Value as JsonValue};

/// Whether a payload creates a document or partially updates one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    Create,
    Update,
}

/// Outcome of validating a write payload.
///
/// `data` holds only fields that passed validation and were present in the
/// payload, plus defaults on create.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidatedPayload {
    pub errors: ValidationErrors,
    pub data: Map<String, JsonValue>,
}

impl ValidatedPayload {
    pub fn into_result(self) -> crate::Result<Map<String, JsonValue>> {
        self.errors.into_result(self.data)
    }
}

/// Field validator for validating field values
pub struct FieldValidator;

impl FieldValidator {
    /// Validate a whole payload against the allow-listed fields.
    pub fn validate_payload(
        fields: &[Field],
        payload: &JsonValue,
        mode: ValidationMode,
    ) -> ValidatedPayload {
        let mut result = ValidatedPayload::default();

        let Some(body) = payload.as_object() else {
            result.errors.push("Request body must be a JSON object");
            return result;
        };

        if body.is_empty() {
            result.errors.push("Request body cannot be empty");
            return result;
        }

        for key in body.keys() {
            if !fields.iter().any(|field| field.id == *key) {
                result.errors.push(format!("Field '{}' is not allowed", key));
            }
        }

        if mode == ValidationMode::Update {
            for field in fields.iter().filter(|f| f.immutable) {
                if body.contains_key(&field.id) {
                    result.errors.push(format!("{} cannot be updated", field.id));
                }
            }

            let has_updatable = fields
                .iter()
                .any(|field| !field.immutable && body.contains_key(&field.id));
            if !has_updatable {
                result.errors.push("No valid fields provided for update");
                return result;
            }
        }

        for field in fields {
            if mode == ValidationMode::Update && field.immutable {
                continue;
            }
            match Self::validate_field_value(field, body.get(&field.id), mode) {
                Ok(Some(value)) => {
                    result.data.insert(field.id.clone(), value);
                }
                Ok(None) => {}
                Err(message) => result.errors.push(message),
            }
        }

        result
    }

    /// Validate one field. `Ok(None)` means the field is left untouched.
    pub fn validate_field_value(
        field: &Field,
        value: Option<&JsonValue>,
        mode: ValidationMode,
    ) -> std::result::Result<Option<JsonValue>, String> {
        let Some(value) = value else {
            return match mode {
                ValidationMode::Update => Ok(None),
                ValidationMode::Create if field.required => Err(format!("{} is required", field.id)),
                ValidationMode::Create => Ok(Some(Self::cleared_value(field))),
            };
        };

        match field.field_type {
            FieldType::Text => Self::validate_text(field, value).map(Some),
            FieldType::Integer | FieldType::Float => Self::validate_number(field, value).map(Some),
            FieldType::Reference => Self::validate_reference(field, value).map(Some),
        }
    }

    /// Value stored when an optional field is absent on create or cleared.
    fn cleared_value(field: &Field) -> JsonValue {
        if let Some(default) = &field.default {
            return default.clone();
        }
        match field.field_type {
            FieldType::Text => JsonValue::String(String::new()),
            _ => JsonValue::Null,
        }
    }

    fn validate_text(field: &Field, value: &JsonValue) -> std::result::Result<JsonValue, String> {
        if value.is_null() {
            return if field.required {
                Err(format!("{} is required", field.id))
            } else {
                Ok(Self::cleared_value(field))
            };
        }

        let Some(raw) = value.as_str() else {
            return Err(format!("{} must be a string", field.id));
        };

        let trimmed = raw.trim();
        if field.required && trimmed.is_empty() {
            return Err(format!("{} cannot be empty", field.id));
        }

        if let Some(max) = field.max_length {
            if trimmed.chars().count() > max {
                return Err(format!("{} is too long (max {} chars)", field.id, max));
            }
        }

        Ok(JsonValue::String(trimmed.to_string()))
    }

    fn validate_number(field: &Field, value: &JsonValue) -> std::result::Result<JsonValue, String> {
        let blank = match value {
            JsonValue::Null => true,
            JsonValue::String(s) => s.trim().is_empty(),
            _ => false,
        };
        if blank {
            return if field.required {
                Err(format!("{} is required", field.id))
            } else {
                Ok(Self::cleared_value(field))
            };
        }

        let number = match value {
            JsonValue::Number(n) => n.as_f64(),
            JsonValue::String(s) => parse_number(s),
            _ => None,
        };
        let Some(number) = number else {
            return Err(field.out_of_range_message());
        };

        if let Some((min, max)) = field.range {
            if number < min || number > max {
                return Err(field.out_of_range_message());
            }
        }

        if field.field_type == FieldType::Integer {
            if number.fract() != 0.0 {
                return Err(field.out_of_range_message());
            }
            return Ok(JsonValue::from(number as i64));
        }

        let number = match field.decimals {
            Some(places) => round_to(number, places),
            None => number,
        };
        Ok(JsonValue::from(number))
    }

    fn validate_reference(field: &Field, value: &JsonValue) -> std::result::Result<JsonValue, String> {
        match value {
            JsonValue::Null if field.required => Err(format!("{} is required", field.id)),
            JsonValue::Null => Ok(JsonValue::Null),
            JsonValue::String(s) if is_valid_id(s.trim()) => {
                Ok(JsonValue::String(s.trim().to_ascii_lowercase()))
            }
            _ => Err(format!("{} must be a valid id", field.id)),
        }
    }
}

/// Parse a finite decimal number from text, ignoring surrounding whitespace.
pub fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Parse the leading integer of a string: optional sign then digits, with
/// anything after the digits ignored. `"3abc"` gives 3, `"abc"` gives `None`.
pub fn parse_leading_int(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let digits: &str = {
        let end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        &rest[..end]
    };
    if digits.is_empty() {
        return None;
    }
    let magnitude = digits.parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

/// Round half away from zero to the given number of decimal places.
pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn book_fields() -> Vec<Field> {
        vec![
            Field::text("title").required().max_length(200),
            Field::text("description").max_length(1500),
            Field::integer("pages").range(1.0, 10000.0),
            Field::float("rating").range(0.0, 10.0).default_value(0),
        ]
    }

    fn review_fields() -> Vec<Field> {
        vec![
            Field::reference("bookId").required().immutable(),
            Field::float("rating")
                .required()
                .range(1.0, 5.0)
                .decimals(1)
                .range_message("rating must be a number between 1 and 5"),
        ]
    }

    #[test]
    fn test_rejects_non_object_and_empty_bodies() {
        let fields = book_fields();

        let result = FieldValidator::validate_payload(&fields, &json!([1, 2]), ValidationMode::Create);
        assert_eq!(result.errors.first(), Some("Request body must be a JSON object"));

        let result = FieldValidator::validate_payload(&fields, &json!({}), ValidationMode::Update);
        assert_eq!(result.errors.first(), Some("Request body cannot be empty"));
    }

    #[test]
    fn test_create_applies_defaults_and_trims() {
        let result = FieldValidator::validate_payload(
            &book_fields(),
            &json!({"title": "  Dune  "}),
            ValidationMode::Create,
        );

        assert!(result.errors.is_empty());
        assert_eq!(
            JsonValue::Object(result.data),
            json!({"title": "Dune", "description": "", "pages": null, "rating": 0})
        );
    }

    #[test]
    fn test_accumulates_every_error() {
        let result = FieldValidator::validate_payload(
            &book_fields(),
            &json!({"title": "", "pages": 0, "owner": "me"}),
            ValidationMode::Create,
        );

        assert_eq!(
            result.errors.messages(),
            &[
                "Field 'owner' is not allowed".to_string(),
                "title cannot be empty".to_string(),
                "pages must be between 1 and 10000".to_string(),
            ]
        );
    }

    #[test]
    fn test_update_only_touches_present_fields() {
        let result = FieldValidator::validate_payload(
            &book_fields(),
            &json!({"pages": "412"}),
            ValidationMode::Update,
        );

        assert!(result.errors.is_empty());
        assert_eq!(JsonValue::Object(result.data), json!({"pages": 412}));
    }

    #[test]
    fn test_update_clears_optional_values() {
        let result = FieldValidator::validate_payload(
            &book_fields(),
            &json!({"pages": null, "description": null, "rating": ""}),
            ValidationMode::Update,
        );

        assert!(result.errors.is_empty());
        assert_eq!(
            JsonValue::Object(result.data),
            json!({"pages": null, "description": "", "rating": 0})
        );
    }

    #[test]
    fn test_immutable_field_in_update() {
        let result = FieldValidator::validate_payload(
            &review_fields(),
            &json!({"bookId": "65a1b2c3d4e5f60718293a4b"}),
            ValidationMode::Update,
        );

        assert_eq!(
            result.errors.messages(),
            &[
                "bookId cannot be updated".to_string(),
                "No valid fields provided for update".to_string(),
            ]
        );
    }

    #[rstest]
    #[case(json!(5.27), Ok(json!(5.3)))]
    #[case(json!("4"), Ok(json!(4.0)))]
    #[case(json!(0.5), Err("rating must be a number between 1 and 5"))]
    #[case(json!(true), Err("rating must be a number between 1 and 5"))]
    #[case(json!(null), Err("rating is required"))]
    fn test_review_rating(#[case] input: JsonValue, #[case] expected: std::result::Result<JsonValue, &str>) {
        let field = &review_fields()[1];
        let outcome = FieldValidator::validate_field_value(field, Some(&input), ValidationMode::Create);
        assert_eq!(outcome, expected.map(Some).map_err(str::to_string));
    }

    #[test]
    fn test_integer_rejects_fractions() {
        let field = Field::integer("pages").range(1.0, 10000.0);
        let outcome = FieldValidator::validate_field_value(&field, Some(&json!(12.5)), ValidationMode::Create);
        assert_eq!(outcome, Err("pages must be between 1 and 10000".to_string()));
    }

    #[test]
    fn test_text_type_and_length() {
        let field = Field::text("isbn").max_length(4);

        let outcome = FieldValidator::validate_field_value(&field, Some(&json!(42)), ValidationMode::Create);
        assert_eq!(outcome, Err("isbn must be a string".to_string()));

        let outcome = FieldValidator::validate_field_value(&field, Some(&json!("12345")), ValidationMode::Create);
        assert_eq!(outcome, Err("isbn is too long (max 4 chars)".to_string()));
    }

    #[test]
    fn test_reference_normalizes_case() {
        let field = Field::reference("bookId").required();
        let outcome = FieldValidator::validate_field_value(
            &field,
            Some(&json!("65A1B2C3D4E5F60718293A4B")),
            ValidationMode::Create,
        );
        assert_eq!(outcome, Ok(Some(json!("65a1b2c3d4e5f60718293a4b"))));

        let outcome = FieldValidator::validate_field_value(&field, Some(&json!("nope")), ValidationMode::Create);
        assert_eq!(outcome, Err("bookId must be a valid id".to_string()));
    }

    #[rstest]
    #[case("3", Some(3))]
    #[case("  12abc", Some(12))]
    #[case("-4", Some(-4))]
    #[case("1.9", Some(1))]
    #[case("abc", None)]
    #[case("", None)]
    fn test_parse_leading_int(#[case] raw: &str, #[case] expected: Option<i64>) {
        assert_eq!(parse_leading_int(raw), expected);
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number(" 9.5 "), Some(9.5));
        assert_eq!(parse_number("nine"), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number(""), None);
    }
}
