//! Building blocks shared by the per-resource list query builders.

use crate::QueryParams;
use database::{Filter, SortDirection, SortSpec};
use fields::{escape_regex, is_valid_id, parse_number, ValidationErrors};

/// Sort applied when the caller asks for none.
pub const DEFAULT_SORT_FIELD: &str = "created_at";

/// A list query built from untrusted parameters.
///
/// `errors` accumulates every problem found; the filter, sort and
/// projection only contain the parts that validated.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub errors: ValidationErrors,
    pub filter: Filter,
    pub sort: Vec<SortSpec>,
    pub projection: Option<Vec<String>>,
    /// `mine=true` was requested; the caller scopes the filter to its principal.
    pub mine: bool,
}

impl ListQuery {
    pub fn validate(self) -> fields::Result<Self> {
        if self.errors.is_empty() {
            Ok(self)
        } else {
            Err(self.errors)
        }
    }

    /// Case-insensitive substring match on a text field.
    pub(crate) fn text_filter(&mut self, params: &QueryParams, field: &str) {
        if let Some(value) = param(params, field) {
            self.filter = std::mem::take(&mut self.filter).matches(field, escape_regex(value));
        }
    }

    /// Exact match on an identifier field, rejecting malformed identifiers.
    pub(crate) fn id_filter(&mut self, params: &QueryParams, field: &str) {
        if let Some(value) = param(params, field) {
            if is_valid_id(value) {
                self.filter = std::mem::take(&mut self.filter).eq(field, value.to_ascii_lowercase());
            } else {
                self.errors.push(format!("{} must be a valid id", field));
            }
        }
    }

    /// `minRating` lower bound on the `rating` field.
    pub(crate) fn min_rating(&mut self, params: &QueryParams, min: f64, max: f64) {
        if let Some(value) = param(params, "minRating") {
            match parse_number(value) {
                Some(bound) if (min..=max).contains(&bound) => {
                    self.filter = std::mem::take(&mut self.filter).gte("rating", bound);
                }
                _ => self.errors.push(format!(
                    "minRating must be a number between {} and {}",
                    min, max
                )),
            }
        }
    }

    /// Resolve `sortBy`/`sortOrder` against an allow-list.
    ///
    /// Without `sortBy` the newest documents come first. `sortOrder` only
    /// overrides the default direction when it names one explicitly.
    pub(crate) fn sort(&mut self, params: &QueryParams, allowed: &[&str], default: SortDirection) {
        let Some(field) = param(params, "sortBy") else {
            self.sort = vec![SortSpec::new(DEFAULT_SORT_FIELD, SortDirection::Descending)];
            return;
        };

        if !allowed.contains(&field) {
            self.errors
                .push(format!("sortBy must be one of: {}", allowed.join(", ")));
            return;
        }

        let direction = match param(params, "sortOrder").map(str::to_ascii_lowercase).as_deref() {
            Some("asc") => SortDirection::Ascending,
            Some("desc") => SortDirection::Descending,
            _ => default,
        };
        self.sort = vec![SortSpec::new(field, direction)];
    }
}

/// Trimmed, non-empty parameter value.
pub(crate) fn param<'a>(params: &'a QueryParams, key: &str) -> Option<&'a str> {
    params
        .get(key)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use database::Condition;

    fn params(pairs: &[(&str, &str)]) -> QueryParams {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_text_filter_escapes_and_trims() {
        let mut query = ListQuery::default();
        query.text_filter(&params(&[("title", "  C++ (2nd) ")]), "title");

        assert_eq!(
            query.filter.get("title"),
            Some(&Condition::Matches(r"C\+\+ \(2nd\)".to_string()))
        );
    }

    #[test]
    fn test_blank_values_are_ignored() {
        let mut query = ListQuery::default();
        query.text_filter(&params(&[("title", "   ")]), "title");
        query.id_filter(&params(&[("ownerId", "")]), "ownerId");

        assert!(query.filter.is_empty());
        assert!(query.errors.is_empty());
    }

    #[test]
    fn test_sort_defaults_to_newest_first() {
        let mut query = ListQuery::default();
        query.sort(&params(&[("sortOrder", "asc")]), &["title"], SortDirection::Ascending);

        assert_eq!(
            query.sort,
            vec![SortSpec::new("created_at", SortDirection::Descending)]
        );
    }

    #[test]
    fn test_sort_rejects_unknown_field() {
        let mut query = ListQuery::default();
        query.sort(&params(&[("sortBy", "password")]), &["title", "rating"], SortDirection::Ascending);

        assert_eq!(query.errors.first(), Some("sortBy must be one of: title, rating"));
    }
}
