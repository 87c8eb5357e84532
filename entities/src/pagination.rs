//! Page/limit parsing and page metadata.

use crate::QueryParams;
use fields::parse_leading_int;
use serde::Serialize;
use utoipa::ToSchema;

pub const DEFAULT_LIMIT: u64 = 10;
pub const MAX_LIMIT: u64 = 100;

/// Largest offset the store accepts; SQLite integers are signed 64-bit.
pub const MAX_SKIP: u64 = i64::MAX as u64;

/// Limits applied while parsing pagination parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationOptions {
    pub default_limit: u64,
    pub max_limit: u64,
}

impl Default for PaginationOptions {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
            max_limit: MAX_LIMIT,
        }
    }
}

/// Resolved page window. `limit` is always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
    pub skip: u64,
}

impl Pagination {
    /// Parse raw `page`/`limit` values. Anything non-numeric or not positive
    /// falls back to page 1 and the default limit.
    pub fn parse(page: Option<&str>, limit: Option<&str>, options: PaginationOptions) -> Self {
        let max_limit = options.max_limit.max(1);
        let default_limit = options.default_limit.max(1);

        let page = positive(page).unwrap_or(1);
        let limit = positive(limit).unwrap_or(default_limit).min(max_limit);

        Self {
            page,
            limit,
            skip: (page - 1).saturating_mul(limit).min(MAX_SKIP),
        }
    }

    /// Parse from list query parameters with the default limits.
    pub fn from_params(params: &QueryParams) -> Self {
        Self::parse(
            params.get("page").map(String::as_str),
            params.get("limit").map(String::as_str),
            PaginationOptions::default(),
        )
    }

    pub fn meta(&self, total_items: u64) -> PageMeta {
        PageMeta::new(self.page, self.limit, total_items)
    }
}

fn positive(raw: Option<&str>) -> Option<u64> {
    raw.and_then(parse_leading_int)
        .filter(|n| *n > 0)
        .map(|n| n as u64)
}

/// Pagination metadata returned beside every list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub page: u64,
    pub limit: u64,
    pub total_items: u64,
    pub total_pages: u64,
    pub has_previous_page: bool,
    pub has_next_page: bool,
}

impl PageMeta {
    pub fn new(page: u64, limit: u64, total_items: u64) -> Self {
        let limit = limit.max(1);
        let total_pages = total_items.div_ceil(limit).max(1);
        Self {
            page,
            limit,
            total_items,
            total_pages,
            has_previous_page: page > 1,
            has_next_page: page < total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, None, 1, 10)]
    #[case(Some("3"), Some("20"), 3, 20)]
    #[case(Some("0"), Some("-5"), 1, 10)]
    #[case(Some("abc"), Some("1000"), 1, 100)]
    #[case(Some("2x"), Some("7.9"), 2, 7)]
    fn test_parse(
        #[case] page: Option<&str>,
        #[case] limit: Option<&str>,
        #[case] expected_page: u64,
        #[case] expected_limit: u64,
    ) {
        let pagination = Pagination::parse(page, limit, PaginationOptions::default());
        assert_eq!(pagination.page, expected_page);
        assert_eq!(pagination.limit, expected_limit);
        assert_eq!(pagination.skip, (expected_page - 1) * expected_limit);
    }

    #[test]
    fn test_zero_limits_are_clamped() {
        let options = PaginationOptions {
            default_limit: 0,
            max_limit: 0,
        };
        let pagination = Pagination::parse(None, Some("50"), options);
        assert_eq!(pagination.limit, 1);
    }

    #[rstest]
    #[case("9223372036854775807")]
    #[case("18446744073709551615")]
    fn test_huge_page_skip_stays_in_range(#[case] page: &str) {
        let pagination = Pagination::parse(Some(page), Some("100"), PaginationOptions::default());
        assert!(pagination.page > 1);
        assert_eq!(pagination.skip, MAX_SKIP);

        let meta = pagination.meta(3);
        assert!(!meta.has_next_page);
        assert!(meta.has_previous_page);
    }

    #[test]
    fn test_meta_for_empty_result() {
        let meta = PageMeta::new(1, 10, 0);
        assert_eq!(meta.total_pages, 1);
        assert!(!meta.has_previous_page);
        assert!(!meta.has_next_page);
    }

    #[test]
    fn test_meta_serializes_camel_case() {
        let json = serde_json::to_value(PageMeta::new(2, 10, 25)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "page": 2,
                "limit": 10,
                "totalItems": 25,
                "totalPages": 3,
                "hasPreviousPage": true,
                "hasNextPage": true
            })
        );
    }

    proptest! {
        #[test]
        fn prop_window_respects_limits(page in any::<i32>(), limit in any::<i32>()) {
            let page = page.to_string();
            let limit = limit.to_string();
            let p = Pagination::parse(Some(&page), Some(&limit), PaginationOptions::default());

            prop_assert!(p.page >= 1);
            prop_assert!(p.limit >= 1 && p.limit <= MAX_LIMIT);
            prop_assert_eq!(p.skip, (p.page - 1) * p.limit);
        }

        #[test]
        fn prop_meta_is_consistent(page in 1u64..500, limit in 1u64..=100, total in 0u64..10_000) {
            let meta = PageMeta::new(page, limit, total);
            let expected_pages = std::cmp::max(1, (total + limit - 1) / limit);

            prop_assert_eq!(meta.total_pages, expected_pages);
            prop_assert_eq!(meta.has_next_page, page < meta.total_pages);
            prop_assert_eq!(meta.has_previous_page, page > 1);
        }
    }
}
