//! Path and query parameter validation.
//!
//! Every rejection carries a stable message that handlers return verbatim in
//! the error envelope, so clients can match on it.

use std::sync::LazyLock;

use regex::Regex;
use uuid::Uuid;

use crate::error::CoreError;
use crate::types::{EntityId, NumericUserId};

pub const INVALID_USER_ID: &str = "Invalid user ID format";
pub const INVALID_VIDEO_ID: &str = "Invalid video ID format";
pub const INVALID_NUMERIC_USER_ID: &str = "Invalid numeric user ID";
pub const INVALID_PAGINATION: &str = "Invalid pagination parameters";

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_LIMIT: i64 = 12;
pub const MAX_PAGE_LIMIT: i64 = 50;

const UUID_V4_PATTERN: &str =
    r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-4[0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$";

static UUID_V4_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(UUID_V4_PATTERN).expect("valid regex"));

/// True when `value` is a hyphenated UUID v4 (either letter case).
pub fn is_valid_uuid(value: &str) -> bool {
    UUID_V4_RE.is_match(value)
}

/// JSON-value variant of [`is_valid_uuid`]: anything that is not a string
/// is rejected.
pub fn is_valid_uuid_value(value: &serde_json::Value) -> bool {
    value.as_str().is_some_and(is_valid_uuid)
}

pub fn parse_user_id(raw: &str) -> Result<EntityId, CoreError> {
    parse_uuid_v4(raw, INVALID_USER_ID)
}

pub fn parse_video_id(raw: &str) -> Result<EntityId, CoreError> {
    parse_uuid_v4(raw, INVALID_VIDEO_ID)
}

fn parse_uuid_v4(raw: &str, message: &'static str) -> Result<EntityId, CoreError> {
    if !is_valid_uuid(raw) {
        return Err(CoreError::validation(message));
    }
    Uuid::parse_str(raw).map_err(|_| CoreError::validation(message))
}

/// Parse a numeric user id: ASCII digits only, strictly positive, fits `i64`.
pub fn parse_numeric_user_id(raw: &str) -> Result<NumericUserId, CoreError> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CoreError::validation(INVALID_NUMERIC_USER_ID));
    }
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(CoreError::validation(INVALID_NUMERIC_USER_ID)),
    }
}

/// A validated, 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: i64,
    pub limit: i64,
}

impl Page {
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }

    pub fn total_pages(&self, total: i64) -> i64 {
        if total <= 0 {
            0
        } else {
            (total + self.limit - 1) / self.limit
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

/// Validate raw `?page=&limit=` query values.
///
/// Missing values fall back to defaults. Anything present must be a positive
/// integer, `limit` must not exceed [`MAX_PAGE_LIMIT`], and the resulting
/// offset must fit in an `i64`.
pub fn parse_pagination(page: Option<&str>, limit: Option<&str>) -> Result<Page, CoreError> {
    let page = parse_positive(page, DEFAULT_PAGE)?;
    let limit = parse_positive(limit, DEFAULT_PAGE_LIMIT)?;

    if limit > MAX_PAGE_LIMIT || (page - 1).checked_mul(limit).is_none() {
        return Err(CoreError::validation(INVALID_PAGINATION));
    }

    Ok(Page { page, limit })
}

fn parse_positive(raw: Option<&str>, default: i64) -> Result<i64, CoreError> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    match raw.trim().parse::<i64>() {
        Ok(value) if value >= 1 => Ok(value),
        _ => Err(CoreError::validation(INVALID_PAGINATION)),
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    #[test]
    fn accepts_v4_uuids_in_either_case() {
        assert!(is_valid_uuid("3f2504e0-4f89-41d3-9a0c-0305e82c3301"));
        assert!(is_valid_uuid("3F2504E0-4F89-41D3-9A0C-0305E82C3301"));
        assert!(is_valid_uuid(&Uuid::new_v4().to_string()));
    }

    #[test]
    fn rejects_non_v4_and_malformed_uuids() {
        // Version nibble is 1, not 4.
        assert!(!is_valid_uuid("3f2504e0-4f89-11d3-9a0c-0305e82c3301"));
        // Variant nibble outside 8..b.
        assert!(!is_valid_uuid("3f2504e0-4f89-41d3-7a0c-0305e82c3301"));
        assert!(!is_valid_uuid("3f2504e04f8941d39a0c0305e82c3301"));
        assert!(!is_valid_uuid(" 3f2504e0-4f89-41d3-9a0c-0305e82c3301"));
        assert!(!is_valid_uuid("not-a-uuid"));
        assert!(!is_valid_uuid(""));
    }

    #[test]
    fn non_string_values_are_never_uuids() {
        assert!(is_valid_uuid_value(&json!("3f2504e0-4f89-41d3-9a0c-0305e82c3301")));
        assert!(!is_valid_uuid_value(&json!(null)));
        assert!(!is_valid_uuid_value(&json!(42)));
        assert!(!is_valid_uuid_value(&json!(true)));
        assert!(!is_valid_uuid_value(&json!(["3f2504e0-4f89-41d3-9a0c-0305e82c3301"])));
        assert!(!is_valid_uuid_value(&json!({ "id": "3f2504e0-4f89-41d3-9a0c-0305e82c3301" })));
    }

    #[test]
    fn parse_user_id_reports_stable_message() {
        let err = parse_user_id("abc").unwrap_err();
        assert_matches!(err, CoreError::Validation(ref msg) if msg == INVALID_USER_ID);

        let id = Uuid::new_v4();
        assert_eq!(parse_user_id(&id.to_string()).unwrap(), id);
    }

    #[test]
    fn numeric_user_id_rules() {
        assert_eq!(parse_numeric_user_id("1").unwrap(), 1);
        assert_eq!(parse_numeric_user_id("007").unwrap(), 7);
        for bad in ["", "0", "-5", "+5", "1.5", "12a", " 12", "99999999999999999999"] {
            assert_matches!(
                parse_numeric_user_id(bad),
                Err(CoreError::Validation(ref msg)) if msg == INVALID_NUMERIC_USER_ID,
                "expected {bad:?} to be rejected"
            );
        }
    }

    #[test]
    fn pagination_defaults_and_bounds() {
        assert_eq!(parse_pagination(None, None).unwrap(), Page::default());

        let page = parse_pagination(Some("3"), Some("10")).unwrap();
        assert_eq!(page, Page { page: 3, limit: 10 });
        assert_eq!(page.offset(), 20);

        assert_eq!(parse_pagination(None, Some("50")).unwrap().limit, 50);

        for (p, l) in [
            (Some("0"), None),
            (Some("-1"), None),
            (Some("abc"), None),
            (None, Some("0")),
            (None, Some("51")),
            (Some("9223372036854775807"), Some("50")),
        ] {
            assert_matches!(
                parse_pagination(p, l),
                Err(CoreError::Validation(ref msg)) if msg == INVALID_PAGINATION
            );
        }
    }

    #[test]
    fn total_pages_rounds_up() {
        let page = Page { page: 1, limit: 12 };
        assert_eq!(page.total_pages(0), 0);
        assert_eq!(page.total_pages(12), 1);
        assert_eq!(page.total_pages(13), 2);
    }
}
