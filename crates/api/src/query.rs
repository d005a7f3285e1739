//! Shared query parameter types for API handlers.

use serde::Deserialize;

/// Raw `?page=&limit=` values.
///
/// Kept as strings so out-of-range or non-numeric input is reported with
/// the pagination error message rather than a generic query rejection.
#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    pub page: Option<String>,
    pub limit: Option<String>,
}
