//! Bucket CORS rules needed for browser uploads and playback.

use aws_sdk_s3::types::{CorsConfiguration, CorsRule};

use crate::storage::StorageError;

pub const ALLOWED_METHODS: [&str; 3] = ["GET", "PUT", "HEAD"];

/// Headers the browser may read from bucket responses (range playback).
pub const EXPOSED_HEADERS: [&str; 3] = ["ETag", "Content-Length", "Content-Range"];

pub const MAX_AGE_SECS: i32 = 3600;

/// Build a single-rule CORS configuration for `origins`.
pub fn build_cors_configuration(origins: &[String]) -> Result<CorsConfiguration, StorageError> {
    if origins.is_empty() {
        return Err(StorageError::Config(
            "At least one CORS origin is required".into(),
        ));
    }

    let mut rule = CorsRule::builder()
        .allowed_headers("*")
        .max_age_seconds(MAX_AGE_SECS);
    for method in ALLOWED_METHODS {
        rule = rule.allowed_methods(method);
    }
    for origin in origins {
        rule = rule.allowed_origins(origin);
    }
    for header in EXPOSED_HEADERS {
        rule = rule.expose_headers(header);
    }
    let rule = rule
        .build()
        .map_err(|e| StorageError::Config(e.to_string()))?;

    CorsConfiguration::builder()
        .cors_rules(rule)
        .build()
        .map_err(|e| StorageError::Config(e.to_string()))
}

/// Split a comma-separated origin list, dropping blanks.
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
