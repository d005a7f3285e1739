//! Profile field rules for self-service edits.

use validator::{ValidateEmail, ValidateUrl};

use crate::error::CoreError;

pub const DISPLAY_NAME_MAX_CHARS: usize = 50;
pub const BIO_MAX_CHARS: usize = 500;
pub const URL_MAX_LEN: usize = 2048;

/// Fallback display name when an email has no usable local part.
const DEFAULT_DISPLAY_NAME: &str = "user";

/// Trim and check a display name: 1..=50 characters, no control characters.
pub fn validate_display_name(raw: &str) -> Result<String, CoreError> {
    let name = raw.trim();
    let len = name.chars().count();
    if len == 0 || len > DISPLAY_NAME_MAX_CHARS {
        return Err(CoreError::validation(format!(
            "Display name must be 1-{DISPLAY_NAME_MAX_CHARS} characters"
        )));
    }
    if name.chars().any(char::is_control) {
        return Err(CoreError::validation(
            "Display name must not contain control characters",
        ));
    }
    Ok(name.to_string())
}

/// Trim a bio. An empty bio clears the field.
pub fn validate_bio(raw: &str) -> Result<Option<String>, CoreError> {
    let bio = raw.trim();
    if bio.chars().count() > BIO_MAX_CHARS {
        return Err(CoreError::validation(format!(
            "Bio must be at most {BIO_MAX_CHARS} characters"
        )));
    }
    Ok((!bio.is_empty()).then(|| bio.to_string()))
}

/// Validate an http(s) URL for `field`. An empty value clears the field.
pub fn validate_profile_url(field: &str, raw: &str) -> Result<Option<String>, CoreError> {
    let url = raw.trim();
    if url.is_empty() {
        return Ok(None);
    }
    let scheme_ok = url.starts_with("https://") || url.starts_with("http://");
    if !scheme_ok || url.len() > URL_MAX_LEN || !url.validate_url() {
        return Err(CoreError::validation(format!(
            "{field} must be a valid http(s) URL"
        )));
    }
    Ok(Some(url.to_string()))
}

/// Lowercase and trim an email address, rejecting anything malformed.
pub fn normalize_email(raw: &str) -> Result<String, CoreError> {
    let email = raw.trim().to_lowercase();
    if !email.validate_email() {
        return Err(CoreError::validation("Invalid email address"));
    }
    Ok(email)
}

/// Display name seeded on first sign-in: the email's local part.
pub fn default_display_name(email: &str) -> String {
    let local = email.split('@').next().unwrap_or_default().trim();
    let name: String = local
        .chars()
        .filter(|c| !c.is_control())
        .take(DISPLAY_NAME_MAX_CHARS)
        .collect();
    if name.is_empty() {
        DEFAULT_DISPLAY_NAME.to_string()
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn display_name_is_trimmed_and_bounded() {
        assert_eq!(validate_display_name("  Ada  ").unwrap(), "Ada");
        assert!(validate_display_name("   ").is_err());
        assert!(validate_display_name(&"x".repeat(51)).is_err());
        assert!(validate_display_name(&"é".repeat(50)).is_ok());
        assert!(validate_display_name("bad\u{0007}name").is_err());
    }

    #[test]
    fn empty_bio_clears() {
        assert_eq!(validate_bio("  ").unwrap(), None);
        assert_eq!(validate_bio(" hi ").unwrap().as_deref(), Some("hi"));
        assert!(validate_bio(&"b".repeat(501)).is_err());
    }

    #[test]
    fn profile_urls_must_be_http() {
        assert_eq!(
            validate_profile_url("website_url", "https://example.com/me").unwrap(),
            Some("https://example.com/me".to_string())
        );
        assert_eq!(validate_profile_url("website_url", "").unwrap(), None);
        assert_matches!(
            validate_profile_url("twitter_url", "javascript:alert(1)"),
            Err(CoreError::Validation(ref msg)) if msg.contains("twitter_url")
        );
        assert!(validate_profile_url("photo_url", "ftp://example.com/a.png").is_err());
    }

    #[test]
    fn emails_are_normalized() {
        assert_eq!(normalize_email("  Ada@Example.COM ").unwrap(), "ada@example.com");
        assert!(normalize_email("not-an-email").is_err());
    }

    #[test]
    fn default_display_name_uses_local_part() {
        assert_eq!(default_display_name("ada.lovelace@example.com"), "ada.lovelace");
        assert_eq!(default_display_name("@example.com"), "user");
    }
}
