//! Helpers for building Gemini endpoint URLs from a configurable base.

/// Normalize a base URL by removing trailing slashes
///
/// # Examples
///
/// ```
/// use quickgpt::utils::url::normalize_base_url;
///
/// assert_eq!(
///     normalize_base_url("https://generativelanguage.googleapis.com/v1beta/"),
///     "https://generativelanguage.googleapis.com/v1beta"
/// );
/// ```
pub fn normalize_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

/// Join a base URL and an endpoint path without doubling the separator.
///
/// # Examples
///
/// ```
/// use quickgpt::utils::url::construct_api_url;
///
/// assert_eq!(
///     construct_api_url("http://localhost:8080/v1beta/", "/models/gemini-2.5-flash:streamGenerateContent"),
///     "http://localhost:8080/v1beta/models/gemini-2.5-flash:streamGenerateContent"
/// );
/// ```
pub fn construct_api_url(base_url: &str, endpoint: &str) -> String {
    let normalized_base = normalize_base_url(base_url);
    let endpoint = endpoint.trim_start_matches('/');
    format!("{normalized_base}/{endpoint}")
}

/// Check that a user-supplied base URL is usable, returning it normalized.
pub fn validate_base_url(input: &str) -> Result<String, String> {
    let trimmed = input.trim();
    let has_scheme = trimmed.starts_with("https://") || trimmed.starts_with("http://");
    let normalized = normalize_base_url(trimmed);
    let host = normalized.split_once("://").map(|(_, rest)| rest).unwrap_or("");
    if !has_scheme || host.is_empty() {
        return Err(format!(
            "'{input}' is not an http(s) URL (example: https://generativelanguage.googleapis.com/v1beta)"
        ));
    }
    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_every_trailing_slash() {
        assert_eq!(
            normalize_base_url("https://example.com/v1beta///"),
            "https://example.com/v1beta"
        );
        assert_eq!(normalize_base_url("https://example.com"), "https://example.com");
        assert_eq!(normalize_base_url("///"), "");
    }

    #[test]
    fn construct_joins_with_single_slash() {
        assert_eq!(
            construct_api_url("https://example.com/v1beta", "models/x:streamGenerateContent"),
            "https://example.com/v1beta/models/x:streamGenerateContent"
        );
        assert_eq!(
            construct_api_url("https://example.com/v1beta//", "///models"),
            "https://example.com/v1beta/models"
        );
    }

    #[test]
    fn validate_accepts_http_and_https() {
        assert_eq!(
            validate_base_url(" https://example.com/v1beta/ ").as_deref(),
            Ok("https://example.com/v1beta")
        );
        assert_eq!(
            validate_base_url("http://localhost:8080").as_deref(),
            Ok("http://localhost:8080")
        );
    }

    #[test]
    fn validate_rejects_missing_scheme_or_host() {
        assert!(validate_base_url("example.com/v1beta").is_err());
        assert!(validate_base_url("ftp://example.com").is_err());
        assert!(validate_base_url("https://").is_err());
        assert!(validate_base_url("https:///").is_err());
    }
}
