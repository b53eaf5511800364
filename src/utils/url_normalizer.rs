//! URL normalization for duplicate detection.
//!
//! Two submissions of the "same" URL must map to the same stored string so
//! the registry can reuse the existing short code. Normalization covers
//! scheme/host case, fragments, default ports, and trailing slashes.

use url::Url;

/// Errors that can occur during URL normalization.
#[derive(Debug, thiserror::Error)]
pub enum UrlNormalizationError {
    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Only HTTP and HTTPS protocols are allowed")]
    UnsupportedProtocol,

    #[error("Failed to normalize URL: {0}")]
    NormalizationFailed(String),
}

/// Normalizes a URL to a canonical form.
///
/// # Normalization Rules
///
/// 1. **Protocol**: Only HTTP and HTTPS are allowed
/// 2. **Hostname**: Converted to lowercase
/// 3. **Default ports**: Removed (80 for HTTP, 443 for HTTPS)
/// 4. **Fragments**: Removed (e.g., `#section`)
/// 5. **Trailing slashes**: Stripped from non-root paths
/// 6. **Query parameters**: Preserved as-is
///
/// # Errors
///
/// Returns [`UrlNormalizationError::InvalidFormat`] for malformed URLs.
/// Returns [`UrlNormalizationError::UnsupportedProtocol`] for non-HTTP(S) schemes.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(
///     normalize_url("HTTPS://EXAMPLE.COM:443/Path/").unwrap(),
///     "https://example.com/Path"
/// );
/// ```
pub fn normalize_url(input: &str) -> Result<String, UrlNormalizationError> {
    let mut url =
        Url::parse(input).map_err(|e| UrlNormalizationError::InvalidFormat(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        _ => return Err(UrlNormalizationError::UnsupportedProtocol),
    }

    if let Some(host) = url.host_str() {
        let host_lowercase = host.to_ascii_lowercase();
        url.set_host(Some(&host_lowercase)).map_err(|_| {
            UrlNormalizationError::NormalizationFailed("Failed to set normalized host".to_string())
        })?;
    }

    url.set_fragment(None);

    // Default ports are already dropped by the parser; this covers explicit
    // non-standard serializations fed back through the registry.
    let is_default_port = matches!(
        (url.scheme(), url.port()),
        ("http", Some(80)) | ("https", Some(443))
    );
    if is_default_port {
        url.set_port(None).map_err(|_| {
            UrlNormalizationError::NormalizationFailed("Failed to remove default port".to_string())
        })?;
    }

    let path = url.path();
    if path.len() > 1 && path.ends_with('/') {
        let trimmed = path.trim_end_matches('/').to_string();
        url.set_path(if trimmed.is_empty() { "/" } else { &trimmed });
    }

    Ok(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_simple_http() {
        assert_eq!(normalize_url("http://example.com").unwrap(), "http://example.com/");
    }

    #[test]
    fn test_normalize_simple_https() {
        assert_eq!(
            normalize_url("https://example.com").unwrap(),
            "https://example.com/"
        );
    }

    #[test]
    fn test_normalize_uppercase_host() {
        assert_eq!(
            normalize_url("https://EXAMPLE.COM/path").unwrap(),
            "https://example.com/path"
        );
    }

    #[test]
    fn test_normalize_remove_default_https_port() {
        assert_eq!(
            normalize_url("https://example.com:443/path").unwrap(),
            "https://example.com/path"
        );
    }

    #[test]
    fn test_normalize_keep_custom_port() {
        assert_eq!(
            normalize_url("http://example.com:8080/path").unwrap(),
            "http://example.com:8080/path"
        );
    }

    #[test]
    fn test_normalize_remove_fragment() {
        assert_eq!(
            normalize_url("https://example.com/page#section").unwrap(),
            "https://example.com/page"
        );
    }

    #[test]
    fn test_normalize_trailing_slash_stripped() {
        assert_eq!(
            normalize_url("https://example.com/a/b/").unwrap(),
            "https://example.com/a/b"
        );
    }

    #[test]
    fn test_normalize_trailing_slash_equivalence() {
        assert_eq!(
            normalize_url("https://example.com/a/b/").unwrap(),
            normalize_url("https://example.com/a/b").unwrap()
        );
    }

    #[test]
    fn test_normalize_root_path_keeps_slash() {
        assert_eq!(
            normalize_url("https://example.com/").unwrap(),
            "https://example.com/"
        );
    }

    #[test]
    fn test_normalize_preserve_query_params() {
        assert_eq!(
            normalize_url("https://example.com/a/b?x=1").unwrap(),
            "https://example.com/a/b?x=1"
        );
    }

    #[test]
    fn test_normalize_trailing_slash_with_query() {
        assert_eq!(
            normalize_url("https://example.com/a/b/?x=1").unwrap(),
            "https://example.com/a/b?x=1"
        );
    }

    #[test]
    fn test_normalize_preserves_path_case() {
        assert_eq!(
            normalize_url("https://example.com/CaseSensitive").unwrap(),
            "https://example.com/CaseSensitive"
        );
    }

    #[test]
    fn test_normalize_complex_url() {
        assert_eq!(
            normalize_url("HTTPS://EXAMPLE.COM:443/Path/?key=VALUE#anchor").unwrap(),
            "https://example.com/Path?key=VALUE"
        );
    }

    #[test]
    fn test_normalize_invalid_url() {
        assert!(matches!(
            normalize_url("not a valid url").unwrap_err(),
            UrlNormalizationError::InvalidFormat(_)
        ));
    }

    #[test]
    fn test_normalize_no_protocol() {
        assert!(matches!(
            normalize_url("example.com").unwrap_err(),
            UrlNormalizationError::InvalidFormat(_)
        ));
    }

    #[test]
    fn test_normalize_ftp_protocol() {
        assert!(matches!(
            normalize_url("ftp://example.com/file.txt").unwrap_err(),
            UrlNormalizationError::UnsupportedProtocol
        ));
    }

    #[test]
    fn test_normalize_javascript_protocol() {
        assert!(matches!(
            normalize_url("javascript:alert('xss')").unwrap_err(),
            UrlNormalizationError::UnsupportedProtocol
        ));
    }

    #[test]
    fn test_normalize_data_protocol() {
        assert!(matches!(
            normalize_url("data:text/plain,Hello").unwrap_err(),
            UrlNormalizationError::UnsupportedProtocol
        ));
    }

    #[test]
    fn test_normalize_encoded_characters() {
        let result = normalize_url("https://example.com/path%20with%20spaces").unwrap();
        assert!(result.contains("path%20with%20spaces"));
    }
}
