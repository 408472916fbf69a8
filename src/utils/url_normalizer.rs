//! URL normalization and sanitization utilities.
//!
//! The normalized form is what gets content-hashed for deduplication, so the
//! rules here directly decide which submissions collapse onto one short code.

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
/// 5. **Query parameters**: Preserved as-is
/// 6. **Path**: Preserved with case sensitivity
///
/// # Security
///
/// Rejects dangerous protocols like `javascript:`, `data:`, `file:`, etc.
///
/// # Errors
///
/// Returns [`UrlNormalizationError::InvalidFormat`] for malformed URLs.
/// Returns [`UrlNormalizationError::UnsupportedProtocol`] for non-HTTP(S) schemes.
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

    let is_default_port = matches!(
        (url.scheme(), url.port()),
        ("http", Some(80)) | ("https", Some(443))
    );
    if is_default_port {
        url.set_port(None).map_err(|_| {
            UrlNormalizationError::NormalizationFailed("Failed to remove default port".to_string())
        })?;
    }

    Ok(url.to_string())
}

/// Extracts the hostname from a URL, if it parses.
pub fn extract_domain(input: &str) -> Option<String> {
    Url::parse(input)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_uppercase_host() {
        let result = normalize_url("https://EXAMPLE.COM/path");
        assert_eq!(result.unwrap(), "https://example.com/path");
    }

    #[test]
    fn test_normalize_remove_default_https_port() {
        let result = normalize_url("https://example.com:443/path");
        assert_eq!(result.unwrap(), "https://example.com/path");
    }

    #[test]
    fn test_normalize_keep_custom_port() {
        let result = normalize_url("http://example.com:8080/path");
        assert_eq!(result.unwrap(), "http://example.com:8080/path");
    }

    #[test]
    fn test_normalize_remove_fragment() {
        let result = normalize_url("https://example.com/page#section");
        assert_eq!(result.unwrap(), "https://example.com/page");
    }

    #[test]
    fn test_normalize_preserve_query_params() {
        let result = normalize_url("https://example.com/search?q=rust&lang=en");
        assert_eq!(result.unwrap(), "https://example.com/search?q=rust&lang=en");
    }

    #[test]
    fn test_normalize_complex_url() {
        let result = normalize_url("HTTPS://EXAMPLE.COM:443/Path?key=VALUE#anchor");
        assert_eq!(result.unwrap(), "https://example.com/Path?key=VALUE");
    }

    #[test]
    fn test_normalize_invalid_url() {
        let result = normalize_url("not a valid url");
        assert!(matches!(
            result.unwrap_err(),
            UrlNormalizationError::InvalidFormat(_)
        ));
    }

    #[test]
    fn test_normalize_javascript_protocol() {
        let result = normalize_url("javascript:alert('xss')");
        assert!(matches!(
            result.unwrap_err(),
            UrlNormalizationError::UnsupportedProtocol
        ));
    }

    #[test]
    fn test_normalize_data_protocol() {
        let result = normalize_url("data:text/plain,Hello");
        assert!(matches!(
            result.unwrap_err(),
            UrlNormalizationError::UnsupportedProtocol
        ));
    }

    #[test]
    fn test_normalize_file_protocol() {
        let result = normalize_url("file:///home/user/document.txt");
        assert!(matches!(
            result.unwrap_err(),
            UrlNormalizationError::UnsupportedProtocol
        ));
    }

    #[test]
    fn test_normalize_no_protocol() {
        assert!(normalize_url("example.com").is_err());
    }

    #[test]
    fn test_extract_domain() {
        assert_eq!(
            extract_domain("https://sub.example.com/path").as_deref(),
            Some("sub.example.com")
        );
        assert_eq!(extract_domain("not a url"), None);
    }
}
