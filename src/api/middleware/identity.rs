//! Account identity extraction.
//!
//! Authentication itself happens upstream (a trusted gateway terminates the
//! session and forwards the account in a header), so identity here is header
//! parsing plus the admin allow-list check.

use axum::http::HeaderMap;
use serde_json::json;

use crate::config::Config;
use crate::error::AppError;

/// Header carrying the authenticated account, set by the trusted gateway.
pub const ACCOUNT_HEADER: &str = "x-account-id";

/// Returns the account forwarded by the gateway, if any.
pub fn account_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(ACCOUNT_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Requires an authenticated account.
///
/// # Errors
///
/// Returns `401 Unauthorized` when the header is absent or empty.
pub fn require_account(headers: &HeaderMap) -> Result<String, AppError> {
    account_id(headers).ok_or_else(|| {
        AppError::unauthorized(
            "Authentication required",
            json!({ "reason": "Missing account header" }),
        )
    })
}

/// Requires an authenticated account on the admin allow-list.
///
/// # Errors
///
/// Returns `401 Unauthorized` without an account, `403 Forbidden` for a
/// non-admin account.
pub fn require_admin(headers: &HeaderMap, config: &Config) -> Result<String, AppError> {
    let account = require_account(headers)?;
    if !config.is_admin(&account) {
        return Err(AppError::forbidden(
            "Admin privileges required",
            json!({}),
        ));
    }
    Ok(account)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_missing_header_yields_none() {
        assert!(account_id(&HeaderMap::new()).is_none());
    }

    #[test]
    fn test_blank_header_yields_none() {
        let mut headers = HeaderMap::new();
        headers.insert(ACCOUNT_HEADER, HeaderValue::from_static("   "));
        assert!(account_id(&headers).is_none());
    }

    #[test]
    fn test_header_is_trimmed() {
        let mut headers = HeaderMap::new();
        headers.insert(ACCOUNT_HEADER, HeaderValue::from_static(" acct-1 "));
        assert_eq!(account_id(&headers).as_deref(), Some("acct-1"));
    }
}
