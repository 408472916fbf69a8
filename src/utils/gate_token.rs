//! Password-gate verification tokens.
//!
//! After a visitor answers a link's password correctly they receive a signed,
//! time-limited token scoped to that short code (delivered as a cookie).
//! Subsequent resolutions present the token instead of the password.
//!
//! Token layout: `base64url(code:expiry_unix) . hex(hmac_sha256(payload))`.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Token lifetime in seconds (24 hours, matching the shared cache tier).
pub const GATE_TOKEN_TTL_SECONDS: i64 = 86_400;

/// Issues a gate token for a short code, valid for [`GATE_TOKEN_TTL_SECONDS`].
pub fn issue(code: &str, secret: &str) -> String {
    let expires_at = Utc::now().timestamp() + GATE_TOKEN_TTL_SECONDS;
    let payload = format!("{}:{}", code, expires_at);
    let signature = sign(&payload, secret);
    format!("{}.{}", URL_SAFE_NO_PAD.encode(&payload), signature)
}

/// Verifies a gate token against a short code.
///
/// Returns false for malformed tokens, signature mismatches, tokens scoped
/// to a different code, and expired tokens.
pub fn verify(token: &str, code: &str, secret: &str) -> bool {
    let Some((encoded_payload, signature)) = token.split_once('.') else {
        return false;
    };
    let Ok(payload_bytes) = URL_SAFE_NO_PAD.decode(encoded_payload) else {
        return false;
    };
    let Ok(payload) = String::from_utf8(payload_bytes) else {
        return false;
    };
    let Some((token_code, expires_at)) = payload.rsplit_once(':') else {
        return false;
    };
    let Ok(expires_at) = expires_at.parse::<i64>() else {
        return false;
    };

    if token_code != code || expires_at < Utc::now().timestamp() {
        return false;
    }

    let Ok(signature_bytes) = hex::decode(signature) else {
        return false;
    };
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(payload.as_bytes());
    mac.verify_slice(&signature_bytes).is_ok()
}

fn sign(payload: &str, secret: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(payload.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_then_verify() {
        let token = issue("abc1234", "secret");
        assert!(verify(&token, "abc1234", "secret"));
    }

    #[test]
    fn test_token_is_scoped_to_code() {
        let token = issue("abc1234", "secret");
        assert!(!verify(&token, "zzz9999", "secret"));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = issue("abc1234", "secret");
        assert!(!verify(&token, "abc1234", "other-secret"));
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let token = issue("abc1234", "secret");
        let (_, signature) = token.split_once('.').unwrap();
        let forged_payload = URL_SAFE_NO_PAD.encode("zzz9999:9999999999");
        let forged = format!("{}.{}", forged_payload, signature);
        assert!(!verify(&forged, "zzz9999", "secret"));
    }

    #[test]
    fn test_garbage_token_rejected() {
        assert!(!verify("garbage", "abc1234", "secret"));
        assert!(!verify("a.b", "abc1234", "secret"));
    }
}
