//! Content and identifier hashing.

use sha2::{Digest, Sha256};

/// Hex SHA-256 of a normalized URL. Used as the global deduplication key and
/// as the scan-result cache key.
pub fn hash_url(normalized_url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(normalized_url.as_bytes());
    hex::encode(hasher.finalize())
}

/// Salted hex SHA-256 of a client IP. Raw IPs are never persisted.
pub fn hash_ip(ip: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(ip.as_bytes());
    hasher.update(salt.as_bytes());
    hex::encode(hasher.finalize())
}

/// Hex SHA-256 of a raw API key. Only the hash is stored.
pub fn hash_api_key(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_url_deterministic() {
        assert_eq!(
            hash_url("https://example.com/a"),
            hash_url("https://example.com/a")
        );
    }

    #[test]
    fn test_hash_url_distinguishes_inputs() {
        assert_ne!(
            hash_url("https://example.com/a"),
            hash_url("https://example.com/b")
        );
    }

    #[test]
    fn test_hash_ip_salted() {
        assert_ne!(hash_ip("1.2.3.4", "salt-a"), hash_ip("1.2.3.4", "salt-b"));
        assert_ne!(hash_ip("1.2.3.4", "salt"), "1.2.3.4");
    }

    #[test]
    fn test_hash_is_hex_sha256() {
        let h = hash_url("https://example.com");
        assert_eq!(h.len(), 64);
        assert!(h.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
