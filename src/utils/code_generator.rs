//! Short code generation.
//!
//! Codes are drawn from a base62 alphabet: 7 characters by default, widened
//! to 10 when the shorter space keeps colliding.

use rand::Rng;

const ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Default short code length.
pub const CODE_LENGTH: usize = 7;

/// Fallback length used after repeated collisions at the default length.
pub const WIDENED_CODE_LENGTH: usize = 10;

/// Generates a random base62 code of the given length.
pub fn generate_code(length: usize) -> String {
    let mut rng = rand::rng();
    (0..length)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_code_default_length() {
        let code = generate_code(CODE_LENGTH);
        assert_eq!(code.len(), 7);
    }

    #[test]
    fn test_generate_code_widened_length() {
        let code = generate_code(WIDENED_CODE_LENGTH);
        assert_eq!(code.len(), 10);
    }

    #[test]
    fn test_generate_code_base62_only() {
        let code = generate_code(CODE_LENGTH);
        assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_generate_code_produces_unique_codes() {
        let mut codes = HashSet::new();

        for _ in 0..1000 {
            codes.insert(generate_code(CODE_LENGTH));
        }

        assert_eq!(codes.len(), 1000);
    }
}
