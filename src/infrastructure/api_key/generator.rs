//! API token generation
//!
//! Tokens are 128 bits from the thread-local CSPRNG, hex-encoded.

use rand::RngCore;

use crate::domain::api_key::ApiToken;

/// Number of random bytes in a generated token
pub const TOKEN_BYTES: usize = 16;

/// Generator for opaque API tokens
#[derive(Debug, Clone)]
pub struct TokenGenerator {
    token_bytes: usize,
}

impl TokenGenerator {
    pub fn new() -> Self {
        Self {
            token_bytes: TOKEN_BYTES,
        }
    }

    /// Set the number of random bytes
    pub fn with_token_bytes(mut self, bytes: usize) -> Self {
        self.token_bytes = bytes;
        self
    }

    /// Generate a new random token
    pub fn generate(&self) -> ApiToken {
        let mut random_bytes = vec![0u8; self.token_bytes];
        rand::thread_rng().fill_bytes(&mut random_bytes);
        ApiToken::new(hex::encode(random_bytes))
    }
}

impl Default for TokenGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Constant-time string comparison to prevent timing attacks
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.as_bytes()
        .iter()
        .zip(b.as_bytes())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_token_is_lowercase_hex() {
        let token = TokenGenerator::new().generate();

        assert_eq!(token.as_str().len(), 32);
        assert!(token
            .as_str()
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn test_token_uniqueness() {
        let generator = TokenGenerator::new();
        assert_ne!(generator.generate(), generator.generate());
    }

    #[test]
    fn test_custom_token_bytes() {
        let token = TokenGenerator::new().with_token_bytes(32).generate();
        assert_eq!(token.as_str().len(), 64);
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("hello", "hello"));
        assert!(!constant_time_compare("hello", "world"));
        assert!(!constant_time_compare("hello", "hell"));
    }
}
