//! Confirmation Token Secret Value Object
//!
//! The opaque string embedded in a confirmation link. It is the sole
//! credential needed to confirm an email address, so it is treated as a
//! bearer secret: Debug output is redacted, there is no Display impl,
//! and equality is constant-time.

use platform::crypto;
use std::fmt;

/// Bytes of entropy per token (256 bits)
const TOKEN_ENTROPY_BYTES: usize = 32;

/// Opaque high-entropy confirmation token secret
#[derive(Clone)]
pub struct TokenSecret(String);

impl TokenSecret {
    /// Generate a fresh random token (URL-safe base64 of 32 OS-random bytes)
    pub fn generate() -> Self {
        Self(crypto::to_base64_url(&crypto::random_bytes(
            TOKEN_ENTROPY_BYTES,
        )))
    }

    /// Wrap an existing token value (from database or request)
    pub fn from_db(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The token string, for link building and storage only
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PartialEq for TokenSecret {
    fn eq(&self, other: &Self) -> bool {
        crypto::constant_time_eq(self.0.as_bytes(), other.0.as_bytes())
    }
}

impl Eq for TokenSecret {}

impl fmt::Debug for TokenSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TokenSecret").field(&"[REDACTED]").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_is_url_safe_base64() {
        let secret = TokenSecret::generate();
        let decoded = crypto::from_base64_url(secret.as_str()).unwrap();
        assert_eq!(decoded.len(), TOKEN_ENTROPY_BYTES);
    }

    #[test]
    fn test_generate_is_unique() {
        let a = TokenSecret::generate();
        let b = TokenSecret::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn test_equality() {
        let a = TokenSecret::from_db("some-token-value");
        let b = TokenSecret::from_db("some-token-value");
        let c = TokenSecret::from_db("other-token-value");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_debug_redaction() {
        let secret = TokenSecret::generate();
        let debug = format!("{:?}", secret);
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains(secret.as_str()));
    }
}
