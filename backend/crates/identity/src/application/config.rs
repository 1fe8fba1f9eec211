//! Application Configuration
//!
//! Configuration for the identity application layer. OAuth provider
//! settings are an explicit value passed into constructors; there is no
//! process-wide state.

use std::time::Duration;

/// Google OAuth provider configuration
#[derive(Debug, Clone, Default)]
pub struct GoogleOAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_url: String,
}

/// Identity application configuration
#[derive(Debug, Clone)]
pub struct IdentityConfig {
    /// Minimum wait between confirmation emails for one account (5 minutes)
    pub resend_cooldown: Duration,
    /// Confirmation token validity window (24 hours)
    pub token_validity: Duration,
    /// Base URL the confirmation token is appended to as `?token=...`
    pub confirm_link_base: String,
    /// Password pepper (optional, application-wide secret)
    pub password_pepper: Option<Vec<u8>>,
    /// Secret for signing the OAuth state parameter (32 bytes)
    pub state_secret: [u8; 32],
    /// How often a generated OAuth username is re-suffixed on collision
    pub username_suffix_attempts: u32,
    /// Google OAuth provider settings
    pub google: GoogleOAuthConfig,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            resend_cooldown: Duration::from_secs(5 * 60),
            token_validity: Duration::from_secs(24 * 3600),
            confirm_link_base: "http://localhost:8080/api/identity/confirm-email".to_string(),
            password_pepper: None,
            state_secret: [0u8; 32],
            username_suffix_attempts: 3,
            google: GoogleOAuthConfig::default(),
        }
    }
}

impl IdentityConfig {
    /// Create config with a random state secret (for development)
    pub fn with_random_secret() -> Self {
        use rand::RngCore;
        let mut secret = [0u8; 32];
        rand::rng().fill_bytes(&mut secret);
        Self {
            state_secret: secret,
            ..Default::default()
        }
    }

    /// Get password pepper as slice
    pub fn pepper(&self) -> Option<&[u8]> {
        self.password_pepper.as_deref()
    }

    /// Build the confirmation link for a token
    pub fn confirm_link(&self, token: &str) -> String {
        format!("{}?token={}", self.confirm_link_base, token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = IdentityConfig::default();
        assert_eq!(config.resend_cooldown, Duration::from_secs(300));
        assert_eq!(config.token_validity, Duration::from_secs(86400));
        assert_eq!(config.username_suffix_attempts, 3);
    }

    #[test]
    fn test_confirm_link() {
        let config = IdentityConfig::default();
        let link = config.confirm_link("abc123");
        assert!(link.ends_with("?token=abc123"));
    }

    #[test]
    fn test_random_secret_differs() {
        let a = IdentityConfig::with_random_secret();
        let b = IdentityConfig::with_random_secret();
        assert_ne!(a.state_secret, b.state_secret);
    }
}
