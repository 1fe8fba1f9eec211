//! Login Provider Value Object
//!
//! Tags a login method with the authentication provider it came from.
//! An account may link at most one identity per provider.

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Authentication provider for a login method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Local email/password signup
    #[display("local")]
    Local,
    /// Google OAuth
    #[display("google")]
    Google,
}

impl Provider {
    /// String tag for database storage
    pub const fn as_str(&self) -> &'static str {
        match self {
            Provider::Local => "local",
            Provider::Google => "google",
        }
    }

    /// Parse the database tag
    pub fn from_str_tag(s: &str) -> Option<Self> {
        match s {
            "local" => Some(Provider::Local),
            "google" => Some(Provider::Google),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        for provider in [Provider::Local, Provider::Google] {
            assert_eq!(Provider::from_str_tag(provider.as_str()), Some(provider));
        }
    }

    #[test]
    fn test_unknown_tag() {
        assert_eq!(Provider::from_str_tag("github"), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Provider::Google.to_string(), "google");
    }
}
