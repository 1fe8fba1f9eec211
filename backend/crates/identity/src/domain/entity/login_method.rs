//! Login Method Entity
//!
//! Links an account to one authentication provider. Insert-only: rows
//! are never mutated or deleted by this core.

use chrono::{DateTime, Utc};

use crate::domain::value_object::{account_id::AccountId, email::Email, provider::Provider};

/// A (account, provider, identifier) link
#[derive(Debug, Clone)]
pub struct LoginMethod {
    pub account_id: AccountId,
    pub provider: Provider,
    /// Provider-side identifier; the email address for both local and
    /// google links (see DESIGN.md for the keying discussion)
    pub identifier: String,
    pub created_at: DateTime<Utc>,
}

impl LoginMethod {
    /// Link for a local email/password signup
    pub fn local(account_id: AccountId, email: &Email) -> Self {
        Self {
            account_id,
            provider: Provider::Local,
            identifier: email.as_str().to_string(),
            created_at: Utc::now(),
        }
    }

    /// Link for a Google OAuth identity
    pub fn google(account_id: AccountId, email: &Email) -> Self {
        Self {
            account_id,
            provider: Provider::Google,
            identifier: email.as_str().to_string(),
            created_at: Utc::now(),
        }
    }
}
