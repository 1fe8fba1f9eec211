//! Account Entity
//!
//! One logical person, one durable account, possibly reachable through
//! several login methods.

use chrono::{DateTime, Utc};

use crate::domain::value_object::{
    account_id::AccountId, email::Email, password::PasswordCredential, user_name::UserName,
};

/// Account entity
///
/// `password` is `None` for OAuth-only accounts; such accounts cannot
/// sign in locally.
#[derive(Debug, Clone)]
pub struct Account {
    /// Internal UUID identifier
    pub account_id: AccountId,
    /// Lowercase-unique email
    pub email: Email,
    /// Unique user name (lowercase canonical)
    pub user_name: UserName,
    /// Local password credential, absent for OAuth-only accounts
    pub password: Option<PasswordCredential>,
    /// Whether control of the email address has been proven
    pub email_confirmed: bool,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Create a new local-signup account (unconfirmed)
    pub fn new_local(user_name: UserName, email: Email, password: PasswordCredential) -> Self {
        let now = Utc::now();
        Self {
            account_id: AccountId::new(),
            email,
            user_name,
            password: Some(password),
            email_confirmed: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a new account from an OAuth-verified identity
    ///
    /// The provider already verified the email, so the account starts
    /// confirmed and no confirmation email is sent.
    pub fn new_oauth(user_name: UserName, email: Email) -> Self {
        let now = Utc::now();
        Self {
            account_id: AccountId::new(),
            email,
            user_name,
            password: None,
            email_confirmed: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Flip the confirmation flag after a successful token consumption
    pub fn confirm_email(&mut self) {
        self.email_confirmed = true;
        self.updated_at = Utc::now();
    }

    /// Whether this account can sign in with a password
    pub fn has_password(&self) -> bool {
        self.password.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::password::RawPassword;

    fn password() -> PasswordCredential {
        let raw = RawPassword::new("secret123pass".to_string()).unwrap();
        PasswordCredential::from_raw(&raw, None).unwrap()
    }

    #[test]
    fn test_local_account_starts_unconfirmed() {
        let account = Account::new_local(
            UserName::new("alice").unwrap(),
            Email::new("alice@example.com").unwrap(),
            password(),
        );
        assert!(!account.email_confirmed);
        assert!(account.has_password());
    }

    #[test]
    fn test_oauth_account_starts_confirmed_without_password() {
        let account = Account::new_oauth(
            UserName::new("jane1234").unwrap(),
            Email::new("jane@example.com").unwrap(),
        );
        assert!(account.email_confirmed);
        assert!(!account.has_password());
    }

    #[test]
    fn test_confirm_email() {
        let mut account = Account::new_local(
            UserName::new("alice").unwrap(),
            Email::new("alice@example.com").unwrap(),
            password(),
        );
        account.confirm_email();
        assert!(account.email_confirmed);
    }
}
