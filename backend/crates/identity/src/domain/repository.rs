//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in the
//! infrastructure layer; tests substitute in-memory doubles.
//!
//! The store is the only synchronization point in the system, so the
//! two correctness-critical operations (token issuance and token
//! consumption) are single repository calls: each implementation must
//! run them in one transaction with row-level locking.

use chrono::{DateTime, Utc};
use std::time::Duration;

use crate::domain::entity::{
    account::Account, confirmation_token::ConfirmationToken, login_method::LoginMethod,
};
use crate::domain::value_object::{
    account_id::AccountId, email::Email, provider::Provider, user_name::UserName,
};
use crate::error::IdentityResult;

/// Result of an issuance attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueOutcome {
    /// The new token is installed; any prior live token is now superseded
    Installed,
    /// A live token was issued too recently; nothing was written
    CoolingDown { retry_after: Duration },
}

/// Result of a confirmation-link visit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmOutcome {
    /// Confirmation flag set and token consumed, atomically
    Confirmed(AccountId),
    /// No token row with this value
    Unknown,
    /// Token was already stale
    AlreadyUsed,
    /// Token was past expiry; it has been marked stale as a side effect
    Expired,
}

/// Account repository trait
#[trait_variant::make(AccountRepository: Send)]
pub trait LocalAccountRepository {
    /// Create an account together with its initiating login method, in
    /// one transaction. Unique violations surface as `AccountExists`
    /// (email or provider identity) or `UserNameTaken` (username).
    async fn create_with_login(
        &self,
        account: &Account,
        login: &LoginMethod,
    ) -> IdentityResult<()>;

    /// Find account by ID
    async fn find_by_id(&self, account_id: &AccountId) -> IdentityResult<Option<Account>>;

    /// Find account by email (case-insensitive; emails are stored lowercase)
    async fn find_by_email(&self, email: &Email) -> IdentityResult<Option<Account>>;

    /// Check whether an account with this email or username exists
    async fn exists_by_email_or_user_name(
        &self,
        email: &Email,
        user_name: &UserName,
    ) -> IdentityResult<bool>;
}

/// Login method repository trait
#[trait_variant::make(LoginMethodRepository: Send)]
pub trait LocalLoginMethodRepository {
    /// Find the account linked to a (provider, identifier) pair
    async fn find_account_by_provider(
        &self,
        provider: Provider,
        identifier: &str,
    ) -> IdentityResult<Option<AccountId>>;

    /// Link a login method to an existing account; idempotent when the
    /// (account, provider) pair already exists
    async fn link(&self, login: &LoginMethod) -> IdentityResult<()>;
}

/// Confirmation token repository trait
#[trait_variant::make(ConfirmationTokenRepository: Send)]
pub trait LocalConfirmationTokenRepository {
    /// Install `token` as the account's live token unless a live token
    /// was issued within `cooldown`. One transaction: the prior live row
    /// (if any) is marked stale and the new row inserted, or nothing is
    /// written and the remaining wait is returned.
    async fn issue(
        &self,
        token: &ConfirmationToken,
        cooldown: Duration,
    ) -> IdentityResult<IssueOutcome>;

    /// Consume the token with this secret as of `now`. One transaction:
    /// on success the owning account's confirmation flag and the token's
    /// staleness are written together; on expiry only the staleness is.
    async fn confirm(&self, secret: &str, now: DateTime<Utc>) -> IdentityResult<ConfirmOutcome>;
}
