//! Sign In Use Case
//!
//! Verifies local credentials and returns the account id. The
//! confirmation flag is reported, never enforced; the caller uses it
//! for a non-blocking warning.

use std::sync::Arc;

use crate::application::config::IdentityConfig;
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::{
    account_id::AccountId, email::Email, password::RawPassword,
};
use crate::error::{IdentityError, IdentityResult};

/// Sign in input
pub struct SignInInput {
    pub email: String,
    pub password: String,
}

/// Sign in output
pub struct SignInOutput {
    pub account_id: AccountId,
    /// For the caller's "check your inbox" warning
    pub email_confirmed: bool,
}

/// Sign in use case
pub struct SignInUseCase<R>
where
    R: AccountRepository,
{
    repo: Arc<R>,
    config: Arc<IdentityConfig>,
}

impl<R> SignInUseCase<R>
where
    R: AccountRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<IdentityConfig>) -> Self {
        Self { repo, config }
    }

    /// Constant-outcome failure: unknown email, OAuth-only account, and
    /// wrong password all read as `InvalidCredentials`.
    pub async fn execute(&self, input: SignInInput) -> IdentityResult<SignInOutput> {
        let email = Email::new(input.email).map_err(|_| IdentityError::InvalidCredentials)?;

        let account = self
            .repo
            .find_by_email(&email)
            .await?
            .ok_or(IdentityError::InvalidCredentials)?;

        // OAuth-only accounts have no local credential
        let credential = account
            .password
            .as_ref()
            .ok_or(IdentityError::InvalidCredentials)?;

        let raw_password =
            RawPassword::new(input.password).map_err(|_| IdentityError::InvalidCredentials)?;

        // Argon2 compares in constant time
        if !credential.verify(&raw_password, self.config.pepper()) {
            return Err(IdentityError::InvalidCredentials);
        }

        tracing::info!(account_id = %account.account_id, "Account signed in");

        Ok(SignInOutput {
            account_id: account.account_id,
            email_confirmed: account.email_confirmed,
        })
    }
}
