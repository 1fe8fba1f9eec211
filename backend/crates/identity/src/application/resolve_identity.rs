//! Identity Resolution Use Case
//!
//! Maps an OAuth-verified external identity to exactly one local
//! account, creating one if none exists. Linking is keyed by the
//! verified email (see DESIGN.md for the tradeoff against the provider
//! subject id).

use std::sync::Arc;

use serde::Deserialize;

use crate::application::config::IdentityConfig;
use crate::domain::entity::{account::Account, login_method::LoginMethod};
use crate::domain::repository::{AccountRepository, LoginMethodRepository};
use crate::domain::value_object::{
    account_id::AccountId, email::Email, provider::Provider, user_name::UserName,
};
use crate::error::{IdentityError, IdentityResult};

/// Verified profile returned by Google's userinfo endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleProfile {
    /// Stable provider subject id (fetched but not used as the link
    /// key; see DESIGN.md)
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: String,
}

/// Identity resolution use case
pub struct ResolveIdentityUseCase<R>
where
    R: AccountRepository + LoginMethodRepository,
{
    repo: Arc<R>,
    config: Arc<IdentityConfig>,
}

impl<R> ResolveIdentityUseCase<R>
where
    R: AccountRepository + LoginMethodRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<IdentityConfig>) -> Self {
        Self { repo, config }
    }

    pub async fn execute(&self, profile: GoogleProfile) -> IdentityResult<AccountId> {
        let email =
            Email::new(&profile.email).map_err(|_| IdentityError::IdentityResolutionFailed)?;

        // 1. Exact match: this google identity already links to an account
        if let Some(account_id) = self
            .repo
            .find_account_by_provider(Provider::Google, email.as_str())
            .await
            .map_err(persistence_failure)?
        {
            return Ok(account_id);
        }

        // 2. Fallback: an account with this email exists but has no
        //    google link yet (e.g. a prior local signup). Link it.
        if let Some(account) = self
            .repo
            .find_by_email(&email)
            .await
            .map_err(persistence_failure)?
        {
            self.repo
                .link(&LoginMethod::google(account.account_id, &email))
                .await
                .map_err(persistence_failure)?;
            tracing::info!(
                account_id = %account.account_id,
                "Linked google identity to existing account"
            );
            return Ok(account.account_id);
        }

        // 3. No match: create a confirmed account with a generated
        //    username. Username collisions retry with a fresh suffix;
        //    an email collision means a concurrent request won, so use
        //    its row.
        for _ in 0..self.config.username_suffix_attempts {
            let user_name = UserName::suggest(&profile.name, email.local_part());
            let account = Account::new_oauth(user_name, email.clone());
            let login = LoginMethod::google(account.account_id, &email);

            match self.repo.create_with_login(&account, &login).await {
                Ok(()) => {
                    tracing::info!(
                        account_id = %account.account_id,
                        user_name = %account.user_name,
                        "Created account from google identity"
                    );
                    return Ok(account.account_id);
                }
                Err(IdentityError::UserNameTaken) => continue,
                Err(IdentityError::AccountExists) => {
                    let existing = self
                        .repo
                        .find_by_email(&email)
                        .await
                        .map_err(persistence_failure)?
                        .ok_or(IdentityError::IdentityResolutionFailed)?;
                    self.repo
                        .link(&LoginMethod::google(existing.account_id, &email))
                        .await
                        .map_err(persistence_failure)?;
                    return Ok(existing.account_id);
                }
                Err(other) => return Err(persistence_failure(other)),
            }
        }

        tracing::error!("Exhausted username suffix attempts during identity resolution");
        Err(IdentityError::IdentityResolutionFailed)
    }
}

/// Persistence errors surface as a generic resolution failure; the
/// caller must not see store internals.
fn persistence_failure(err: IdentityError) -> IdentityError {
    match err {
        IdentityError::Database(e) => {
            tracing::error!(error = %e, "Persistence failure during identity resolution");
            IdentityError::IdentityResolutionFailed
        }
        IdentityError::Internal(msg) => {
            tracing::error!(message = %msg, "Failure during identity resolution");
            IdentityError::IdentityResolutionFailed
        }
        other => other,
    }
}
