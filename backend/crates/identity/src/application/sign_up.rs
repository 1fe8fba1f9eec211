//! Sign Up Use Case
//!
//! Creates a new local account and kicks off email confirmation.

use std::sync::Arc;

use platform::email_domain::DomainChecker;
use platform::mailer::Notifier;

use crate::application::config::IdentityConfig;
use crate::application::confirmation::ConfirmationUseCase;
use crate::domain::entity::{account::Account, login_method::LoginMethod};
use crate::domain::repository::{AccountRepository, ConfirmationTokenRepository};
use crate::domain::value_object::{
    account_id::AccountId, email::Email, password::{PasswordCredential, RawPassword},
    user_name::UserName,
};
use crate::error::{IdentityError, IdentityResult};

/// Sign up input
pub struct SignUpInput {
    pub user_name: String,
    pub email: String,
    pub password: String,
}

/// Sign up output
pub struct SignUpOutput {
    pub account_id: AccountId,
}

/// Sign up use case
pub struct SignUpUseCase<R, D>
where
    R: AccountRepository + ConfirmationTokenRepository,
    D: DomainChecker,
{
    repo: Arc<R>,
    domains: Arc<D>,
    notifier: Arc<dyn Notifier>,
    config: Arc<IdentityConfig>,
}

impl<R, D> SignUpUseCase<R, D>
where
    R: AccountRepository + ConfirmationTokenRepository,
    D: DomainChecker,
{
    pub fn new(
        repo: Arc<R>,
        domains: Arc<D>,
        notifier: Arc<dyn Notifier>,
        config: Arc<IdentityConfig>,
    ) -> Self {
        Self {
            repo,
            domains,
            notifier,
            config,
        }
    }

    pub async fn execute(&self, input: SignUpInput) -> IdentityResult<SignUpOutput> {
        // Validate inputs as value objects before any I/O
        let email = Email::new(input.email)?;
        let user_name = UserName::new(&input.user_name)
            .map_err(|e| IdentityError::Validation(e.to_string()))?;

        // Duplicate check (case-insensitive email OR username)
        if self
            .repo
            .exists_by_email_or_user_name(&email, &user_name)
            .await?
        {
            return Err(IdentityError::AccountExists);
        }

        // Domain gate: reject addresses whose domain cannot receive mail
        let reputation = self.domains.check(email.domain()).await;
        if !reputation.is_deliverable() {
            return Err(IdentityError::DomainUnverifiable { reputation });
        }

        // Validate and hash the password
        let raw_password = RawPassword::new(input.password)?;
        let credential = PasswordCredential::from_raw(&raw_password, self.config.pepper())?;

        // Persist account + local login method in one transaction
        let account = Account::new_local(user_name, email, credential);
        let login = LoginMethod::local(account.account_id, &account.email);
        self.repo
            .create_with_login(&account, &login)
            .await
            .map_err(|e| match e {
                // A signup losing either uniqueness race reads the same
                IdentityError::UserNameTaken => IdentityError::AccountExists,
                other => other,
            })?;

        // Issue and send the confirmation token. The account rows stay
        // on failure, so the caller can retry via resend-confirmation.
        let confirmation = ConfirmationUseCase::new(
            self.repo.clone(),
            self.notifier.clone(),
            self.config.clone(),
        );
        confirmation
            .issue_and_send(&account.account_id, &account.email)
            .await
            .map_err(|e| IdentityError::ConfirmationIssueFailed(Box::new(e)))?;

        tracing::info!(
            account_id = %account.account_id,
            user_name = %account.user_name,
            "Account signed up"
        );

        Ok(SignUpOutput {
            account_id: account.account_id,
        })
    }
}
