//! Email Confirmation Use Case
//!
//! Owns the confirmation token lifecycle: issuance (rate limited, one
//! live token per account) and consumption (one-time, expiring).

use std::sync::Arc;

use chrono::Utc;
use platform::mailer::{EmailJob, Notifier};

use crate::application::config::IdentityConfig;
use crate::domain::entity::confirmation_token::ConfirmationToken;
use crate::domain::repository::{ConfirmOutcome, ConfirmationTokenRepository, IssueOutcome};
use crate::domain::value_object::{account_id::AccountId, email::Email};
use crate::error::{IdentityError, IdentityResult};

const CONFIRMATION_SUBJECT: &str = "Confirm Your Email Address";

/// Confirmation use case
pub struct ConfirmationUseCase<T>
where
    T: ConfirmationTokenRepository,
{
    token_repo: Arc<T>,
    notifier: Arc<dyn Notifier>,
    config: Arc<IdentityConfig>,
}

impl<T> ConfirmationUseCase<T>
where
    T: ConfirmationTokenRepository,
{
    pub fn new(token_repo: Arc<T>, notifier: Arc<dyn Notifier>, config: Arc<IdentityConfig>) -> Self {
        Self {
            token_repo,
            notifier,
            config,
        }
    }

    /// Issue a fresh token for the account and enqueue the confirmation
    /// email
    ///
    /// Fails with `RateLimited` when a live token was issued within the
    /// cooldown window. The mail enqueue is fire-and-forget: it cannot
    /// fail this operation.
    pub async fn issue_and_send(
        &self,
        account_id: &AccountId,
        email: &Email,
    ) -> IdentityResult<()> {
        let token = ConfirmationToken::issue(*account_id, self.config.token_validity);

        match self
            .token_repo
            .issue(&token, self.config.resend_cooldown)
            .await?
        {
            IssueOutcome::CoolingDown { retry_after } => {
                return Err(IdentityError::RateLimited { retry_after });
            }
            IssueOutcome::Installed => {}
        }

        let link = self.config.confirm_link(token.secret.as_str());
        self.notifier.enqueue(EmailJob {
            to: email.as_str().to_string(),
            subject: CONFIRMATION_SUBJECT.to_string(),
            html_body: confirmation_email_body(&link),
        });

        // The token itself is a bearer secret and must not be logged
        tracing::info!(account_id = %account_id, "Issued confirmation token");

        Ok(())
    }

    /// Consume a confirmation token, flipping the account's flag
    ///
    /// Idempotent-safe under retry: a second call with the same token
    /// yields `TokenAlreadyUsed`, including after `TokenExpired`.
    pub async fn confirm(&self, secret: &str) -> IdentityResult<AccountId> {
        match self.token_repo.confirm(secret, Utc::now()).await? {
            ConfirmOutcome::Confirmed(account_id) => {
                tracing::info!(account_id = %account_id, "Email confirmed");
                Ok(account_id)
            }
            ConfirmOutcome::Unknown => Err(IdentityError::TokenUnknown),
            ConfirmOutcome::AlreadyUsed => Err(IdentityError::TokenAlreadyUsed),
            ConfirmOutcome::Expired => Err(IdentityError::TokenExpired),
        }
    }
}

fn confirmation_email_body(link: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
  <body>
    <h2>Confirm Your Email</h2>
    <p>Click the link below to confirm your email:</p>
    <a href="{link}">Confirm Email</a>
    <p>This link will expire in 24 hours.</p>
  </body>
</html>
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_body_embeds_link() {
        let body = confirmation_email_body("http://localhost/confirm?token=abc");
        assert!(body.contains(r#"href="http://localhost/confirm?token=abc""#));
        assert!(body.contains("24 hours"));
    }
}
