//! Confirmation Token Entity
//!
//! One-time, time-limited proof of control over an email address.
//!
//! Lifecycle: `Active` → `Consumed` (successful confirmation) or
//! `ExpiredTouched` (visited past expiry) or `Superseded` (replaced by a
//! new issuance). All three end states set `is_stale`, which is terminal
//! for the row; only a new issuance creates a fresh `Active` token.

use chrono::{DateTime, Utc};
use std::time::Duration;

use crate::domain::value_object::{account_id::AccountId, token_secret::TokenSecret};

/// What a confirmation-link visit finds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenStatus {
    /// Non-stale and within its validity window
    Usable,
    /// Consumed, expired-and-touched, or superseded
    Stale,
    /// Non-stale but past expiry (must transition to stale on touch)
    Expired,
}

/// Confirmation token entity
#[derive(Debug, Clone)]
pub struct ConfirmationToken {
    pub account_id: AccountId,
    pub secret: TokenSecret,
    pub created_at: DateTime<Utc>,
    /// Issuance time used for the resend cooldown
    pub last_sent_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub is_stale: bool,
}

impl ConfirmationToken {
    /// Issue a fresh token for an account
    pub fn issue(account_id: AccountId, validity: Duration) -> Self {
        let now = Utc::now();
        Self {
            account_id,
            secret: TokenSecret::generate(),
            created_at: now,
            last_sent_at: now,
            expires_at: now + chrono::Duration::from_std(validity).unwrap_or_default(),
            is_stale: false,
        }
    }

    /// Assess the token as of `now`
    pub fn status(&self, now: DateTime<Utc>) -> TokenStatus {
        if self.is_stale {
            TokenStatus::Stale
        } else if now > self.expires_at {
            TokenStatus::Expired
        } else {
            TokenStatus::Usable
        }
    }

    /// Remaining cooldown before a resend is allowed, as of `now`
    ///
    /// `None` means a resend may proceed: the token is stale, or the
    /// cooldown has elapsed.
    pub fn cooldown_remaining(&self, now: DateTime<Utc>, cooldown: Duration) -> Option<Duration> {
        if self.is_stale {
            return None;
        }
        let window = chrono::Duration::from_std(cooldown).unwrap_or_default();
        let next_allowed = self.last_sent_at + window;
        if now >= next_allowed {
            None
        } else {
            (next_allowed - now).to_std().ok()
        }
    }

    /// Terminal transition out of `Active`
    pub fn mark_stale(&mut self) {
        self.is_stale = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALIDITY: Duration = Duration::from_secs(24 * 3600);
    const COOLDOWN: Duration = Duration::from_secs(5 * 60);

    #[test]
    fn test_fresh_token_is_usable() {
        let token = ConfirmationToken::issue(AccountId::new(), VALIDITY);
        assert_eq!(token.status(Utc::now()), TokenStatus::Usable);
    }

    #[test]
    fn test_token_expires() {
        let token = ConfirmationToken::issue(AccountId::new(), VALIDITY);
        let later = token.expires_at + chrono::Duration::seconds(1);
        assert_eq!(token.status(later), TokenStatus::Expired);
    }

    #[test]
    fn test_stale_wins_over_expired() {
        let mut token = ConfirmationToken::issue(AccountId::new(), VALIDITY);
        token.mark_stale();
        let later = token.expires_at + chrono::Duration::seconds(1);
        assert_eq!(token.status(later), TokenStatus::Stale);
        assert_eq!(token.status(Utc::now()), TokenStatus::Stale);
    }

    #[test]
    fn test_cooldown_active_right_after_issue() {
        let token = ConfirmationToken::issue(AccountId::new(), VALIDITY);
        let remaining = token.cooldown_remaining(Utc::now(), COOLDOWN);
        assert!(remaining.is_some());
        assert!(remaining.unwrap() <= COOLDOWN);
    }

    #[test]
    fn test_cooldown_elapses() {
        let token = ConfirmationToken::issue(AccountId::new(), VALIDITY);
        let later = token.last_sent_at + chrono::Duration::minutes(6);
        assert_eq!(token.cooldown_remaining(later, COOLDOWN), None);
    }

    #[test]
    fn test_stale_token_never_rate_limits() {
        let mut token = ConfirmationToken::issue(AccountId::new(), VALIDITY);
        token.mark_stale();
        assert_eq!(token.cooldown_remaining(Utc::now(), COOLDOWN), None);
    }
}
