//! Identity Error Types
//!
//! This module provides identity-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::email_domain::DomainReputation;
use std::time::Duration;
use thiserror::Error;

/// Identity-specific result type alias
pub type IdentityResult<T> = Result<T, IdentityError>;

/// Identity-specific error variants
#[derive(Debug, Error)]
pub enum IdentityError {
    /// Duplicate email or username at signup
    #[error("An account with this email or username already exists")]
    AccountExists,

    /// Generated or requested username is taken (retryable during OAuth resolution)
    #[error("Username is already taken")]
    UserNameTaken,

    /// Account lookup by explicit identifier failed (e.g. confirmation resend)
    #[error("Account not found")]
    AccountNotFound,

    /// Signup email domain lacks required DNS records
    #[error("Email domain {} cannot receive mail (missing: {})", .reputation.domain, .reputation.missing().join(", "))]
    DomainUnverifiable { reputation: DomainReputation },

    /// Signin failure; account-not-found and wrong-password are indistinguishable
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Confirmation resend attempted inside the cooldown window
    #[error("Please wait {}s before requesting another confirmation email", .retry_after.as_secs())]
    RateLimited { retry_after: Duration },

    /// No confirmation token with this value
    #[error("Invalid or unknown token")]
    TokenUnknown,

    /// Token was consumed, expired-and-touched, or superseded
    #[error("This token is stale or already used")]
    TokenAlreadyUsed,

    /// Token found past its expiry (now marked stale)
    #[error("This token has expired, please request a new confirmation email")]
    TokenExpired,

    /// Account was created but confirmation issuance failed; the account
    /// and login method remain, so the caller can retry the resend
    #[error("Account created, but the confirmation email could not be issued")]
    ConfirmationIssueFailed(#[source] Box<IdentityError>),

    /// Persistence failure during OAuth identity resolution
    #[error("Failed to resolve external identity")]
    IdentityResolutionFailed,

    /// OAuth code exchange or profile fetch failed
    #[error("OAuth exchange failed: {0}")]
    OAuthExchange(String),

    /// Request input failed value-object validation
    #[error("{0}")]
    Validation(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IdentityError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            IdentityError::AccountExists | IdentityError::UserNameTaken => StatusCode::CONFLICT,
            IdentityError::AccountNotFound => StatusCode::NOT_FOUND,
            IdentityError::DomainUnverifiable { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            IdentityError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            IdentityError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            IdentityError::TokenUnknown => StatusCode::NOT_FOUND,
            IdentityError::TokenAlreadyUsed | IdentityError::TokenExpired => StatusCode::GONE,
            IdentityError::Validation(_) => StatusCode::BAD_REQUEST,
            IdentityError::OAuthExchange(_) => StatusCode::SERVICE_UNAVAILABLE,
            IdentityError::ConfirmationIssueFailed(_)
            | IdentityError::IdentityResolutionFailed
            | IdentityError::Database(_)
            | IdentityError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            IdentityError::AccountExists | IdentityError::UserNameTaken => ErrorKind::Conflict,
            IdentityError::AccountNotFound | IdentityError::TokenUnknown => ErrorKind::NotFound,
            IdentityError::DomainUnverifiable { .. } => ErrorKind::UnprocessableEntity,
            IdentityError::InvalidCredentials => ErrorKind::Unauthorized,
            IdentityError::RateLimited { .. } => ErrorKind::TooManyRequests,
            IdentityError::TokenAlreadyUsed | IdentityError::TokenExpired => ErrorKind::Gone,
            IdentityError::Validation(_) => ErrorKind::BadRequest,
            IdentityError::OAuthExchange(_) => ErrorKind::ServiceUnavailable,
            IdentityError::ConfirmationIssueFailed(_)
            | IdentityError::IdentityResolutionFailed
            | IdentityError::Database(_)
            | IdentityError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        match self {
            IdentityError::TokenExpired => AppError::new(self.kind(), self.to_string())
                .with_action("Request a new confirmation email"),
            IdentityError::ConfirmationIssueFailed(_) => {
                AppError::new(self.kind(), self.to_string())
                    .with_action("Use the resend-confirmation endpoint")
            }
            _ => AppError::new(self.kind(), self.to_string()),
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            IdentityError::Database(e) => {
                tracing::error!(error = %e, "Identity database error");
            }
            IdentityError::Internal(msg) => {
                tracing::error!(message = %msg, "Identity internal error");
            }
            IdentityError::ConfirmationIssueFailed(source) => {
                tracing::error!(error = %source, "Confirmation issuance failed after signup");
            }
            IdentityError::IdentityResolutionFailed => {
                tracing::error!("OAuth identity resolution failed");
            }
            IdentityError::OAuthExchange(msg) => {
                tracing::warn!(message = %msg, "OAuth exchange failed");
            }
            IdentityError::InvalidCredentials => {
                tracing::warn!("Invalid signin attempt");
            }
            IdentityError::RateLimited { retry_after } => {
                tracing::warn!(retry_after_secs = retry_after.as_secs(), "Confirmation resend rate limited");
            }
            _ => {
                tracing::debug!(error = %self, "Identity error");
            }
        }
    }
}

impl IntoResponse for IdentityError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<AppError> for IdentityError {
    fn from(err: AppError) -> Self {
        if err.is_client_error() {
            IdentityError::Validation(err.message().to_string())
        } else {
            IdentityError::Internal(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(IdentityError::AccountExists.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            IdentityError::InvalidCredentials.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            IdentityError::RateLimited {
                retry_after: Duration::from_secs(120)
            }
            .status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(IdentityError::TokenUnknown.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(IdentityError::TokenAlreadyUsed.status_code(), StatusCode::GONE);
        assert_eq!(IdentityError::TokenExpired.status_code(), StatusCode::GONE);
    }

    #[test]
    fn test_domain_unverifiable_names_missing_signals() {
        let err = IdentityError::DomainUnverifiable {
            reputation: DomainReputation {
                domain: "nowhere.test".to_string(),
                has_mx: false,
                has_spf: true,
                has_dmarc: false,
            },
        };
        let msg = err.to_string();
        assert!(msg.contains("nowhere.test"));
        assert!(msg.contains("MX"));
        assert!(msg.contains("DMARC"));
        assert!(!msg.contains("SPF"));
    }

    #[test]
    fn test_confirmation_issue_failed_is_distinct_from_account_exists() {
        let err = IdentityError::ConfirmationIssueFailed(Box::new(IdentityError::Internal(
            "token store unavailable".to_string(),
        )));
        assert_ne!(err.kind(), IdentityError::AccountExists.kind());
        assert!(err.to_app_error().action().is_some());
    }
}
