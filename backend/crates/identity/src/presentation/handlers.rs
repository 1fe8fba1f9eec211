//! HTTP Handlers
//!
//! Thin glue between the HTTP surface and the use cases. Account ids
//! are threaded as typed values end to end; there is no string-keyed
//! request context.

use axum::Json;
use axum::extract::{Query, State};
use axum::response::Redirect;
use chrono::Utc;
use std::sync::Arc;

use platform::email_domain::DomainChecker;
use platform::mailer::Notifier;

use crate::application::config::IdentityConfig;
use crate::application::{
    ConfirmationUseCase, ResolveIdentityUseCase, SignInInput, SignInUseCase, SignUpInput,
    SignUpUseCase,
};
use crate::domain::repository::{
    AccountRepository, ConfirmationTokenRepository, LoginMethodRepository,
};
use crate::domain::value_object::email::Email;
use crate::error::{IdentityError, IdentityResult};
use crate::infra::google::GoogleOAuthClient;
use crate::presentation::dto::{
    ConfirmEmailQuery, GoogleCallbackQuery, GoogleCallbackResponse, MessageResponse,
    ResendConfirmationRequest, SignInRequest, SignInResponse, SignUpRequest, SignUpResponse,
};
use crate::presentation::oauth_state;

const UNCONFIRMED_WARNING: &str = "Your email is not yet confirmed. Please check your inbox.";

/// Shared state for identity handlers
#[derive(Clone)]
pub struct IdentityAppState<R, D>
where
    R: AccountRepository
        + LoginMethodRepository
        + ConfirmationTokenRepository
        + Clone
        + Send
        + Sync
        + 'static,
    D: DomainChecker + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub domains: Arc<D>,
    pub notifier: Arc<dyn Notifier>,
    pub google: Arc<GoogleOAuthClient>,
    pub config: Arc<IdentityConfig>,
}

// ============================================================================
// Sign Up
// ============================================================================

/// POST /api/identity/signup
pub async fn sign_up<R, D>(
    State(state): State<IdentityAppState<R, D>>,
    Json(req): Json<SignUpRequest>,
) -> IdentityResult<Json<SignUpResponse>>
where
    R: AccountRepository
        + LoginMethodRepository
        + ConfirmationTokenRepository
        + Clone
        + Send
        + Sync
        + 'static,
    D: DomainChecker + Clone + Send + Sync + 'static,
{
    let use_case = SignUpUseCase::new(
        state.repo.clone(),
        state.domains.clone(),
        state.notifier.clone(),
        state.config.clone(),
    );

    let output = use_case
        .execute(SignUpInput {
            user_name: req.user_name,
            email: req.email,
            password: req.password,
        })
        .await?;

    Ok(Json(SignUpResponse {
        account_id: output.account_id.to_string(),
        message: "Successfully created account, please check your email to confirm".to_string(),
    }))
}

// ============================================================================
// Sign In
// ============================================================================

/// POST /api/identity/signin
pub async fn sign_in<R, D>(
    State(state): State<IdentityAppState<R, D>>,
    Json(req): Json<SignInRequest>,
) -> IdentityResult<Json<SignInResponse>>
where
    R: AccountRepository
        + LoginMethodRepository
        + ConfirmationTokenRepository
        + Clone
        + Send
        + Sync
        + 'static,
    D: DomainChecker + Clone + Send + Sync + 'static,
{
    let use_case = SignInUseCase::new(state.repo.clone(), state.config.clone());

    let output = use_case
        .execute(SignInInput {
            email: req.email,
            password: req.password,
        })
        .await?;

    // Unconfirmed email is a non-blocking warning, never a failure
    let warning = (!output.email_confirmed).then(|| UNCONFIRMED_WARNING.to_string());

    Ok(Json(SignInResponse {
        account_id: output.account_id.to_string(),
        warning,
    }))
}

// ============================================================================
// Email Confirmation
// ============================================================================

/// GET /api/identity/confirm-email?token=...
pub async fn confirm_email<R, D>(
    State(state): State<IdentityAppState<R, D>>,
    Query(query): Query<ConfirmEmailQuery>,
) -> IdentityResult<Json<MessageResponse>>
where
    R: AccountRepository
        + LoginMethodRepository
        + ConfirmationTokenRepository
        + Clone
        + Send
        + Sync
        + 'static,
    D: DomainChecker + Clone + Send + Sync + 'static,
{
    let use_case = ConfirmationUseCase::new(
        state.repo.clone(),
        state.notifier.clone(),
        state.config.clone(),
    );

    use_case.confirm(&query.token).await?;

    Ok(Json(MessageResponse {
        message: "Email confirmed successfully".to_string(),
    }))
}

/// POST /api/identity/resend-confirmation
pub async fn resend_confirmation<R, D>(
    State(state): State<IdentityAppState<R, D>>,
    Json(req): Json<ResendConfirmationRequest>,
) -> IdentityResult<Json<MessageResponse>>
where
    R: AccountRepository
        + LoginMethodRepository
        + ConfirmationTokenRepository
        + Clone
        + Send
        + Sync
        + 'static,
    D: DomainChecker + Clone + Send + Sync + 'static,
{
    let email = Email::new(req.email)?;
    let account = state
        .repo
        .find_by_email(&email)
        .await?
        .ok_or(IdentityError::AccountNotFound)?;

    let use_case = ConfirmationUseCase::new(
        state.repo.clone(),
        state.notifier.clone(),
        state.config.clone(),
    );
    use_case
        .issue_and_send(&account.account_id, &account.email)
        .await?;

    Ok(Json(MessageResponse {
        message: "Confirmation email resent. Check your inbox.".to_string(),
    }))
}

// ============================================================================
// Google OAuth
// ============================================================================

/// GET /api/identity/google
pub async fn google_login<R, D>(
    State(state): State<IdentityAppState<R, D>>,
) -> IdentityResult<Redirect>
where
    R: AccountRepository
        + LoginMethodRepository
        + ConfirmationTokenRepository
        + Clone
        + Send
        + Sync
        + 'static,
    D: DomainChecker + Clone + Send + Sync + 'static,
{
    let oauth_state = oauth_state::issue(&state.config.state_secret, Utc::now());
    Ok(Redirect::temporary(
        &state.google.authorize_url(&oauth_state),
    ))
}

/// GET /api/identity/google/callback?state=...&code=...
pub async fn google_callback<R, D>(
    State(state): State<IdentityAppState<R, D>>,
    Query(query): Query<GoogleCallbackQuery>,
) -> IdentityResult<Json<GoogleCallbackResponse>>
where
    R: AccountRepository
        + LoginMethodRepository
        + ConfirmationTokenRepository
        + Clone
        + Send
        + Sync
        + 'static,
    D: DomainChecker + Clone + Send + Sync + 'static,
{
    let received_state = query
        .state
        .ok_or_else(|| IdentityError::Validation("Missing oauth state".to_string()))?;
    if !oauth_state::verify(
        &state.config.state_secret,
        &received_state,
        Utc::now(),
        oauth_state::STATE_MAX_AGE,
    ) {
        return Err(IdentityError::Validation("Invalid oauth state".to_string()));
    }

    let code = query
        .code
        .ok_or_else(|| IdentityError::Validation("Missing code in callback".to_string()))?;

    let access_token = state.google.exchange_code(&code).await?;
    let profile = state.google.fetch_profile(&access_token).await?;

    let use_case = ResolveIdentityUseCase::new(state.repo.clone(), state.config.clone());
    let account_id = use_case.execute(profile).await?;

    Ok(Json(GoogleCallbackResponse {
        account_id: account_id.to_string(),
    }))
}
