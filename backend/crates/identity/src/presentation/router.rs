//! Identity Router

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use platform::email_domain::{DnsDomainChecker, DomainChecker};
use platform::mailer::Notifier;

use crate::application::config::IdentityConfig;
use crate::domain::repository::{
    AccountRepository, ConfirmationTokenRepository, LoginMethodRepository,
};
use crate::infra::google::GoogleOAuthClient;
use crate::infra::postgres::PgIdentityRepository;
use crate::presentation::handlers::{self, IdentityAppState};

/// Create the identity router with the PostgreSQL repository and DNS checker
pub fn identity_router(
    repo: PgIdentityRepository,
    domains: DnsDomainChecker,
    notifier: Arc<dyn Notifier>,
    google: GoogleOAuthClient,
    config: IdentityConfig,
) -> Router {
    identity_router_generic(repo, domains, notifier, google, config)
}

/// Create a generic identity router for any repository/checker implementation
pub fn identity_router_generic<R, D>(
    repo: R,
    domains: D,
    notifier: Arc<dyn Notifier>,
    google: GoogleOAuthClient,
    config: IdentityConfig,
) -> Router
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
    let state = IdentityAppState {
        repo: Arc::new(repo),
        domains: Arc::new(domains),
        notifier,
        google: Arc::new(google),
        config: Arc::new(config),
    };

    Router::new()
        .route("/signup", post(handlers::sign_up::<R, D>))
        .route("/signin", post(handlers::sign_in::<R, D>))
        .route("/confirm-email", get(handlers::confirm_email::<R, D>))
        .route(
            "/resend-confirmation",
            post(handlers::resend_confirmation::<R, D>),
        )
        .route("/google", get(handlers::google_login::<R, D>))
        .route("/google/callback", get(handlers::google_callback::<R, D>))
        .with_state(state)
}
