//! Identity Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Business logic, entities, repository traits
//! - `application/` - Use cases and application services
//! - `infra/` - Database implementation, Google OAuth client
//! - `presentation/` - HTTP handlers, DTOs, router
//!
//! ## Features
//! - Local signup/signin with email + password
//! - Email confirmation tokens (one-time, 24h expiry, 5-minute resend cooldown)
//! - Google OAuth linking with account deduplication
//! - Mail-domain reputation gate at signup (MX / SPF / DMARC)
//!
//! ## Security Model
//! - Passwords hashed with Argon2id (NIST SP 800-63B compliant)
//! - Confirmation tokens are 256-bit bearer secrets, never logged
//! - Signin failure never reveals whether the account exists
//! - OAuth callback protected by an HMAC-signed state parameter

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;


// Re-exports for convenience
pub use application::config::IdentityConfig;
pub use error::{IdentityError, IdentityResult};
pub use infra::google::GoogleOAuthClient;
pub use infra::postgres::PgIdentityRepository;
pub use presentation::router::identity_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

// Convenience re-exports
pub mod config {
    pub use crate::application::config::*;
}

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}

pub mod handlers {
    pub use crate::presentation::handlers::*;
}

pub mod store {
    pub use crate::infra::postgres::PgIdentityRepository as IdentityStore;
}

pub mod router {
    pub use crate::presentation::router::*;
}
