//! Domain Layer
//!
//! Contains entities, value objects, and repository traits.

pub mod entity;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::{
    account::Account, confirmation_token::ConfirmationToken, login_method::LoginMethod,
};
pub use repository::{
    AccountRepository, ConfirmOutcome, ConfirmationTokenRepository, IssueOutcome,
    LoginMethodRepository,
};
