//! Infrastructure Layer
//!
//! Database implementation and external service integrations.

pub mod google;
pub mod postgres;

pub use google::GoogleOAuthClient;
pub use postgres::PgIdentityRepository;
