//! Presentation Layer
//!
//! HTTP handlers, DTOs, router, and the signed OAuth state helper.

pub mod dto;
pub mod handlers;
pub mod oauth_state;
pub mod router;

pub use handlers::IdentityAppState;
pub use router::{identity_router, identity_router_generic};
