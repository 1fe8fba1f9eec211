//! Entity Module

pub mod account;
pub mod confirmation_token;
pub mod login_method;
