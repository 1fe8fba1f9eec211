//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic utilities (random bytes, Base64, constant-time compare)
//! - Password hashing (Argon2id, NIST SP 800-63B compliant)
//! - Mail domain reputation checks (MX / SPF / DMARC over DNS)
//! - Outbound mail queue (bounded, single consumer, best-effort)

pub mod crypto;
pub mod email_domain;
pub mod mailer;
pub mod password;
