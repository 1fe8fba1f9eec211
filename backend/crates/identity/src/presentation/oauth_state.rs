//! Signed OAuth State Parameter
//!
//! CSRF protection for the OAuth redirect without server-side state:
//! `nonce.timestamp.signature`, where the signature is HMAC-SHA256 over
//! `nonce.timestamp`. The callback verifies the signature and bounds
//! the age.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use platform::crypto;
use sha2::Sha256;
use std::time::Duration;

/// Maximum age of a state value before the callback rejects it
pub const STATE_MAX_AGE: Duration = Duration::from_secs(10 * 60);

/// Issue a signed state value as of `now`
pub fn issue(secret: &[u8; 32], now: DateTime<Utc>) -> String {
    let nonce = URL_SAFE_NO_PAD.encode(crypto::random_bytes(16));
    let payload = format!("{}.{}", nonce, now.timestamp());
    format!("{}.{}", payload, sign(secret, &payload))
}

/// Verify a state value as of `now`
pub fn verify(secret: &[u8; 32], state: &str, now: DateTime<Utc>, max_age: Duration) -> bool {
    let Some((payload, signature)) = state.rsplit_once('.') else {
        return false;
    };

    if !crypto::constant_time_eq(sign(secret, payload).as_bytes(), signature.as_bytes()) {
        return false;
    }

    let Some((_, timestamp)) = payload.rsplit_once('.') else {
        return false;
    };
    let Ok(issued_at) = timestamp.parse::<i64>() else {
        return false;
    };

    let age = now.timestamp() - issued_at;
    age >= 0 && (age as u64) <= max_age.as_secs()
}

fn sign(secret: &[u8; 32], payload: &str) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret).expect("HMAC can take key of any size");
    mac.update(payload.as_bytes());
    URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: [u8; 32] = [7u8; 32];

    #[test]
    fn test_roundtrip() {
        let now = Utc::now();
        let state = issue(&SECRET, now);
        assert!(verify(&SECRET, &state, now, STATE_MAX_AGE));
    }

    #[test]
    fn test_tampered_state_rejected() {
        let now = Utc::now();
        let state = issue(&SECRET, now);
        let tampered = format!("x{}", &state[1..]);
        assert!(!verify(&SECRET, &tampered, now, STATE_MAX_AGE));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let now = Utc::now();
        let state = issue(&SECRET, now);
        assert!(!verify(&[8u8; 32], &state, now, STATE_MAX_AGE));
    }

    #[test]
    fn test_expired_state_rejected() {
        let issued = Utc::now();
        let state = issue(&SECRET, issued);
        let later = issued + chrono::Duration::minutes(11);
        assert!(!verify(&SECRET, &state, later, STATE_MAX_AGE));
    }

    #[test]
    fn test_garbage_rejected() {
        let now = Utc::now();
        assert!(!verify(&SECRET, "", now, STATE_MAX_AGE));
        assert!(!verify(&SECRET, "no-dots-here", now, STATE_MAX_AGE));
        assert!(!verify(&SECRET, "a.b.c", now, STATE_MAX_AGE));
    }
}
