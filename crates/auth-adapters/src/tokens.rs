//! # Timed, signed tokens
//!
//! URL-safe tokens of the form `payload.timestamp.signature`, where the
//! signature is HMAC-SHA256 over the context string, the encoded payload
//! and the timestamp. Verification is constant-time through the Mac
//! comparison and enforces a caller-supplied maximum age, which is what
//! makes confirmation links time-bounded.

use std::time::Duration;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use domains::error::{DomainError, DomainResult};
use domains::ports::TokenSigner;

type HmacSha256 = Hmac<Sha256>;

/// Signs and verifies timed tokens for one purpose. Distinct `context`
/// strings keep a token minted for one flow from being replayed in
/// another, even under the same key.
#[derive(Clone)]
pub struct TimedSigner {
    key: Vec<u8>,
    context: &'static str,
}

impl TimedSigner {
    pub fn new(secret: &[u8], context: &'static str) -> Self {
        Self {
            key: secret.to_vec(),
            context,
        }
    }

    fn mac_for(&self, payload_b64: &str, timestamp: i64) -> HmacSha256 {
        let mut mac =
            HmacSha256::new_from_slice(&self.key).expect("HMAC accepts keys of any length");
        mac.update(self.context.as_bytes());
        mac.update(b".");
        mac.update(payload_b64.as_bytes());
        mac.update(b".");
        mac.update(timestamp.to_string().as_bytes());
        mac
    }

    fn sign_at(&self, payload: &str, timestamp: i64) -> String {
        let payload_b64 = URL_SAFE_NO_PAD.encode(payload.as_bytes());
        let signature = self.mac_for(&payload_b64, timestamp).finalize().into_bytes();
        format!(
            "{payload_b64}.{timestamp}.{}",
            URL_SAFE_NO_PAD.encode(signature)
        )
    }

    fn verify_at(&self, token: &str, max_age: Duration, now: i64) -> DomainResult<String> {
        let mut parts = token.split('.');
        let (Some(payload_b64), Some(timestamp), Some(signature), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(DomainError::TokenInvalid);
        };
        let timestamp: i64 = timestamp.parse().map_err(|_| DomainError::TokenInvalid)?;
        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| DomainError::TokenInvalid)?;

        self.mac_for(payload_b64, timestamp)
            .verify_slice(&signature)
            .map_err(|_| DomainError::TokenInvalid)?;

        // Clock skew into the future is as suspect as expiry.
        let age = now - timestamp;
        if age < 0 || age as u64 > max_age.as_secs() {
            return Err(DomainError::TokenInvalid);
        }

        let payload = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|_| DomainError::TokenInvalid)?;
        String::from_utf8(payload).map_err(|_| DomainError::TokenInvalid)
    }
}

impl TokenSigner for TimedSigner {
    fn sign(&self, payload: &str) -> String {
        self.sign_at(payload, Utc::now().timestamp())
    }

    fn verify(&self, token: &str, max_age: Duration) -> DomainResult<String> {
        self.verify_at(token, max_age, Utc::now().timestamp())
    }
}
