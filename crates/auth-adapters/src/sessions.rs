//! Signed-cookie sessions: client-held, server-verified.
//!
//! The cookie value is a timed token over the principal's email, so there
//! is no server-side session record. "Remember me" only decides whether a
//! Max-Age is attached for the browser; the signature TTL is the hard
//! upper bound either way.

use std::time::Duration;

use tracing::debug;

use domains::ports::{SessionProvider, SessionTicket, TokenSigner};

use crate::tokens::TimedSigner;

pub struct CookieSessions {
    signer: TimedSigner,
    ttl: Duration,
}

impl CookieSessions {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            signer: TimedSigner::new(secret, "session"),
            ttl,
        }
    }
}

impl SessionProvider for CookieSessions {
    fn issue(&self, email: &str, remember: bool) -> SessionTicket {
        SessionTicket {
            value: self.signer.sign(email),
            max_age: remember.then_some(self.ttl),
        }
    }

    fn resolve(&self, value: &str) -> Option<String> {
        match self.signer.verify(value, self.ttl) {
            Ok(email) => Some(email),
            Err(_) => {
                debug!("session cookie failed verification");
                None
            }
        }
    }
}
