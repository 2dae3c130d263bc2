//! dishboard/crates/auth-adapters/src/lib.rs
//!
//! Credential hashing (argon2), URL-safe timed token signing, and the
//! signed-cookie session layer built on top of it. Everything here is
//! deterministic CPU work; no port in this crate performs I/O.

pub mod password;
pub mod sessions;
pub mod tokens;

pub use password::Argon2Hasher;
pub use sessions::CookieSessions;
pub use tokens::TimedSigner;

// The ports these adapters implement, re-exported so binaries that only
// hash or sign (the seeding tool) need no direct domains dependency.
pub use domains::ports::{CredentialHasher, SessionProvider, TokenSigner};
