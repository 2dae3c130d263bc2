//! # Core Ports
//!
//! Contracts between the domain services and the outside world. Adapters
//! (storage, auth, mail, web) implement these; services depend only on
//! trait objects. With the `testing` feature (or under `cfg(test)`)
//! mockall generates a `MockXxx` for each port.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use uuid::Uuid;

use crate::error::DomainResult;
use crate::models::{Post, PostChanges, ProfileFields, User};

/// Persistence contract for user records.
///
/// `add_pin` / `remove_pin` carry set semantics: both are idempotent, and
/// a backend must not duplicate an entry under concurrent adds.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>>;

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<User>>;

    /// Insert a new record; a duplicate email yields `DomainError::Conflict`.
    async fn insert(&self, user: User) -> DomainResult<()>;

    async fn update_profile(&self, id: Uuid, fields: ProfileFields) -> DomainResult<()>;

    /// Flip `is_confirmed` on. A no-op when already confirmed or when no
    /// such user exists.
    async fn set_confirmed(&self, email: &str) -> DomainResult<()>;

    async fn set_image(&self, id: Uuid, image_id: Option<Uuid>) -> DomainResult<()>;

    async fn add_pin(&self, email: &str, post_id: Uuid) -> DomainResult<()>;

    async fn remove_pin(&self, email: &str, post_id: Uuid) -> DomainResult<()>;

    /// All users, email ascending. Admin listing only; never exposed to
    /// regular accounts.
    async fn list_all(&self) -> DomainResult<Vec<User>>;
}

/// Persistence contract for posts.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait PostStore: Send + Sync {
    async fn find(&self, id: Uuid) -> DomainResult<Option<Post>>;

    /// Published posts only, publish date descending.
    async fn list_published(&self) -> DomainResult<Vec<Post>>;

    /// Every post by one author regardless of status, publish date
    /// descending.
    async fn list_by_author(&self, author: &str) -> DomainResult<Vec<Post>>;

    /// The subset of `ids` that exists, publish date descending. Unknown
    /// ids are silently skipped.
    async fn list_by_ids(&self, ids: &[Uuid]) -> DomainResult<Vec<Post>>;

    async fn insert(&self, post: Post) -> DomainResult<()>;

    async fn update_content(&self, id: Uuid, changes: PostChanges) -> DomainResult<()>;

    async fn set_image(&self, id: Uuid, image_id: Uuid) -> DomainResult<()>;

    async fn delete(&self, id: Uuid) -> DomainResult<()>;
}

/// Content storage for uploaded images.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `data` and return the opaque id the caller should reference.
    async fn put(&self, data: Bytes, filename: &str) -> DomainResult<Uuid>;

    async fn get(&self, id: Uuid) -> DomainResult<Option<Bytes>>;

    /// Remove a blob. Deleting an id that no longer exists is not an
    /// error.
    async fn delete(&self, id: Uuid) -> DomainResult<()>;
}

/// Outbound mail contract. Transport is a deployment concern; the domain
/// only supplies a rendered body.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, recipient: &str, subject: &str, html_body: &str) -> DomainResult<()>;
}

/// Password hashing contract.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait CredentialHasher: Send + Sync {
    fn hash(&self, plaintext: &str) -> DomainResult<String>;

    /// Compare a plaintext against a stored hash. A malformed stored hash
    /// counts as a mismatch, not an error.
    fn verify(&self, plaintext: &str, hash: &str) -> bool;
}

/// Signed, time-limited token contract (email confirmation links).
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait TokenSigner: Send + Sync {
    fn sign(&self, payload: &str) -> String;

    /// Recover the payload. Fails with `DomainError::TokenInvalid` when
    /// the token is malformed, tampered with, or older than `max_age`.
    fn verify(&self, token: &str, max_age: Duration) -> DomainResult<String>;
}

/// A session cookie value ready to be handed to the browser.
#[derive(Debug, Clone)]
pub struct SessionTicket {
    pub value: String,
    /// `Some` when the browser should persist the cookie ("remember me");
    /// `None` makes it a session cookie that dies with the browser.
    pub max_age: Option<Duration>,
}

/// Client-held, server-signed session contract. There is no server-side
/// session record to create or destroy.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait SessionProvider: Send + Sync {
    fn issue(&self, email: &str, remember: bool) -> SessionTicket;

    /// The principal email, when `value` carries a valid, unexpired
    /// session signature.
    fn resolve(&self, value: &str) -> Option<String>;
}
