//! # Domain Models
//!
//! Core entities of Dishboard. Records carry UUID v7 identifiers for
//! time-ordered, globally unique identification; users are additionally
//! keyed by their email address, which is the identity the session layer
//! and the capability engine reason about.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Publication state of a post. Set explicitly by the author on every
/// save; nothing transitions it automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Draft,
    Published,
}

impl PostStatus {
    /// Storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
        }
    }

    /// Human-readable label for templates.
    pub fn label(&self) -> &'static str {
        match self {
            PostStatus::Draft => "Draft",
            PostStatus::Published => "Published",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "draft" => Some(PostStatus::Draft),
            "published" => Some(PostStatus::Published),
            _ => None,
        }
    }
}

/// A registered account. `pinned` is the set of post ids the user has
/// bookmarked, maintained with idempotent add/remove semantics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub address: String,
    pub bio: String,
    pub theme: String,
    /// Argon2 PHC string; the plaintext never reaches storage.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub is_admin: bool,
    /// Flipped on when the registration email link is followed. Login is
    /// refused until then.
    pub is_confirmed: bool,
    /// Reference into the blob store, when a profile image exists.
    pub image_id: Option<Uuid>,
    pub pinned: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// A fresh, unconfirmed account with empty profile fields.
    pub fn register(email: &str, name: &str, password_hash: String) -> Self {
        User {
            id: Uuid::now_v7(),
            email: email.to_owned(),
            name: name.to_owned(),
            address: String::new(),
            bio: String::new(),
            theme: String::new(),
            password_hash,
            is_admin: false,
            is_confirmed: false,
            image_id: None,
            pinned: Vec::new(),
            created_at: Utc::now(),
        }
    }
}

/// A dish post. `author` is the owning user's email, set at creation and
/// immutable thereafter; ownership transfer is not a thing here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author: String,
    pub status: PostStatus,
    pub publish_date: DateTime<Utc>,
    pub image_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Editable post fields, applied together with a fresh `updated_at`.
#[derive(Debug, Clone)]
pub struct PostChanges {
    pub title: String,
    pub content: String,
    pub status: PostStatus,
    pub publish_date: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Editable profile fields. Self-service and admin edits share these;
/// neither path can touch email, admin status or the password hash.
#[derive(Debug, Clone, Default)]
pub struct ProfileFields {
    pub name: String,
    pub address: String,
    pub bio: String,
    pub theme: String,
}

/// An uploaded file travelling towards the blob store.
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub bytes: Bytes,
}
