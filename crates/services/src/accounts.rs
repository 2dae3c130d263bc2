//! # Account lifecycle
//!
//! Registration, email confirmation, login checks, profile maintenance
//! and dish pinning. Session issuance lives in the web layer; this
//! service only decides whether a login attempt is acceptable.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;
use uuid::Uuid;

use domains::error::{DomainError, DomainResult};
use domains::models::{ProfileFields, Upload, User};
use domains::ports::{BlobStore, CredentialHasher, Mailer, TokenSigner, UserStore};

/// Outcome of a login attempt. The handler maps each arm to its own
/// user-visible message; bad email and bad password are deliberately
/// indistinguishable.
#[derive(Debug, Clone)]
pub enum LoginOutcome {
    Success(User),
    BadCredentials,
    Unconfirmed,
}

/// Outcome of redeeming a confirmation token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmOutcome {
    Confirmed,
    AlreadyConfirmed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinOutcome {
    Pinned,
    Unpinned,
}

#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserStore>,
    blobs: Arc<dyn BlobStore>,
    hasher: Arc<dyn CredentialHasher>,
    tokens: Arc<dyn TokenSigner>,
    mailer: Arc<dyn Mailer>,
    /// External base URL embedded in outbound mail links.
    public_url: String,
    confirm_max_age: Duration,
}

impl AccountService {
    pub fn new(
        users: Arc<dyn UserStore>,
        blobs: Arc<dyn BlobStore>,
        hasher: Arc<dyn CredentialHasher>,
        tokens: Arc<dyn TokenSigner>,
        mailer: Arc<dyn Mailer>,
        public_url: String,
        confirm_max_age: Duration,
    ) -> Self {
        Self {
            users,
            blobs,
            hasher,
            tokens,
            mailer,
            public_url,
            confirm_max_age,
        }
    }

    pub async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        self.users.find_by_email(email).await
    }

    pub async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<User>> {
        self.users.find_by_id(id).await
    }

    /// Register a new, unconfirmed account and send the confirmation
    /// mail. A duplicate email is rejected before anything is written.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> DomainResult<()> {
        if self.users.find_by_email(email).await?.is_some() {
            return Err(DomainError::Conflict(format!("user {email} already exists")));
        }
        let password_hash = self.hasher.hash(password)?;
        self.users
            .insert(User::register(email, name, password_hash))
            .await?;
        self.send_confirmation(email).await?;
        info!(%email, "user registered");
        Ok(())
    }

    async fn send_confirmation(&self, email: &str) -> DomainResult<()> {
        let token = self.tokens.sign(email);
        let confirm_url = format!(
            "{}/confirm/{token}",
            self.public_url.trim_end_matches('/')
        );
        self.mailer
            .send(
                email,
                "Please confirm your email address",
                &confirmation_body(&confirm_url),
            )
            .await
    }

    /// Redeem a confirmation token. Redeeming twice is harmless; the
    /// second call reports `AlreadyConfirmed` without touching storage.
    pub async fn confirm(&self, token: &str) -> DomainResult<ConfirmOutcome> {
        let email = self.tokens.verify(token, self.confirm_max_age)?;
        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or_else(|| DomainError::NotFound("user".to_owned(), email.clone()))?;
        if user.is_confirmed {
            return Ok(ConfirmOutcome::AlreadyConfirmed);
        }
        self.users.set_confirmed(&email).await?;
        info!(%email, "email address confirmed");
        Ok(ConfirmOutcome::Confirmed)
    }

    /// Check credentials and confirmation state. Never yields a session
    /// for an unconfirmed account, however correct the password.
    pub async fn login(&self, email: &str, password: &str) -> DomainResult<LoginOutcome> {
        let Some(user) = self.users.find_by_email(email).await? else {
            return Ok(LoginOutcome::BadCredentials);
        };
        if !self.hasher.verify(password, &user.password_hash) {
            return Ok(LoginOutcome::BadCredentials);
        }
        if !user.is_confirmed {
            info!(%email, "login rejected for unconfirmed address");
            return Ok(LoginOutcome::Unconfirmed);
        }
        info!(%email, "login accepted");
        Ok(LoginOutcome::Success(user))
    }

    /// Persist profile fields for `target`; when a new image is uploaded
    /// the previous blob is deleted first, keeping at most one profile
    /// image per user.
    pub async fn update_profile(
        &self,
        target: &User,
        fields: ProfileFields,
        image: Option<Upload>,
    ) -> DomainResult<()> {
        self.users.update_profile(target.id, fields).await?;
        if let Some(upload) = image {
            if let Some(old_id) = target.image_id {
                self.blobs.delete(old_id).await?;
            }
            let image_id = self.blobs.put(upload.bytes, &upload.filename).await?;
            self.users.set_image(target.id, Some(image_id)).await?;
        }
        info!(user_id = %target.id, "profile updated");
        Ok(())
    }

    /// Toggle a post id in the principal's pinned set.
    pub async fn toggle_pin(&self, user: &User, post_id: Uuid) -> DomainResult<PinOutcome> {
        if user.pinned.contains(&post_id) {
            self.users.remove_pin(&user.email, post_id).await?;
            Ok(PinOutcome::Unpinned)
        } else {
            self.users.add_pin(&user.email, post_id).await?;
            Ok(PinOutcome::Pinned)
        }
    }

    pub async fn list_users(&self) -> DomainResult<Vec<User>> {
        self.users.list_all().await
    }
}

/// Minimal confirmation-mail body. Transport and styling are adapter
/// concerns.
fn confirmation_body(confirm_url: &str) -> String {
    format!(
        "<p>Welcome to Dishboard!</p>\
         <p>Please confirm your email address by following \
         <a href=\"{confirm_url}\">this link</a>.</p>\
         <p>The link expires in one hour.</p>"
    )
}
