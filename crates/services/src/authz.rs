//! # Capability derivation and permission construction
//!
//! Capabilities are recomputed from the stores at the top of each guarded
//! request instead of being cached on a session or raised by a login-time
//! signal. That trades one author-scan per request for a model with
//! nothing to invalidate: a change of authorship or admin status is
//! visible on the very next request.

use std::collections::HashSet;

use uuid::Uuid;

use domains::authz::{Need, Permission, Role};
use domains::error::DomainResult;
use domains::models::User;
use domains::ports::PostStore;

/// The capability set `user` currently provides.
///
/// Every authenticated principal provides `Role(Author)`; administrators
/// additionally provide `Role(Admin)`; authors provide `EditPost` for
/// each of their own posts.
pub async fn derive_capabilities(
    user: &User,
    posts: &dyn PostStore,
) -> DomainResult<HashSet<Need>> {
    let mut provides = HashSet::new();
    provides.insert(Need::Role(Role::Author));
    if user.is_admin {
        provides.insert(Need::Role(Role::Admin));
    }
    for post in posts.list_by_author(&user.email).await? {
        provides.insert(Need::EditPost(post.id));
    }
    Ok(provides)
}

/// Administrative actions require the admin role.
pub fn admin_permission() -> Permission {
    Permission::require(Need::Role(Role::Admin))
}

/// Actions open to any authenticated principal.
pub fn author_permission() -> Permission {
    Permission::require(Need::Role(Role::Author))
}

/// Permission to edit or delete one post.
///
/// When the post exists and belongs to `principal` the permission is
/// `Always`: ownership is decided against the stored record rather than
/// the derived capability set, so a post created moments ago is editable
/// without re-deriving anything. Everyone else needs the matching
/// `EditPost` grant or the admin role.
pub async fn edit_post_permission(
    posts: &dyn PostStore,
    post_id: Uuid,
    principal: Option<&str>,
) -> DomainResult<Permission> {
    if let (Some(post), Some(email)) = (posts.find(post_id).await?, principal) {
        if post.author == email {
            return Ok(Permission::Always);
        }
    }
    Ok(Permission::require_any([
        Need::EditPost(post_id),
        Need::Role(Role::Admin),
    ]))
}
