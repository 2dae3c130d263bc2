//! # Capabilities and Permissions
//!
//! The request-scoped authorization model. A [`Need`] is an atomic grant,
//! either a role or the ability to edit one specific post. An [`Identity`]
//! couples the authenticated user with the set of needs it currently
//! provides; it is derived fresh on every request and never persisted, so
//! there is no capability state to invalidate when authorship or admin
//! status changes. A [`Permission`] names the needs an action requires.

use std::collections::HashSet;

use uuid::Uuid;

use crate::models::User;

/// Coarse principal roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Any authenticated account.
    Author,
    /// Accounts with the administrator flag set.
    Admin,
}

/// An atomic capability grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Need {
    Role(Role),
    /// Permission to edit (and delete) the post with this id.
    EditPost(Uuid),
}

/// The authenticated principal together with the capability set it
/// provides for the current request.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user: User,
    pub provides: HashSet<Need>,
}

impl Identity {
    pub fn can(&self, permission: &Permission) -> bool {
        permission.can(&self.provides)
    }
}

/// A required capability set, evaluated against a principal's provided
/// needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Permission {
    /// Satisfied by anyone, including unauthenticated principals.
    Always,
    /// Satisfied when at least one of the contained needs is provided.
    RequiresAny(HashSet<Need>),
}

impl Permission {
    /// A permission requiring exactly one need.
    pub fn require(need: Need) -> Self {
        Permission::RequiresAny(HashSet::from([need]))
    }

    /// A permission satisfied by any of the given needs.
    pub fn require_any<I>(needs: I) -> Self
    where
        I: IntoIterator<Item = Need>,
    {
        Permission::RequiresAny(needs.into_iter().collect())
    }

    /// True iff nothing is required or the required set intersects
    /// `provided`.
    pub fn can(&self, provided: &HashSet<Need>) -> bool {
        match self {
            Permission::Always => true,
            Permission::RequiresAny(required) => !required.is_disjoint(provided),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn always_passes_for_everyone() {
        assert!(Permission::Always.can(&HashSet::new()));
        assert!(Permission::Always.can(&HashSet::from([Need::Role(Role::Author)])));
    }

    #[test]
    fn empty_provided_set_satisfies_nothing_else() {
        let permission = Permission::require(Need::Role(Role::Author));
        assert!(!permission.can(&HashSet::new()));
    }

    #[test]
    fn any_overlap_is_enough() {
        let post_id = Uuid::now_v7();
        let permission =
            Permission::require_any([Need::EditPost(post_id), Need::Role(Role::Admin)]);

        let admin = HashSet::from([Need::Role(Role::Author), Need::Role(Role::Admin)]);
        let owner = HashSet::from([Need::Role(Role::Author), Need::EditPost(post_id)]);
        let bystander = HashSet::from([Need::Role(Role::Author), Need::EditPost(Uuid::now_v7())]);

        assert!(permission.can(&admin));
        assert!(permission.can(&owner));
        assert!(!permission.can(&bystander));
    }
}
