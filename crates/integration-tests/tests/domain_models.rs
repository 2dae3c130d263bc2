//! Model invariants and the capability rules, exercised through the real
//! derivation path over an in-memory post store.

use std::collections::HashSet;

use domains::authz::{Identity, Need, Permission, Role};
use domains::models::{PostStatus, User};
use integration_tests::TestApp;
use services::authz::{admin_permission, derive_capabilities, edit_post_permission};
use uuid::Uuid;

fn identity(user: User, provides: HashSet<Need>) -> Identity {
    Identity { user, provides }
}

#[test]
fn fresh_registrations_are_locked_down() {
    let user = User::register("new@example.com", "New Cook", "$argon2id$stub".to_owned());
    assert!(!user.is_confirmed);
    assert!(!user.is_admin);
    assert!(user.pinned.is_empty());
    assert!(user.image_id.is_none());
}

#[test]
fn post_status_has_exactly_two_states() {
    assert_eq!(PostStatus::parse("draft"), Some(PostStatus::Draft));
    assert_eq!(PostStatus::parse("published"), Some(PostStatus::Published));
    assert_eq!(PostStatus::parse("Published"), None);
    assert_eq!(PostStatus::parse(""), None);
}

#[tokio::test]
async fn edit_permission_grants_author_and_admin_and_nobody_else() {
    let app = TestApp::new();
    let author = app.seed_user("owner@example.com", "pw-owner-12345", true, false).await;
    let admin = app.seed_user("admin@example.com", "pw-admin-12345", true, true).await;
    let rival = app.seed_user("rival@example.com", "pw-rival-12345", true, false).await;
    let post = app
        .seed_post("owner@example.com", "Guarded dish", PostStatus::Published)
        .await;

    for (user, expected) in [(author, true), (admin, true), (rival, false)] {
        let email = user.email.clone();
        let provides = derive_capabilities(&user, app.posts.as_ref()).await.unwrap();
        let permission = edit_post_permission(app.posts.as_ref(), post.id, Some(&email))
            .await
            .unwrap();
        assert_eq!(
            identity(user, provides).can(&permission),
            expected,
            "unexpected decision for {email}"
        );
    }

    // Unauthenticated principals provide nothing and are denied.
    let permission = edit_post_permission(app.posts.as_ref(), post.id, None)
        .await
        .unwrap();
    assert!(!permission.can(&HashSet::new()));
}

#[tokio::test]
async fn admin_permission_tracks_the_stored_flag_per_request() {
    let app = TestApp::new();
    let mut user = app.seed_user("cook@example.com", "pw-cook-123456", true, false).await;

    let provides = derive_capabilities(&user, app.posts.as_ref()).await.unwrap();
    assert!(!admin_permission().can(&provides));

    // Nothing is cached: flipping the flag changes the next derivation.
    user.is_admin = true;
    let provides = derive_capabilities(&user, app.posts.as_ref()).await.unwrap();
    assert!(admin_permission().can(&provides));
}

#[test]
fn empty_requirement_admits_the_anonymous() {
    assert!(Permission::Always.can(&HashSet::new()));
    let guarded = Permission::require(Need::Role(Role::Author));
    assert!(!guarded.can(&HashSet::new()));
    assert!(!Permission::require(Need::EditPost(Uuid::now_v7())).can(&HashSet::new()));
}
