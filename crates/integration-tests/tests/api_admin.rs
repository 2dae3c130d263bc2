//! Administrator surface: the user listing, editing other accounts, and
//! the admin override on post permissions.

use axum::http::StatusCode;
use domains::models::PostStatus;
use domains::ports::UserStore;
use integration_tests::{web, TestApp};

#[tokio::test]
async fn the_user_listing_is_admin_only() {
    let app = TestApp::new();
    app.seed_user("admin@x.com", "secretsecret", true, true).await;
    app.seed_user("plain@x.com", "secretsecret", true, false).await;

    let response = web::get(&app.router, "/users", None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(web::location(&response).starts_with("/login"));

    let response = web::get(
        &app.router,
        "/users",
        Some(&app.session_cookie("plain@x.com")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let html = web::body_text(response).await;
    assert!(html.contains("administrator"));

    let response = web::get(
        &app.router,
        "/users",
        Some(&app.session_cookie("admin@x.com")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = web::body_text(response).await;
    assert!(html.contains("plain@x.com"));
    assert!(html.contains("admin@x.com"));
}

#[tokio::test]
async fn admins_can_edit_and_delete_anyones_post() {
    let app = TestApp::new();
    app.seed_user("admin@x.com", "secretsecret", true, true).await;
    app.seed_user("owner@x.com", "secretsecret", true, false).await;
    let post = app
        .seed_post("owner@x.com", "Somebody's dish", PostStatus::Published)
        .await;
    let admin = app.session_cookie("admin@x.com");

    let response = web::get(
        &app.router,
        &format!("/blog/edit/{}", post.id),
        Some(&admin),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = web::post_multipart(
        &app.router,
        &format!("/blog/edit/{}", post.id),
        Some(&admin),
        &[
            ("title", "Moderated title"),
            ("content", "Cleaned up."),
            ("date", "2026-08-01"),
            ("status", "published"),
        ],
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let updated = app.post_service.find(post.id).await.unwrap().unwrap();
    assert_eq!(updated.title, "Moderated title");
    // Editing as admin does not take ownership.
    assert_eq!(updated.author, "owner@x.com");

    let response = web::post_empty(
        &app.router,
        &format!("/blog/delete/{}", post.id),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(app.post_service.find(post.id).await.unwrap().is_none());
}

#[tokio::test]
async fn admins_edit_other_accounts_through_the_user_route() {
    let app = TestApp::new();
    app.seed_user("admin@x.com", "secretsecret", true, true).await;
    let target = app.seed_user("target@x.com", "secretsecret", true, false).await;
    let admin = app.session_cookie("admin@x.com");

    let response = web::get(
        &app.router,
        &format!("/user/{}", target.id),
        Some(&admin),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = web::body_text(response).await;
    assert!(html.contains("target@x.com"));

    let response = web::post_multipart(
        &app.router,
        &format!("/user/{}", target.id),
        Some(&admin),
        &[
            ("name", "Renamed By Admin"),
            ("address", ""),
            ("bio", ""),
            ("theme", "dark"),
        ],
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(web::location(&response), "/users");

    let after = app.users.find_by_id(target.id).await.unwrap().unwrap();
    assert_eq!(after.name, "Renamed By Admin");
    assert_eq!(after.theme, "dark");
    assert_eq!(after.email, "target@x.com");
    assert!(!after.is_admin);
}

#[tokio::test]
async fn regular_users_cannot_reach_other_accounts() {
    let app = TestApp::new();
    app.seed_user("plain@x.com", "secretsecret", true, false).await;
    let target = app.seed_user("target@x.com", "secretsecret", true, false).await;

    let response = web::get(
        &app.router,
        &format!("/user/{}", target.id),
        Some(&app.session_cookie("plain@x.com")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn unknown_user_ids_soft_fail_for_admins() {
    let app = TestApp::new();
    app.seed_user("admin@x.com", "secretsecret", true, true).await;
    let admin = app.session_cookie("admin@x.com");

    let response = web::get(
        &app.router,
        "/user/0191b2c3-0000-7000-8000-000000000000",
        Some(&admin),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(web::location(&response), "/");
}

#[tokio::test]
async fn self_service_profile_edits_stay_on_the_principal() {
    let app = TestApp::new();
    let me = app.seed_user("me@x.com", "secretsecret", true, false).await;
    let cookie = app.session_cookie("me@x.com");

    let response = web::post_multipart(
        &app.router,
        "/profile",
        Some(&cookie),
        &[
            ("name", "My New Name"),
            ("address", "2 Pantry Road"),
            ("bio", "Breakfast only."),
            ("theme", "light"),
        ],
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(web::location(&response), "/profile");

    let after = app.users.find_by_id(me.id).await.unwrap().unwrap();
    assert_eq!(after.name, "My New Name");
    assert_eq!(after.address, "2 Pantry Road");
    assert_eq!(after.password_hash, me.password_hash);
}
