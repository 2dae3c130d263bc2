//! Post lifecycle over the router: authoring, authorization failures,
//! soft-failing lookups and the pin toggle.

use axum::http::StatusCode;
use domains::models::PostStatus;
use domains::ports::UserStore;
use integration_tests::{web, TestApp};

const DATE: &str = "2026-08-01";

fn post_fields<'a>(title: &'a str, status: &'a str) -> Vec<(&'a str, &'a str)> {
    vec![
        ("title", title),
        ("content", "Chop, season, serve."),
        ("date", DATE),
        ("status", status),
    ]
}

#[tokio::test]
async fn created_posts_appear_on_the_front_page() {
    let app = TestApp::new();
    app.seed_user("cook@x.com", "secretsecret", true, false).await;
    let cookie = app.session_cookie("cook@x.com");

    let response = web::post_multipart(
        &app.router,
        "/blog/create",
        Some(&cookie),
        &post_fields("Pumpkin soup", "published"),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(web::location(&response), "/");

    let response = web::get(&app.router, "/", None).await;
    let html = web::body_text(response).await;
    assert!(html.contains("Pumpkin soup"));
    assert!(html.contains("cook@x.com"));
}

#[tokio::test]
async fn drafts_are_unlisted_but_reachable_by_direct_link() {
    let app = TestApp::new();
    let draft = app
        .seed_post("cook@x.com", "Secret experiment", PostStatus::Draft)
        .await;

    let response = web::get(&app.router, "/", None).await;
    let html = web::body_text(response).await;
    assert!(!html.contains("Secret experiment"));

    let response = web::get(&app.router, &format!("/blog/{}", draft.id), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = web::body_text(response).await;
    assert!(html.contains("Secret experiment"));
}

#[tokio::test]
async fn missing_and_garbage_ids_soft_fail_to_the_front_page() {
    let app = TestApp::new();

    for path in ["/blog/not-a-uuid", "/blog/0191b2c3-0000-7000-8000-000000000000"] {
        let response = web::get(&app.router, path, None).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "for {path}");
        assert_eq!(web::location(&response), "/");
        let messages = web::flash_messages(&response);
        assert!(messages.iter().any(|message| message.text.contains("not found")));
    }
}

#[tokio::test]
async fn strangers_get_403_on_edit_even_for_the_prefill_get() {
    let app = TestApp::new();
    app.seed_user("owner@x.com", "secretsecret", true, false).await;
    app.seed_user("rival@x.com", "secretsecret", true, false).await;
    let post = app
        .seed_post("owner@x.com", "Guarded dish", PostStatus::Published)
        .await;
    let rival = app.session_cookie("rival@x.com");

    let response = web::get(
        &app.router,
        &format!("/blog/edit/{}", post.id),
        Some(&rival),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let html = web::body_text(response).await;
    assert!(html.contains("permission to edit"));
    // The form is never rendered for the denied principal.
    assert!(!html.contains("Guarded dish"));

    let response = web::post_multipart(
        &app.router,
        &format!("/blog/edit/{}", post.id),
        Some(&rival),
        &post_fields("Hijacked", "published"),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn authors_can_edit_their_own_posts() {
    let app = TestApp::new();
    app.seed_user("owner@x.com", "secretsecret", true, false).await;
    let post = app
        .seed_post("owner@x.com", "First title", PostStatus::Draft)
        .await;
    let cookie = app.session_cookie("owner@x.com");

    let response = web::get(
        &app.router,
        &format!("/blog/edit/{}", post.id),
        Some(&cookie),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = web::body_text(response).await;
    assert!(html.contains("First title"));

    let response = web::post_multipart(
        &app.router,
        &format!("/blog/edit/{}", post.id),
        Some(&cookie),
        &post_fields("Second title", "published"),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let updated = app.post_service.find(post.id).await.unwrap().unwrap();
    assert_eq!(updated.title, "Second title");
    assert_eq!(updated.status, PostStatus::Published);
    assert!(updated.updated_at.is_some());
    // Authorship never moves.
    assert_eq!(updated.author, "owner@x.com");
}

#[tokio::test]
async fn deleting_makes_the_post_unreachable() {
    let app = TestApp::new();
    app.seed_user("owner@x.com", "secretsecret", true, false).await;
    let post = app
        .seed_post("owner@x.com", "Doomed dish", PostStatus::Published)
        .await;
    let cookie = app.session_cookie("owner@x.com");

    let response = web::post_empty(
        &app.router,
        &format!("/blog/delete/{}", post.id),
        Some(&cookie),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let response = web::get(&app.router, &format!("/blog/{}", post.id), None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(web::location(&response), "/");
    let messages = web::flash_messages(&response);
    assert!(messages.iter().any(|message| message.text.contains("not found")));
}

#[tokio::test]
async fn strangers_cannot_delete() {
    let app = TestApp::new();
    app.seed_user("owner@x.com", "secretsecret", true, false).await;
    app.seed_user("rival@x.com", "secretsecret", true, false).await;
    let post = app
        .seed_post("owner@x.com", "Guarded dish", PostStatus::Published)
        .await;

    let response = web::post_empty(
        &app.router,
        &format!("/blog/delete/{}", post.id),
        Some(&app.session_cookie("rival@x.com")),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(app.post_service.find(post.id).await.unwrap().is_some());
}

#[tokio::test]
async fn invalid_form_input_rerenders_without_writing() {
    let app = TestApp::new();
    app.seed_user("cook@x.com", "secretsecret", true, false).await;
    let cookie = app.session_cookie("cook@x.com");

    let response = web::post_multipart(
        &app.router,
        "/blog/create",
        Some(&cookie),
        &post_fields("No status dish", "archived"),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = web::body_text(response).await;
    assert!(html.contains("Unknown status"));
    // The typed values survive the round trip.
    assert!(html.contains("No status dish"));
    assert!(app.post_service.list_by_author("cook@x.com").await.unwrap().is_empty());
}

#[tokio::test]
async fn pin_toggles_and_the_pin_view_follows() {
    let app = TestApp::new();
    app.seed_user("cook@x.com", "secretsecret", true, false).await;
    let post = app
        .seed_post("other@x.com", "Pinnable dish", PostStatus::Published)
        .await;
    let pin_path = format!("/pin_dish/{}", post.id);

    let response = web::post_empty(
        &app.router,
        &pin_path,
        Some(&app.session_cookie("cook@x.com")),
        Some("http://dishboard.test/pin_view"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(web::location(&response), "/pin_view");

    let pinned = app
        .users
        .find_by_email("cook@x.com")
        .await
        .unwrap()
        .unwrap()
        .pinned;
    assert_eq!(pinned, vec![post.id]);

    let response = web::get(
        &app.router,
        "/pin_view",
        Some(&app.session_cookie("cook@x.com")),
    )
    .await;
    let html = web::body_text(response).await;
    assert!(html.contains("Pinnable dish"));

    // Same route, second call: unpin.
    web::post_empty(
        &app.router,
        &pin_path,
        Some(&app.session_cookie("cook@x.com")),
        None,
    )
    .await;
    let pinned = app
        .users
        .find_by_email("cook@x.com")
        .await
        .unwrap()
        .unwrap()
        .pinned;
    assert!(pinned.is_empty());
}
