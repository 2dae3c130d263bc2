//! Route table. Paths mirror the public site map one to one; every
//! capability decision lives in the handlers and extractors, never here.

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers::{auth, posts, users};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(posts::index))
        .route("/blog/create", get(posts::create_form).post(posts::create))
        .route("/blog/{id}", get(posts::view))
        .route("/blog/edit/{id}", get(posts::edit_form).post(posts::edit))
        .route("/blog/delete/{id}", post(posts::delete))
        .route("/image/{id}", get(posts::image))
        .route("/myposts", get(posts::my_posts))
        .route("/login", get(auth::login_form).post(auth::login))
        .route("/logout", get(auth::logout))
        .route("/register", get(auth::register_form).post(auth::register))
        .route("/confirm/{token}", get(auth::confirm))
        .route("/profile", get(users::profile_form).post(users::profile_update))
        .route("/user/{id}", get(users::user_form).post(users::user_update))
        .route("/users", get(users::list).post(users::list))
        .route("/pin_view", get(users::pin_view))
        .route("/pin_dish/{id}", post(users::pin_dish))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
