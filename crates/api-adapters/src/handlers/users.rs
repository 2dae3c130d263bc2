//! Profile, pinning and the admin user area.

use axum::extract::{Multipart, Path, State};
use axum::http::header::REFERER;
use axum::http::HeaderMap;
use axum::response::Response;
use uuid::Uuid;

use domains::models::User;
use services::accounts::PinOutcome;

use crate::error::{flash_redirect, not_found_redirect, WebError};
use crate::extract::{AdminPrincipal, IncomingFlash, Principal};
use crate::flash::{FlashMessage, Level};
use crate::forms::ProfileForm;
use crate::state::AppState;
use crate::templates::{PageContext, PostCard, PostListTemplate, ProfileTemplate, UserRow, UsersTemplate};

use super::page;

fn profile_template(
    target: &User,
    heading: &str,
    action: String,
    ctx: PageContext,
) -> ProfileTemplate {
    ProfileTemplate {
        heading: heading.to_owned(),
        action,
        name_value: target.name.clone(),
        address_value: target.address.clone(),
        bio_value: target.bio.clone(),
        theme_value: target.theme.clone(),
        image_id: target.image_id.map(|id| id.to_string()),
        ctx,
    }
}

/// `GET /profile` — the principal's own record, prefilled.
pub async fn profile_form(
    Principal(identity): Principal,
    IncomingFlash(flash): IncomingFlash,
) -> Result<Response, WebError> {
    let had_flash = !flash.is_empty();
    let template = profile_template(
        &identity.user,
        "Your profile",
        "/profile".to_owned(),
        PageContext::new(Some(&identity), flash),
    );
    page(&template, had_flash)
}

/// `POST /profile`
pub async fn profile_update(
    State(state): State<AppState>,
    Principal(identity): Principal,
    multipart: Multipart,
) -> Result<Response, WebError> {
    let form = ProfileForm::read(multipart).await?;
    let fields = match form.validate() {
        Ok(fields) => fields,
        Err(warning) => {
            let template = profile_template(
                &identity.user,
                "Your profile",
                "/profile".to_owned(),
                PageContext::new(
                    Some(&identity),
                    vec![FlashMessage::new(Level::Warning, warning)],
                ),
            );
            return page(&template, false);
        }
    };
    state
        .accounts
        .update_profile(&identity.user, fields, form.image)
        .await?;
    Ok(flash_redirect(
        "/profile",
        Level::Success,
        "Profile updated successfully.",
    ))
}

/// `GET /user/{id}` — admin edit of any account.
pub async fn user_form(
    State(state): State<AppState>,
    AdminPrincipal(identity): AdminPrincipal,
    IncomingFlash(flash): IncomingFlash,
    Path(id): Path<String>,
) -> Result<Response, WebError> {
    let Ok(id) = Uuid::parse_str(&id) else {
        return Ok(not_found_redirect("User"));
    };
    let Some(target) = state.accounts.find_by_id(id).await? else {
        return Ok(not_found_redirect("User"));
    };
    let had_flash = !flash.is_empty();
    let template = profile_template(
        &target,
        &format!("Edit {}", target.email),
        format!("/user/{id}"),
        PageContext::new(Some(&identity), flash),
    );
    page(&template, had_flash)
}

/// `POST /user/{id}`
pub async fn user_update(
    State(state): State<AppState>,
    AdminPrincipal(identity): AdminPrincipal,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Response, WebError> {
    let Ok(id) = Uuid::parse_str(&id) else {
        return Ok(not_found_redirect("User"));
    };
    let Some(target) = state.accounts.find_by_id(id).await? else {
        return Ok(not_found_redirect("User"));
    };
    let form = ProfileForm::read(multipart).await?;
    let fields = match form.validate() {
        Ok(fields) => fields,
        Err(warning) => {
            let template = profile_template(
                &target,
                &format!("Edit {}", target.email),
                format!("/user/{id}"),
                PageContext::new(
                    Some(&identity),
                    vec![FlashMessage::new(Level::Warning, warning)],
                ),
            );
            return page(&template, false);
        }
    };
    state
        .accounts
        .update_profile(&target, fields, form.image)
        .await?;
    Ok(flash_redirect(
        "/users",
        Level::Success,
        "User updated successfully.",
    ))
}

/// `GET /users` — admin listing, email ascending.
pub async fn list(
    State(state): State<AppState>,
    AdminPrincipal(identity): AdminPrincipal,
    IncomingFlash(flash): IncomingFlash,
) -> Result<Response, WebError> {
    let users = state.accounts.list_users().await?;
    let had_flash = !flash.is_empty();
    let template = UsersTemplate {
        users: users.iter().map(UserRow::of).collect(),
        ctx: PageContext::new(Some(&identity), flash),
    };
    page(&template, had_flash)
}

/// `GET /pin_view` — the principal's pinned dishes. Stale pins pointing
/// at deleted posts simply do not resolve.
pub async fn pin_view(
    State(state): State<AppState>,
    Principal(identity): Principal,
    IncomingFlash(flash): IncomingFlash,
) -> Result<Response, WebError> {
    let posts = state.posts.list_by_ids(&identity.user.pinned).await?;
    let had_flash = !flash.is_empty();
    let template = PostListTemplate {
        heading: "Pinned dishes".to_owned(),
        posts: posts
            .iter()
            .map(|post| PostCard::of(post, Some(&identity)))
            .collect(),
        ctx: PageContext::new(Some(&identity), flash),
    };
    page(&template, had_flash)
}

/// `POST /pin_dish/{id}` — one route toggles both ways, branching on the
/// current membership, then returns to the referring page.
pub async fn pin_dish(
    State(state): State<AppState>,
    Principal(identity): Principal,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Response, WebError> {
    let Ok(id) = Uuid::parse_str(&id) else {
        return Ok(not_found_redirect("Dish"));
    };
    let outcome = state.accounts.toggle_pin(&identity.user, id).await?;
    let back = headers
        .get(REFERER)
        .and_then(|value| value.to_str().ok())
        .and_then(referer_path)
        .unwrap_or("/");
    let text = match outcome {
        PinOutcome::Pinned => "Dish pinned.",
        PinOutcome::Unpinned => "Dish unpinned.",
    };
    Ok(flash_redirect(back, Level::Success, text))
}

/// Redirect target from a `Referer` value. Browsers send an absolute
/// URL; only the same-site path portion is kept.
fn referer_path(referer: &str) -> Option<&str> {
    if referer.starts_with('/') && !referer.starts_with("//") {
        return Some(referer);
    }
    let after_scheme = referer.split_once("://")?.1;
    after_scheme.find('/').map(|at| &after_scheme[at..])
}
