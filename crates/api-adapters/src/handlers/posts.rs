//! Post lifecycle routes: listing, viewing, authoring, image serving.

use axum::extract::{Multipart, Path, State};
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use uuid::Uuid;

use services::authz::{author_permission, edit_post_permission};

use crate::error::{flash_redirect, not_found_redirect, require, WebError};
use crate::extract::{IncomingFlash, MaybePrincipal, Principal};
use crate::flash::{FlashMessage, Level};
use crate::forms::PostForm;
use crate::state::AppState;
use crate::templates::{PageContext, PostCard, PostFormTemplate, PostListTemplate, PostViewTemplate};

use super::page;

/// `GET /` — published dishes, newest first.
pub async fn index(
    State(state): State<AppState>,
    MaybePrincipal(viewer): MaybePrincipal,
    IncomingFlash(flash): IncomingFlash,
) -> Result<Response, WebError> {
    let posts = state.posts.list_published().await?;
    let had_flash = !flash.is_empty();
    let template = PostListTemplate {
        heading: "Latest dishes".to_owned(),
        posts: posts
            .iter()
            .map(|post| PostCard::of(post, viewer.as_ref()))
            .collect(),
        ctx: PageContext::new(viewer.as_ref(), flash),
    };
    page(&template, had_flash)
}

/// `GET /myposts` — everything the principal wrote, drafts included.
pub async fn my_posts(
    State(state): State<AppState>,
    Principal(identity): Principal,
    IncomingFlash(flash): IncomingFlash,
) -> Result<Response, WebError> {
    let posts = state.posts.list_by_author(&identity.user.email).await?;
    let had_flash = !flash.is_empty();
    let template = PostListTemplate {
        heading: "My dishes".to_owned(),
        posts: posts
            .iter()
            .map(|post| PostCard::of(post, Some(&identity)))
            .collect(),
        ctx: PageContext::new(Some(&identity), flash),
    };
    page(&template, had_flash)
}

/// `GET /blog/{id}` — public view. Unknown or malformed ids soft-fail to
/// the front page; drafts stay reachable by direct link.
pub async fn view(
    State(state): State<AppState>,
    MaybePrincipal(viewer): MaybePrincipal,
    IncomingFlash(flash): IncomingFlash,
    Path(id): Path<String>,
) -> Result<Response, WebError> {
    let Ok(id) = Uuid::parse_str(&id) else {
        return Ok(not_found_redirect("Dish"));
    };
    let Some(post) = state.posts.find(id).await? else {
        return Ok(not_found_redirect("Dish"));
    };

    let permission = edit_post_permission(
        state.post_store.as_ref(),
        id,
        viewer.as_ref().map(|identity| identity.user.email.as_str()),
    )
    .await?;
    let can_edit = viewer
        .as_ref()
        .is_some_and(|identity| identity.can(&permission));

    let had_flash = !flash.is_empty();
    let template = PostViewTemplate {
        id: post.id.to_string(),
        title: post.title.clone(),
        author: post.author.clone(),
        status_label: post.status.label().to_owned(),
        publish_date: post.publish_date.format("%Y-%m-%d").to_string(),
        updated_at: post
            .updated_at
            .map(|at| at.format("%Y-%m-%d %H:%M").to_string()),
        image_id: post.image_id.map(|id| id.to_string()),
        paragraphs: post
            .content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(str::to_owned)
            .collect(),
        pinned: viewer
            .as_ref()
            .is_some_and(|identity| identity.user.pinned.contains(&post.id)),
        can_edit,
        ctx: PageContext::new(viewer.as_ref(), flash),
    };
    page(&template, had_flash)
}

fn blank_form(identity: &Principal, flash: Vec<FlashMessage>) -> PostFormTemplate {
    PostFormTemplate {
        heading: "New dish".to_owned(),
        action: "/blog/create".to_owned(),
        title_value: String::new(),
        content_value: String::new(),
        date_value: Utc::now().format("%Y-%m-%d").to_string(),
        status_value: "draft".to_owned(),
        has_image: false,
        ctx: PageContext::new(Some(&identity.0), flash),
    }
}

/// `GET /blog/create`
pub async fn create_form(
    principal: Principal,
    IncomingFlash(flash): IncomingFlash,
) -> Result<Response, WebError> {
    let had_flash = !flash.is_empty();
    page(&blank_form(&principal, flash), had_flash)
}

/// `POST /blog/create`
pub async fn create(
    State(state): State<AppState>,
    principal: Principal,
    multipart: Multipart,
) -> Result<Response, WebError> {
    require(
        &author_permission(),
        &principal.0.provides,
        "You must be signed in as an author to create dishes.",
    )?;

    let form = PostForm::read(multipart).await?;
    let input = match form.validate() {
        Ok(input) => input,
        Err(warning) => {
            // Re-render with the submitted values so nothing typed is lost.
            let mut template = blank_form(
                &principal,
                vec![FlashMessage::new(Level::Warning, warning)],
            );
            template.title_value = form.title.clone();
            template.content_value = form.content.clone();
            template.date_value = form.date.clone();
            template.status_value = form.status.clone();
            return page(&template, false);
        }
    };

    state
        .posts
        .create(&principal.0.user.email, input, form.image)
        .await?;
    Ok(flash_redirect("/", Level::Success, "Dish saved successfully."))
}

/// `GET /blog/edit/{id}` — the capability check runs before the record is
/// fetched for prefilling.
pub async fn edit_form(
    State(state): State<AppState>,
    Principal(identity): Principal,
    IncomingFlash(flash): IncomingFlash,
    Path(id): Path<String>,
) -> Result<Response, WebError> {
    let Ok(id) = Uuid::parse_str(&id) else {
        return Ok(not_found_redirect("Dish"));
    };
    let permission = edit_post_permission(
        state.post_store.as_ref(),
        id,
        Some(identity.user.email.as_str()),
    )
    .await?;
    require(
        &permission,
        &identity.provides,
        "You do not have permission to edit this dish.",
    )?;

    let Some(post) = state.posts.find(id).await? else {
        return Ok(not_found_redirect("Dish"));
    };
    let had_flash = !flash.is_empty();
    let template = PostFormTemplate {
        heading: "Edit dish".to_owned(),
        action: format!("/blog/edit/{id}"),
        title_value: post.title.clone(),
        content_value: post.content.clone(),
        date_value: post.publish_date.format("%Y-%m-%d").to_string(),
        status_value: post.status.as_str().to_owned(),
        has_image: post.image_id.is_some(),
        ctx: PageContext::new(Some(&identity), flash),
    };
    page(&template, had_flash)
}

/// `POST /blog/edit/{id}`
pub async fn edit(
    State(state): State<AppState>,
    Principal(identity): Principal,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Response, WebError> {
    let Ok(id) = Uuid::parse_str(&id) else {
        return Ok(not_found_redirect("Dish"));
    };
    let permission = edit_post_permission(
        state.post_store.as_ref(),
        id,
        Some(identity.user.email.as_str()),
    )
    .await?;
    require(
        &permission,
        &identity.provides,
        "You do not have permission to edit this dish.",
    )?;

    let Some(post) = state.posts.find(id).await? else {
        return Ok(not_found_redirect("Dish"));
    };

    let form = PostForm::read(multipart).await?;
    let input = match form.validate() {
        Ok(input) => input,
        Err(warning) => {
            let template = PostFormTemplate {
                heading: "Edit dish".to_owned(),
                action: format!("/blog/edit/{id}"),
                title_value: form.title.clone(),
                content_value: form.content.clone(),
                date_value: form.date.clone(),
                status_value: form.status.clone(),
                has_image: post.image_id.is_some(),
                ctx: PageContext::new(
                    Some(&identity),
                    vec![FlashMessage::new(Level::Warning, warning)],
                ),
            };
            return page(&template, false);
        }
    };

    state.posts.update(&post, input, form.image).await?;
    Ok(flash_redirect(
        &format!("/blog/{id}"),
        Level::Success,
        "Dish updated successfully.",
    ))
}

/// `POST /blog/delete/{id}`
pub async fn delete(
    State(state): State<AppState>,
    Principal(identity): Principal,
    Path(id): Path<String>,
) -> Result<Response, WebError> {
    let Ok(id) = Uuid::parse_str(&id) else {
        return Ok(not_found_redirect("Dish"));
    };
    let permission = edit_post_permission(
        state.post_store.as_ref(),
        id,
        Some(identity.user.email.as_str()),
    )
    .await?;
    require(
        &permission,
        &identity.provides,
        "You do not have permission to delete this dish.",
    )?;

    let Some(post) = state.posts.find(id).await? else {
        return Ok(not_found_redirect("Dish"));
    };
    state.posts.delete(&post).await?;
    Ok(flash_redirect(
        "/",
        Level::Success,
        "Dish deleted successfully.",
    ))
}

/// `GET /image/{id}` — serve a stored blob. The content type is fixed:
/// the upload path only accepts images and never re-encodes them.
pub async fn image(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, WebError> {
    let Ok(id) = Uuid::parse_str(&id) else {
        return Ok(not_found_redirect("Image"));
    };
    let Some(bytes) = state.blob_store.get(id).await? else {
        return Ok(not_found_redirect("Image"));
    };
    Ok(([(CONTENT_TYPE, mime::IMAGE_JPEG.as_ref())], bytes).into_response())
}
