//! Web-facing error mapping. Missing resources soft-fail to the front
//! page with a flash message, capability failures get the dedicated 403
//! view, missing authentication redirects to login, and anything
//! infrastructural is a logged 500.

use std::collections::HashSet;

use askama::Template;
use axum::http::header::SET_COOKIE;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use tracing::error;

use domains::authz::{Need, Permission};
use domains::error::DomainError;

use crate::flash::{self, FlashMessage, Level};
use crate::templates::{ForbiddenTemplate, PageContext};

/// Error type produced by handlers. Every variant knows how to render
/// itself to the browser.
#[derive(Debug, thiserror::Error)]
pub enum WebError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("template rendering: {0}")]
    Render(#[from] askama::Error),

    #[error("malformed request: {0}")]
    BadRequest(String),
}

/// A redirect that carries one flashed message for the next page view.
pub fn flash_redirect(to: &str, level: Level, text: impl Into<String>) -> Response {
    let mut response = Redirect::to(to).into_response();
    response.headers_mut().append(
        SET_COOKIE,
        flash::set_cookie(&[FlashMessage::new(level, text)]),
    );
    response
}

/// The soft-failure path for missing resources: home with a message.
pub fn not_found_redirect(what: &str) -> Response {
    flash_redirect("/", Level::Danger, format!("{what} not found."))
}

/// Capability guard. `description` is what the 403 page shows.
pub fn require(
    permission: &Permission,
    provided: &HashSet<Need>,
    description: &str,
) -> Result<(), WebError> {
    if permission.can(provided) {
        Ok(())
    } else {
        Err(WebError::Domain(DomainError::Forbidden(
            description.to_owned(),
        )))
    }
}

fn forbidden_page(description: &str) -> Response {
    let template = ForbiddenTemplate {
        ctx: PageContext::anonymous(),
        description: description.to_owned(),
    };
    match template.render() {
        Ok(html) => (StatusCode::FORBIDDEN, Html(html)).into_response(),
        Err(err) => {
            error!(%err, "failed to render the 403 page");
            (StatusCode::FORBIDDEN, description.to_owned()).into_response()
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        match self {
            WebError::Domain(DomainError::NotFound(what, _)) => not_found_redirect(&what),
            WebError::Domain(DomainError::Forbidden(description)) => forbidden_page(&description),
            WebError::Domain(DomainError::Unauthenticated) => {
                Redirect::to("/login").into_response()
            }
            WebError::Domain(DomainError::TokenInvalid) => flash_redirect(
                "/login",
                Level::Danger,
                "The confirmation link is invalid or has expired.",
            ),
            WebError::Domain(DomainError::Conflict(message))
            | WebError::Domain(DomainError::Validation(message)) => {
                flash_redirect("/", Level::Warning, message)
            }
            WebError::Domain(DomainError::Internal(message)) => {
                error!(%message, "internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
            }
            WebError::Render(err) => {
                error!(%err, "template rendering failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
            }
            WebError::BadRequest(message) => (StatusCode::BAD_REQUEST, message).into_response(),
        }
    }
}
