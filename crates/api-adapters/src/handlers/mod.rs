//! Route handlers, grouped the way the site is: posts, auth, users.

pub mod auth;
pub mod posts;
pub mod users;

use askama::Template;
use axum::http::header::SET_COOKIE;
use axum::response::{Html, IntoResponse, Response};

use crate::error::WebError;
use crate::flash;

/// Render a page. When the request carried flash messages they were just
/// displayed, so the cookie is cleared in the same response.
pub(crate) fn page<T: Template>(template: &T, had_flash: bool) -> Result<Response, WebError> {
    let html = template.render()?;
    let mut response = Html(html).into_response();
    if had_flash {
        response
            .headers_mut()
            .append(SET_COOKIE, flash::clear_cookie());
    }
    Ok(response)
}
