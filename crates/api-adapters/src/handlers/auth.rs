//! Session routes: login, logout, registration and email confirmation.
//! The login form posts back to its own URL, so a `?next=` carried in
//! from a guarded route survives the round trip.

use axum::extract::{Path, Query, State};
use axum::http::header::SET_COOKIE;
use axum::response::{IntoResponse, Redirect, Response};
use serde::Deserialize;

use domains::error::DomainError;
use services::accounts::{ConfirmOutcome, LoginOutcome};

use crate::error::{flash_redirect, WebError};
use crate::extract::{clear_session_cookie, session_cookie, IncomingFlash, MaybePrincipal};
use crate::flash::Level;
use crate::forms::{LoginForm, RegisterForm};
use crate::state::AppState;
use crate::templates::{LoginTemplate, PageContext, RegisterTemplate};

use super::page;

#[derive(Debug, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

impl NextQuery {
    /// Post-login destination. Only same-site paths are honored, so a
    /// crafted `?next=` cannot bounce the browser off-site.
    fn destination(&self) -> &str {
        match self.next.as_deref() {
            Some(next) if next.starts_with('/') && !next.starts_with("//") => next,
            _ => "/",
        }
    }
}

/// `GET /login`
pub async fn login_form(
    MaybePrincipal(viewer): MaybePrincipal,
    IncomingFlash(flash): IncomingFlash,
) -> Result<Response, WebError> {
    if viewer.is_some() {
        return Ok(Redirect::to("/").into_response());
    }
    let had_flash = !flash.is_empty();
    let template = LoginTemplate {
        ctx: PageContext::new(None, flash),
    };
    page(&template, had_flash)
}

/// `POST /login`
pub async fn login(
    State(state): State<AppState>,
    Query(next): Query<NextQuery>,
    axum::Form(form): axum::Form<LoginForm>,
) -> Result<Response, WebError> {
    match state.accounts.login(&form.email, &form.password).await? {
        LoginOutcome::Success(user) => {
            let ticket = state.sessions.issue(&user.email, form.remember());
            let mut response = flash_redirect(
                next.destination(),
                Level::Success,
                "Logged in successfully.",
            );
            response
                .headers_mut()
                .append(SET_COOKIE, session_cookie(&ticket));
            Ok(response)
        }
        LoginOutcome::BadCredentials => Ok(flash_redirect(
            "/login",
            Level::Danger,
            "Invalid email address or password.",
        )),
        // Deliberately distinct from the bad-credentials message.
        LoginOutcome::Unconfirmed => Ok(flash_redirect(
            "/login",
            Level::Warning,
            "Please confirm your email address before logging in.",
        )),
    }
}

/// `GET /logout`
pub async fn logout() -> Response {
    let mut response = flash_redirect("/", Level::Info, "You have been logged out.");
    response
        .headers_mut()
        .append(SET_COOKIE, clear_session_cookie());
    response
}

/// `GET /register`
pub async fn register_form(
    MaybePrincipal(viewer): MaybePrincipal,
    IncomingFlash(flash): IncomingFlash,
) -> Result<Response, WebError> {
    if viewer.is_some() {
        return Ok(Redirect::to("/").into_response());
    }
    let had_flash = !flash.is_empty();
    let template = RegisterTemplate {
        ctx: PageContext::new(None, flash),
    };
    page(&template, had_flash)
}

/// `POST /register` — a duplicate email stays on the form with an error;
/// success sends the confirmation mail and lands on the login page.
pub async fn register(
    State(state): State<AppState>,
    axum::Form(form): axum::Form<RegisterForm>,
) -> Result<Response, WebError> {
    if let Err(warning) = form.validate() {
        return Ok(flash_redirect("/register", Level::Warning, warning));
    }
    match state
        .accounts
        .register(&form.name, &form.email, &form.password)
        .await
    {
        Ok(()) => Ok(flash_redirect(
            "/login",
            Level::Success,
            "Account created. A confirmation link is on its way to your inbox.",
        )),
        Err(DomainError::Conflict(_)) => Ok(flash_redirect(
            "/register",
            Level::Danger,
            "An account with this email address already exists.",
        )),
        Err(err) => Err(err.into()),
    }
}

/// `GET /confirm/{token}` — invalid or expired tokens soft-fail through
/// the `WebError` mapping; a second confirmation is a visible no-op.
pub async fn confirm(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Response, WebError> {
    let outcome = state.accounts.confirm(&token).await?;
    let (level, text) = match outcome {
        ConfirmOutcome::Confirmed => (
            Level::Success,
            "Your email address is confirmed. You can log in now.",
        ),
        ConfirmOutcome::AlreadyConfirmed => (Level::Info, "This account is already confirmed."),
    };
    Ok(flash_redirect("/login", level, text))
}
