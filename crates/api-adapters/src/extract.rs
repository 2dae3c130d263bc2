//! Request extractors: the authenticated principal with its derived
//! capability set, the anonymous-friendly variant, and the admin guard.
//! Derivation happens here, once per guarded request, straight from the
//! stores; there is no cached capability state anywhere.

use axum::extract::FromRequestParts;
use axum::http::header::SET_COOKIE;
use axum::http::request::Parts;
use axum::http::HeaderValue;
use axum::response::{IntoResponse, Redirect, Response};

use domains::authz::Identity;
use domains::error::DomainError;
use domains::ports::SessionTicket;
use services::authz::{admin_permission, derive_capabilities};

use crate::error::WebError;
use crate::flash::{self, FlashMessage, Level};
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "dishboard_session";

/// The authenticated principal. Rejects to a login redirect that
/// preserves the originally requested path in `?next=`.
pub struct Principal(pub Identity);

/// Like [`Principal`], but anonymous requests pass through as `None`.
pub struct MaybePrincipal(pub Option<Identity>);

/// A principal holding the admin role; everyone else gets the 403 view.
pub struct AdminPrincipal(pub Identity);

/// Pending flash messages from the incoming request.
pub struct IncomingFlash(pub Vec<FlashMessage>);

async fn identity_from_parts(
    parts: &Parts,
    state: &AppState,
) -> Result<Option<Identity>, WebError> {
    let Some(cookie) = flash::cookie_value(&parts.headers, SESSION_COOKIE) else {
        return Ok(None);
    };
    let Some(email) = state.sessions.resolve(&cookie) else {
        return Ok(None);
    };
    // A valid signature over a since-deleted account is still anonymous.
    let Some(user) = state.accounts.find_by_email(&email).await? else {
        return Ok(None);
    };
    let provides = derive_capabilities(&user, state.post_store.as_ref()).await?;
    Ok(Some(Identity { user, provides }))
}

fn login_redirect(parts: &Parts) -> Response {
    let next = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let target = format!("/login?next={}", urlencode(next));
    let mut response = Redirect::to(&target).into_response();
    response.headers_mut().append(
        SET_COOKIE,
        flash::set_cookie(&[FlashMessage::new(
            Level::Warning,
            "Please log in to access this page.",
        )]),
    );
    response
}

/// Minimal percent-encoding for the `next` parameter. Path characters
/// stay readable; everything reserved is escaped.
fn urlencode(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'/' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

/// `Set-Cookie` value installing a fresh session.
pub fn session_cookie(ticket: &SessionTicket) -> HeaderValue {
    let mut cookie = format!(
        "{SESSION_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax",
        ticket.value
    );
    if let Some(max_age) = ticket.max_age {
        cookie.push_str(&format!("; Max-Age={}", max_age.as_secs()));
    }
    HeaderValue::from_str(&cookie).expect("session cookie is ascii")
}

/// `Set-Cookie` value clearing the session.
pub fn clear_session_cookie() -> HeaderValue {
    HeaderValue::from_static("dishboard_session=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

impl FromRequestParts<AppState> for MaybePrincipal {
    type Rejection = WebError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(MaybePrincipal(identity_from_parts(parts, state).await?))
    }
}

impl FromRequestParts<AppState> for Principal {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match identity_from_parts(parts, state).await {
            Ok(Some(identity)) => Ok(Principal(identity)),
            Ok(None) => Err(login_redirect(parts)),
            Err(err) => Err(err.into_response()),
        }
    }
}

impl FromRequestParts<AppState> for AdminPrincipal {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Principal(identity) =
            <Principal as FromRequestParts<AppState>>::from_request_parts(parts, state).await?;
        if !identity.can(&admin_permission()) {
            return Err(WebError::Domain(DomainError::Forbidden(
                "This area requires administrator privileges.".to_owned(),
            ))
            .into_response());
        }
        Ok(AdminPrincipal(identity))
    }
}

impl<S> FromRequestParts<S> for IncomingFlash
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(IncomingFlash(flash::from_headers(&parts.headers)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_parameter_keeps_paths_readable() {
        assert_eq!(urlencode("/blog/create"), "/blog/create");
        assert_eq!(urlencode("/a b?x=1"), "/a%20b%3Fx%3D1");
    }

    #[test]
    fn session_cookie_carries_max_age_only_when_remembered() {
        let remembered = SessionTicket {
            value: "tok".to_owned(),
            max_age: Some(std::time::Duration::from_secs(60)),
        };
        let transient = SessionTicket {
            value: "tok".to_owned(),
            max_age: None,
        };
        assert!(session_cookie(&remembered)
            .to_str()
            .unwrap()
            .contains("Max-Age=60"));
        assert!(!session_cookie(&transient)
            .to_str()
            .unwrap()
            .contains("Max-Age"));
    }
}
