//! Flash messages: one-shot notifications carried in their own cookie,
//! rendered by the base template and cleared on display. The value is
//! base64url-encoded JSON; it is not signed, because nothing trusts it
//! beyond showing text back to the same browser that sent it.

use std::fmt;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

pub const FLASH_COOKIE: &str = "dishboard_flash";

/// Alert category; the template turns it into a Bootstrap alert class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Info,
    Warning,
    Danger,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Level::Success => "success",
            Level::Info => "info",
            Level::Warning => "warning",
            Level::Danger => "danger",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub level: Level,
    pub text: String,
}

impl FlashMessage {
    pub fn new(level: Level, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
        }
    }
}

/// Cookie value encoding a batch of messages.
pub fn encode(messages: &[FlashMessage]) -> String {
    let json = serde_json::to_vec(messages).unwrap_or_default();
    URL_SAFE_NO_PAD.encode(json)
}

/// Decode a cookie value; garbage means "no messages".
pub fn decode(value: &str) -> Vec<FlashMessage> {
    URL_SAFE_NO_PAD
        .decode(value)
        .ok()
        .and_then(|json| serde_json::from_slice(&json).ok())
        .unwrap_or_default()
}

#[cfg(feature = "web-axum")]
pub use web::{clear_cookie, cookie_value, from_headers, set_cookie};

#[cfg(feature = "web-axum")]
mod web {
    use axum::http::header::COOKIE;
    use axum::http::{HeaderMap, HeaderValue};

    use super::*;

    /// `Set-Cookie` header value storing `messages` for the next page
    /// view.
    pub fn set_cookie(messages: &[FlashMessage]) -> HeaderValue {
        let value = format!(
            "{FLASH_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax",
            encode(messages)
        );
        HeaderValue::from_str(&value).expect("flash cookie is ascii")
    }

    /// `Set-Cookie` header value that clears the flash cookie.
    pub fn clear_cookie() -> HeaderValue {
        HeaderValue::from_static("dishboard_flash=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
    }

    /// Messages carried by the incoming request, if any.
    pub fn from_headers(headers: &HeaderMap) -> Vec<FlashMessage> {
        cookie_value(headers, FLASH_COOKIE)
            .map(|value| decode(&value))
            .unwrap_or_default()
    }

    /// Find one cookie in the `Cookie` request header.
    pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
        let raw = headers.get(COOKIE)?.to_str().ok()?;
        raw.split(';').find_map(|pair| {
            let (key, value) = pair.trim().split_once('=')?;
            (key == name).then(|| value.to_owned())
        })
    }
}
