//! Session probe and logout, both driven by the `token` cookie.
//!
//! The cookie holds the provider's `idToken` as-is. Nothing is stored here:
//! the probe asks the provider about the token on every request and logout only
//! tells the browser to forget it.

use crate::provider::{Account, IdentityProvider};
use axum::{
    extract::Extension,
    http::{
        header::{InvalidHeaderValue, COOKIE, SET_COOKIE},
        HeaderMap, HeaderValue, StatusCode,
    },
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, instrument};
use utoipa::ToSchema;

pub const SESSION_COOKIE_NAME: &str = "token";

const NOT_LOGGED_IN: &str = "You are not logged in";

/// Attributes for the session cookie.
#[derive(Debug, Clone, Copy, Default)]
pub struct CookieConfig {
    /// Only mark cookies `Secure` when the service is reached over HTTPS.
    pub secure: bool,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct SessionState {
    pub logged_in: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SessionState {
    #[must_use]
    pub fn anonymous() -> Self {
        Self {
            logged_in: false,
            display_name: None,
            email: None,
            error: Some(NOT_LOGGED_IN.to_string()),
        }
    }

    #[must_use]
    pub fn active(account: Account) -> Self {
        Self {
            logged_in: true,
            display_name: account.display_name,
            email: account.email,
            error: None,
        }
    }
}

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Session state for the `token` cookie", body = SessionState)
    ),
    tag = "idrelay"
)]
#[instrument(skip(headers, provider))]
pub async fn root(headers: HeaderMap, provider: Extension<Arc<IdentityProvider>>) -> impl IntoResponse {
    // Missing cookies are "no session"; the provider is not asked.
    let Some(token) = extract_session_token(&headers) else {
        return Json(SessionState::anonymous());
    };

    match provider.lookup(&token).await {
        Ok(Some(account)) => Json(SessionState::active(account)),
        Ok(None) => {
            debug!("Provider knows no account for the session token");
            Json(SessionState::anonymous())
        }
        Err(e) => {
            // expired or malformed tokens land here too
            debug!("Session lookup failed: {}", e);
            Json(SessionState::anonymous())
        }
    }
}

#[utoipa::path(
    post,
    path = "/logout",
    responses(
        (status = 204, description = "Session cookie cleared")
    ),
    tag = "idrelay"
)]
pub async fn logout(cookies: Extension<CookieConfig>) -> impl IntoResponse {
    // The provider holds no revocable state for us; forgetting the cookie is all there is.
    let mut headers = HeaderMap::new();
    match clear_session_cookie(cookies.0) {
        Ok(cookie) => {
            headers.insert(SET_COOKIE, cookie);
        }
        Err(e) => error!("Failed to build session cookie: {}", e),
    }

    (StatusCode::NO_CONTENT, headers)
}

/// Build an `HttpOnly` cookie carrying the provider token.
pub(super) fn session_cookie(
    config: CookieConfig,
    token: &str,
    max_age: u64,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie =
        format!("{SESSION_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}");
    if config.secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

fn clear_session_cookie(config: CookieConfig) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!("{SESSION_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    if config.secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

pub(super) fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    for header in headers.get_all(COOKIE) {
        let Ok(value) = header.to_str() else {
            continue;
        };
        for pair in value.split(';') {
            let Some((key, val)) = pair.trim().split_once('=') else {
                continue;
            };
            let val = val.trim();
            if key.trim() == SESSION_COOKIE_NAME && !val.is_empty() {
                return Some(val.to_string());
            }
        }
    }
    None
}
