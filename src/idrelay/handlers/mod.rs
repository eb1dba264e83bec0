pub mod create_user;
pub use self::create_user::create_user;

pub mod health;
pub use self::health::health;

pub mod login;
pub use self::login::login;

pub mod session;
pub use self::session::{logout, root, CookieConfig};


// common functions for the handlers
use crate::provider::{Error, Session};
use axum::{
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::{debug, error, Level};

pub const ERR_SOMETHING_WENT_WRONG: &str = "ERROR: Something went wrong";
pub const ERR_MISSING_PAYLOAD: &str = "ERROR: Missing payload";

// provider default when `expiresIn` is missing
const DEFAULT_SESSION_TTL_SECONDS: u64 = 3600;

/// Reply with the provider token as the body and mirror it into the session cookie.
fn token_response(cookies: CookieConfig, session: &Session) -> Response {
    let max_age = session
        .expires_in_seconds()
        .unwrap_or(DEFAULT_SESSION_TTL_SECONDS);

    let mut headers = HeaderMap::new();
    match session::session_cookie(cookies, &session.id_token, max_age) {
        Ok(cookie) => {
            headers.insert(SET_COOKIE, cookie);
        }
        Err(e) => error!("Failed to build session cookie: {}", e),
    }

    (StatusCode::OK, headers, session.id_token.clone()).into_response()
}

fn failure(status: StatusCode, message: &'static str) -> Response {
    (status, message.to_string()).into_response()
}

// Provider rejections are user outcomes (wrong password, taken email); only
// transport and protocol failures are errors.
const fn provider_failure_level(err: &Error) -> Level {
    match err {
        Error::Rejected(_) => Level::DEBUG,
        _ => Level::ERROR,
    }
}

fn log_provider_failure(action: &str, err: &Error) {
    if provider_failure_level(err) == Level::ERROR {
        error!("Error {}: {}", action, err);
    } else {
        debug!("{} rejected by provider: {}", action, err);
    }
}
