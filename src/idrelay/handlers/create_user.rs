use crate::{
    idrelay::handlers::{
        failure, log_provider_failure, token_response, CookieConfig, ERR_MISSING_PAYLOAD,
        ERR_SOMETHING_WENT_WRONG,
    },
    provider::{Error, ErrorCode, IdentityProvider},
};
use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument};
use utoipa::ToSchema;

pub const ERR_EMAIL_EXISTS: &str = "ERROR: Email already exists";
pub const ERR_INVALID_EMAIL: &str = "ERROR: Invalid email";
pub const ERR_WEAK_PASSWORD: &str = "ERROR: Password is too weak";
pub const ERR_USER_NOT_FOUND: &str = "ERROR: User not found";

#[derive(ToSchema, Serialize, Deserialize)]
pub struct CreateUser {
    email: String,
    password: String,
    #[serde(default)]
    display_name: Option<String>,
}

#[utoipa::path(
    post,
    path= "/create_user",
    request_body = CreateUser,
    responses (
        (status = 200, description = "Account created, the body is the provider session token", body = String, content_type = "text/plain"),
        (status = 400, description = "Missing payload, invalid email or weak password", body = String),
        (status = 404, description = "Account vanished before the profile update", body = String),
        (status = 409, description = "Email already exists", body = String),
        (status = 502, description = "Something went wrong", body = String),
    ),
    tag= "idrelay"
)]
#[instrument(skip(provider, cookies, payload))]
pub async fn create_user(
    provider: Extension<Arc<IdentityProvider>>,
    cookies: Extension<CookieConfig>,
    payload: Option<Json<CreateUser>>,
) -> impl IntoResponse {
    let user: CreateUser = match payload {
        Some(Json(payload)) => payload,
        None => return failure(StatusCode::BAD_REQUEST, ERR_MISSING_PAYLOAD),
    };

    debug!("create user: {}", user.email);

    let mut session = match provider.sign_up(&user.email, &user.password).await {
        Ok(session) => session,
        Err(e) => {
            log_provider_failure("creating user", &e);
            let (status, message) = create_user_failure(&e);
            return failure(status, message);
        }
    };

    // second call: the provider only takes the display name on a profile update
    let display_name = user.display_name.as_deref().map(str::trim).unwrap_or_default();
    if !display_name.is_empty() {
        match provider.update_profile(&session.id_token, display_name).await {
            Ok(Some(refreshed)) => session = refreshed,
            Ok(None) => (),
            Err(e) => {
                log_provider_failure("updating display name", &e);
                let (status, message) = create_user_failure(&e);
                return failure(status, message);
            }
        }
    }

    token_response(cookies.0, &session)
}

/// Map a provider failure to the fixed create-user reply.
#[must_use]
pub fn create_user_failure(err: &Error) -> (StatusCode, &'static str) {
    match err.code() {
        Some(ErrorCode::EmailExists) => (StatusCode::CONFLICT, ERR_EMAIL_EXISTS),
        Some(ErrorCode::InvalidEmail) => (StatusCode::BAD_REQUEST, ERR_INVALID_EMAIL),
        Some(ErrorCode::WeakPassword) => (StatusCode::BAD_REQUEST, ERR_WEAK_PASSWORD),
        Some(ErrorCode::UserNotFound) => (StatusCode::NOT_FOUND, ERR_USER_NOT_FOUND),
        _ => (StatusCode::BAD_GATEWAY, ERR_SOMETHING_WENT_WRONG),
    }
}
