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

pub const ERR_INVALID_PASSWORD: &str = "ERROR: Invalid password";
pub const ERR_EMAIL_NOT_FOUND: &str = "ERROR: Email not found";

#[derive(ToSchema, Serialize, Deserialize)]
pub struct Login {
    email: String,
    password: String,
}

#[utoipa::path(
    post,
    path= "/login",
    request_body = Login,
    responses (
        (status = 200, description = "Signed in, the body is the provider session token", body = String, content_type = "text/plain"),
        (status = 400, description = "Missing payload", body = String),
        (status = 401, description = "Invalid password", body = String),
        (status = 404, description = "Email not found", body = String),
        (status = 502, description = "Something went wrong", body = String),
    ),
    tag= "idrelay"
)]
#[instrument(skip(provider, cookies, payload))]
pub async fn login(
    provider: Extension<Arc<IdentityProvider>>,
    cookies: Extension<CookieConfig>,
    payload: Option<Json<Login>>,
) -> impl IntoResponse {
    let login: Login = match payload {
        Some(Json(payload)) => payload,
        None => return failure(StatusCode::BAD_REQUEST, ERR_MISSING_PAYLOAD),
    };

    debug!("login: {}", login.email);

    match provider
        .sign_in_with_password(&login.email, &login.password)
        .await
    {
        Ok(session) => token_response(cookies.0, &session),
        Err(e) => {
            log_provider_failure("signing in", &e);
            let (status, message) = login_failure(&e);
            failure(status, message)
        }
    }
}

/// Map a provider failure to the fixed login reply.
#[must_use]
pub fn login_failure(err: &Error) -> (StatusCode, &'static str) {
    match err.code() {
        Some(ErrorCode::InvalidPassword) => (StatusCode::UNAUTHORIZED, ERR_INVALID_PASSWORD),
        Some(ErrorCode::EmailNotFound) => (StatusCode::NOT_FOUND, ERR_EMAIL_NOT_FOUND),
        _ => (StatusCode::BAD_GATEWAY, ERR_SOMETHING_WENT_WRONG),
    }
}
