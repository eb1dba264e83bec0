use anyhow::{Context, Result};
use axum::{
    body::{to_bytes, Body},
    http::{
        header::{CONTENT_TYPE, COOKIE, SET_COOKIE},
        Request, StatusCode,
    },
};
use idrelay::{
    idrelay::{router, CookieConfig},
    provider::{IdentityProvider, ProviderConfig},
};
use secrecy::SecretString;
use serde_json::{json, Value};
use std::{net::TcpListener, sync::Arc, time::Duration};
use tower::ServiceExt;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API_KEY: &str = "AIza-integration";

fn can_bind_localhost() -> bool {
    TcpListener::bind("127.0.0.1:0").is_ok()
}

// The cookie pair (`token=...`) from a Set-Cookie header.
fn cookie_pair(set_cookie: &str) -> Option<String> {
    set_cookie.split(';').next().map(|pair| pair.trim().to_string())
}

#[tokio::test]
async fn register_probe_login_logout() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/accounts:signUp"))
        .and(query_param("key", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "idToken": "signup-token",
            "expiresIn": "3600",
            "localId": "uid-1"
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/accounts:update"))
        .and(query_param("key", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "idToken": "profile-token",
            "expiresIn": "3600",
            "displayName": "Ada"
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/accounts:signInWithPassword"))
        .and(query_param("key", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "idToken": "login-token",
            "expiresIn": "3600"
        })))
        .mount(&server)
        .await;

    for token in ["profile-token", "login-token"] {
        Mock::given(method("POST"))
            .and(path("/v1/accounts:lookup"))
            .and(body_json(json!({ "idToken": token })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "users": [{
                    "localId": "uid-1",
                    "email": "ada@example.com",
                    "displayName": "Ada"
                }]
            })))
            .mount(&server)
            .await;
    }

    let config = ProviderConfig::new(SecretString::from(API_KEY.to_string()));
    let provider = IdentityProvider::new(&server.uri(), config, Duration::from_secs(5))?;
    let app = router(Arc::new(provider), CookieConfig { secure: true });

    // register
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/create_user")
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({
                        "email": "ada@example.com",
                        "password": "correct horse",
                        "display_name": "Ada"
                    })
                    .to_string(),
                ))?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let set_cookie = response
        .headers()
        .get(SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .context("create_user should set the session cookie")?
        .to_string();
    assert!(set_cookie.ends_with("; Secure"));
    let cookie = cookie_pair(&set_cookie).context("malformed Set-Cookie")?;
    assert_eq!(cookie, "token=profile-token");
    let body = to_bytes(response.into_body(), usize::MAX).await?;
    assert_eq!(&body[..], b"profile-token");

    // probe with the cookie the relay just handed out
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/")
                .header(COOKIE, &cookie)
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await?;
    let state: Value = serde_json::from_slice(&body)?;
    assert_eq!(state["logged_in"], json!(true));
    assert_eq!(state["display_name"], json!("Ada"));

    // sign in again
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/login")
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({ "email": "ada@example.com", "password": "correct horse" })
                        .to_string(),
                ))?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await?;
    assert_eq!(&body[..], b"login-token");

    // logout only clears the cookie
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/logout")
                .header(COOKIE, "token=login-token")
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let cleared = response
        .headers()
        .get(SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .context("logout should clear the session cookie")?;
    assert!(cleared.starts_with("token=;"));
    assert!(cleared.contains("Max-Age=0"));

    // after logout the browser sends no cookie
    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty())?)
        .await?;
    let body = to_bytes(response.into_body(), usize::MAX).await?;
    let state: Value = serde_json::from_slice(&body)?;
    assert_eq!(state["logged_in"], json!(false));

    Ok(())
}

#[tokio::test]
async fn openapi_document_is_served() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;
    let config = ProviderConfig::new(SecretString::from(API_KEY.to_string()));
    let provider = IdentityProvider::new(&server.uri(), config, Duration::from_secs(5))?;
    let app = router(Arc::new(provider), CookieConfig::default());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api-docs/openapi.json")
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await?;
    let doc: Value = serde_json::from_slice(&body)?;
    assert!(doc["paths"]["/create_user"]["post"].is_object());
    assert!(doc["paths"]["/login"]["post"].is_object());

    Ok(())
}
