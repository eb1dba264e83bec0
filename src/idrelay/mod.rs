use crate::provider::IdentityProvider;
use anyhow::Result;
use axum::{
    body::Body,
    extract::Extension,
    http::{HeaderName, HeaderValue, Method, Request},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::PropagateRequestIdLayer,
    set_header::SetRequestHeaderLayer,
    trace::TraceLayer,
};
use tracing::{debug_span, error, info, Span};
use ulid::Ulid;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod handlers;

pub use self::handlers::CookieConfig;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::health,
        handlers::create_user::create_user,
        handlers::login::login,
        handlers::session::root,
        handlers::session::logout,
    ),
    components(schemas(
        handlers::health::Health,
        handlers::create_user::CreateUser,
        handlers::login::Login,
        handlers::session::SessionState,
    )),
    tags(
        (name = "idrelay", description = "Identity provider relay"),
        (name = "health", description = "Service health"),
    )
)]
pub struct ApiDoc;

/// Build the application router with its layers and the injected provider client.
#[must_use]
pub fn router(provider: Arc<IdentityProvider>, cookies: CookieConfig) -> Router {
    let cors = CorsLayer::new()
        // allow `GET` and `POST` when accessing the resource
        .allow_methods([Method::GET, Method::POST])
        // allow requests from any origin
        .allow_origin(Any);

    Router::new()
        .route("/", get(handlers::root))
        .route("/create_user", post(handlers::create_user))
        .route("/login", post(handlers::login))
        .route("/logout", post(handlers::logout))
        .route("/health", get(handlers::health))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(cors)
                .layer(Extension(provider))
                .layer(Extension(cookies)),
        )
}

/// Serve the relay on `port` until Ctrl-C or SIGTERM.
/// # Errors
/// Returns an error if the listener cannot be bound or the server fails
pub async fn new(port: u16, provider: IdentityProvider, cookies: CookieConfig) -> Result<()> {
    let app = router(Arc::new(provider), cookies);

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Gracefully shutdown");
}

// span
fn make_span(request: &Request<Body>) -> Span {
    let headers = request.headers();
    let path = request.uri().path();
    let request_id = headers
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");

    debug_span!("http-request", path, request_id)
}
