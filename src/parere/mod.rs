#![allow(clippy::needless_for_each)]

use crate::{
    auth::{
        email::{LogNotifier, Notifier, SmtpNotifier},
        otp::OtpEngine,
        service::AuthService,
        store::PgUserStore,
        token::TokenIssuer,
    },
    cli::globals::GlobalArgs,
};
use anyhow::{Context, Result};
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderName, HeaderValue, Method, Request,
    },
    routing::{get, post},
    Extension, Router,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::PropagateRequestIdLayer,
    set_header::SetRequestHeaderLayer,
    trace::TraceLayer,
};
use tracing::{error, info, info_span, Span};
use ulid::Ulid;
use utoipa::OpenApi;

pub(crate) mod handlers;

use self::handlers::{
    health, health::__path_health, two_factor, two_factor::__path_disable_two_factor,
    two_factor::__path_enable_two_factor, two_factor::__path_qr_code, user_login,
    user_login::__path_login, user_signup, user_signup::__path_signup,
};

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

/// The concrete auth service wired into the router.
pub type Service = AuthService<PgUserStore>;

#[derive(OpenApi)]
#[openapi(
    paths(health, signup, login, enable_two_factor, disable_two_factor, qr_code),
    components(schemas(
        health::Health,
        handlers::SessionResponse,
        user_signup::UserSignup,
        user_login::UserLogin,
        two_factor::EnableTwoFactor,
        two_factor::EnableTwoFactorResponse,
        two_factor::DisableTwoFactor,
        two_factor::QrCodeRequest,
    )),
    tags(
        (name = "parere", description = "Accounts and two-factor authentication API")
    )
)]
struct ApiDoc;

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

/// Start the server
/// # Errors
/// Return error if failed to start the server
pub async fn new(port: u16, dsn: String, globals: &GlobalArgs) -> Result<()> {
    // Connect to database
    let pool = PgPoolOptions::new()
        .min_connections(1)
        .max_connections(5)
        .max_lifetime(Duration::from_secs(60 * 2))
        .test_before_acquire(true)
        .connect(&dsn)
        .await
        .context("Failed to connect to database")?;

    let notifier: Arc<dyn Notifier> = match globals.smtp.as_ref() {
        Some(smtp) => Arc::new(SmtpNotifier::new(
            &smtp.relay,
            smtp.username.clone(),
            &smtp.password,
            &smtp.from,
        )?),
        None => {
            info!("SMTP not configured, 2FA emails will only be logged");
            Arc::new(LogNotifier)
        }
    };

    let service = AuthService::new(
        PgUserStore::new(pool.clone()),
        TokenIssuer::new(&globals.jwt_secret),
        OtpEngine::new(globals.otp_issuer.clone()),
        notifier,
    );

    let cors = CorsLayer::new()
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_methods([Method::GET, Method::POST])
        .allow_origin(Any);

    let app = Router::new()
        .route("/", get(|| async { "💬" }))
        .route("/users/signup", post(handlers::signup))
        .route("/users/login", post(handlers::login))
        .route("/users/enable-2fa", post(handlers::enable_two_factor))
        .route("/users/disable-2fa", post(handlers::disable_two_factor))
        .route("/users/qr-code", post(handlers::qr_code))
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
                .layer(Extension(service)),
        )
        .route("/health", get(handlers::health).options(handlers::health));

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("Failed to install shutdown handler: {err}");
        return;
    }

    info!("Gracefully shutdown");
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}
