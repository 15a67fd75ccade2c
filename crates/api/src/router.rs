//! HTTP surface of the talent service.
//!
//! [`build_app_router`] is called by the binary and by the integration test
//! harness, so tests exercise the same middleware as production.

use std::time::Duration;

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, Method, StatusCode};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::config::ServerConfig;
use crate::routes;
use crate::state::AppState;

/// Header carrying the per-request correlation id.
const REQUEST_ID: &str = "x-request-id";

/// Methods the onboarding session endpoints need across origins.
const CORS_METHODS: [Method; 5] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::PATCH,
    Method::DELETE,
];

/// Mount the route trees and wrap them in the service middleware.
///
/// `/health` and `/candidates` answer at the root with bare JSON; the
/// template catalog and onboarding sessions live under `/api/v1`.
///
/// Requests pass through, outermost first: CORS, request-id assignment,
/// tracing (so spans carry the id), request-id echo on the response, the
/// `request_timeout_secs` deadline, and panic recovery around the handler.
pub fn build_app_router(state: AppState, config: &ServerConfig) -> Router {
    // Applied innermost first: each `Router::layer` call wraps the previous
    // one, so the last layer added is the outermost.
    Router::new()
        .merge(routes::health::router())
        .merge(routes::candidates::router())
        .nest("/api/v1", routes::api_routes())
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.request_timeout_secs),
        ))
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            REQUEST_ID,
        )))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static(REQUEST_ID),
            MakeRequestUuid,
        ))
        .layer(build_cors_layer(config))
        .with_state(state)
}

/// CORS for the configured dashboard origins.
///
/// Origins are validated when the configuration is loaded.
pub fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(config.cors_origins.clone())
        .allow_methods(CORS_METHODS)
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}
