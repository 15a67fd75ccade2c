#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{HeaderValue, Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use talent_api::config::{IntegrationConfig, ServerConfig};
use talent_api::router::build_app_router;
use talent_api::state::AppState;
use talent_api::store::CandidateStore;
use talent_core::onboarding::OnboardingTemplate;
use talent_integration::{ConnectorKeys, MockIntegrationClient, TemplateCatalog};

/// Build a test `ServerConfig` with safe defaults.
///
/// Form edits are applied without delay so tests need not wait on the
/// debounce timer.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec![HeaderValue::from_static("http://localhost:5173")],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        candidates_file: None,
        form_debounce: Duration::ZERO,
        session_idle_timeout: Duration::from_secs(1800),
        session_sweep_interval: Duration::from_secs(60),
        integration: IntegrationConfig {
            api_url: "http://integration.invalid".to_string(),
            token: String::new(),
            connection_key: "adp-workforce".to_string(),
        },
    }
}

/// A router over the bundled candidates and a scripted connector.
pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub mock: Arc<MockIntegrationClient>,
}

/// Build the full application router with all middleware layers.
///
/// Uses the same builder as `main.rs` so integration tests exercise the
/// production middleware stack.
pub fn build_test_app() -> TestApp {
    let config = test_config();
    let mock = Arc::new(MockIntegrationClient::new());
    let catalog = Arc::new(TemplateCatalog::new(
        mock.clone(),
        ConnectorKeys::default(),
    ));
    let candidates = CandidateStore::bundled().expect("bundled candidates parse");
    let state = AppState::new(config.clone(), candidates, catalog);
    let app = build_app_router(state.clone(), &config);

    TestApp { app, state, mock }
}

pub fn templates() -> Vec<OnboardingTemplate> {
    [
        ("standard", "Standard Onboarding"),
        ("remote", "Remote Employee Onboarding"),
        ("executive", "Executive Onboarding"),
    ]
    .into_iter()
    .map(|(id, name)| OnboardingTemplate {
        id: id.into(),
        name: name.into(),
    })
    .collect()
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None).await
}

pub async fn post(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::POST, uri, None).await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, None).await
}

pub async fn send_json(app: Router, method: Method, uri: &str, body: Value) -> Response<Body> {
    send(app, method, uri, Some(body)).await
}

async fn send(app: Router, method: Method, uri: &str, body: Option<Value>) -> Response<Body> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
