//! `HttpIntegrationClient` against a stub platform served on a local port.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use assert_matches::assert_matches;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use talent_integration::catalog::{ONBOARDING_ACTION, SCHEMA_COLLECTION, TEMPLATE_CODE_PARAM};
use talent_integration::{ConnectorError, HttpIntegrationClient, IntegrationClient};

/// One request as seen by the stub platform.
#[derive(Debug, Clone)]
struct Seen {
    path: String,
    authorization: Option<String>,
    parameters: Option<String>,
    body: Value,
}

#[derive(Clone, Default)]
struct Platform {
    seen: Arc<Mutex<Vec<Seen>>>,
}

impl Platform {
    fn record(&self, path: String, headers: &HeaderMap, parameters: Option<String>, body: &[u8]) {
        self.seen.lock().unwrap().push(Seen {
            path,
            authorization: headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
            parameters,
            body: serde_json::from_slice(body).unwrap_or(Value::Null),
        });
    }

    fn seen(&self) -> Vec<Seen> {
        self.seen.lock().unwrap().clone()
    }
}

async fn run_action(
    State(platform): State<Platform>,
    Path((connection, action)): Path<(String, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    platform.record(
        format!("/connections/{connection}/actions/{action}/run"),
        &headers,
        None,
        &body,
    );
    match action.as_str() {
        "broken" => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "message": "Connector unavailable" })),
        ),
        _ => (
            StatusCode::OK,
            Json(json!({ "output": { "employeeId": "E-1001" }, "logs": [] })),
        ),
    }
}

async fn data_collection(
    State(platform): State<Platform>,
    Path((connection, collection)): Path<(String, String)>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    platform.record(
        format!("/connections/{connection}/data/{collection}"),
        &headers,
        query.get("parameters").cloned(),
        &[],
    );
    (
        StatusCode::OK,
        Json(json!({ "fieldsSchema": { "required": ["startDate"] } })),
    )
}

/// Serve the stub on an ephemeral port and return its base URL.
async fn serve_platform() -> (String, Platform) {
    let platform = Platform::default();
    let app = Router::new()
        .route(
            "/connections/{connection}/actions/{action}/run",
            post(run_action),
        )
        .route(
            "/connections/{connection}/data/{collection}",
            get(data_collection),
        )
        .with_state(platform.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}/"), platform)
}

// ---------------------------------------------------------------------------
// run_action
// ---------------------------------------------------------------------------

#[tokio::test]
async fn run_action_posts_input_and_returns_output() {
    let (base, platform) = serve_platform().await;
    let client = HttpIntegrationClient::new(base, "secret-token");

    let input = json!({ "data": { "startDate": "2024-05-01" }, "onboardingTemplate": "standard" });
    let output = client
        .run_action("adp-workforce", ONBOARDING_ACTION, input.clone())
        .await
        .unwrap();

    assert_eq!(output, json!({ "employeeId": "E-1001" }));

    let seen = platform.seen();
    assert_eq!(seen.len(), 1);
    assert_eq!(
        seen[0].path,
        "/connections/adp-workforce/actions/onboard-candidate/run"
    );
    assert_eq!(seen[0].authorization.as_deref(), Some("Bearer secret-token"));
    assert_eq!(seen[0].body, input);
}

#[tokio::test]
async fn non_success_status_maps_to_api_error() {
    let (base, _platform) = serve_platform().await;
    let client = HttpIntegrationClient::new(base, "secret-token");

    let err = client
        .run_action("adp-workforce", "broken", json!({}))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        ConnectorError::Api {
            status: 503,
            message: "Connector unavailable".into(),
        }
    );
    assert_eq!(err.user_message(), "Connector unavailable");
}

#[tokio::test]
async fn empty_token_sends_no_authorization() {
    let (base, platform) = serve_platform().await;
    let client = HttpIntegrationClient::new(base, "");

    client
        .run_action("adp-workforce", ONBOARDING_ACTION, json!({}))
        .await
        .unwrap();

    assert!(platform.seen()[0].authorization.is_none());
}

#[tokio::test]
async fn unreachable_platform_is_a_request_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = HttpIntegrationClient::new(format!("http://{addr}"), "");
    let err = client
        .run_action("adp-workforce", ONBOARDING_ACTION, json!({}))
        .await
        .unwrap_err();

    assert_matches!(err, ConnectorError::Request(_));
}

// ---------------------------------------------------------------------------
// get_data_collection
// ---------------------------------------------------------------------------

#[tokio::test]
async fn data_collection_encodes_parameters_as_json_query() {
    let (base, platform) = serve_platform().await;
    let client = HttpIntegrationClient::new(base, "secret-token");

    let parameters = json!({ TEMPLATE_CODE_PARAM: "standard" });
    let spec = client
        .get_data_collection("adp-workforce", SCHEMA_COLLECTION, parameters.clone())
        .await
        .unwrap();

    assert_eq!(spec["fieldsSchema"]["required"], json!(["startDate"]));

    let seen = platform.seen();
    assert_eq!(
        seen[0].path,
        "/connections/adp-workforce/data/application-onboard"
    );
    assert_eq!(seen[0].authorization.as_deref(), Some("Bearer secret-token"));
    let sent: Value = serde_json::from_str(seen[0].parameters.as_deref().unwrap()).unwrap();
    assert_eq!(sent, parameters);
}
