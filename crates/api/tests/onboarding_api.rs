//! Integration tests for the onboarding endpoints.
//!
//! Each test scripts `MockIntegrationClient` and drives a session through
//! the HTTP surface. `?wait=true` is used wherever a test needs the
//! background template or schema load to have settled.

mod common;

use axum::http::{Method, StatusCode};
use common::{body_json, delete, get, post, send_json, templates};
use serde_json::{json, Value};
use talent_core::onboarding::FormSchema;
use talent_integration::catalog::{LIST_TEMPLATES_ACTION, ONBOARDING_ACTION};
use talent_integration::mock::MockReply;
use talent_integration::{ConnectorError, MockIntegrationClient};

fn script_happy_path(mock: &MockIntegrationClient) {
    mock.on_list_templates(&templates());
    mock.on_template_schema(
        "standard",
        MockIntegrationClient::schema_reply(&FormSchema(json!({
            "type": "object",
            "required": ["startDate"],
            "properties": { "startDate": { "type": "string" } }
        }))),
    );
}

/// Open a session for `candidate_id` and wait for the template list.
async fn open_session(t: &common::TestApp, candidate_id: &str) -> String {
    let uri = format!("/api/v1/candidates/{candidate_id}/onboarding?wait=true");
    let response = post(t.app.clone(), &uri).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    json["data"]["session_id"].as_str().unwrap().to_string()
}

async fn select(t: &common::TestApp, session: &str, template_id: &str) -> Value {
    let uri = format!("/api/v1/onboarding/sessions/{session}/template?wait=true");
    let response = send_json(
        t.app.clone(),
        Method::POST,
        &uri,
        json!({ "template_id": template_id }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}

async fn fill_form(t: &common::TestApp, session: &str, data: Value) {
    let uri = format!("/api/v1/onboarding/sessions/{session}/form");
    let response = send_json(t.app.clone(), Method::PATCH, &uri, json!({ "data": data })).await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);
}

// ---------------------------------------------------------------------------
// Template catalog
// ---------------------------------------------------------------------------

#[tokio::test]
async fn template_listing_filters_by_name() {
    let t = common::build_test_app();
    t.mock.on_list_templates(&templates());

    let response = get(t.app, "/api/v1/onboarding/templates?q=REMOTE").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let listed = json["data"]["templates"].as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["id"], "remote");
    assert_eq!(json["data"]["is_loading"], false);
    assert!(json["data"]["error"].is_null());
}

#[tokio::test]
async fn template_listing_reports_connector_error_inline() {
    let t = common::build_test_app();
    t.mock.on_action(
        LIST_TEMPLATES_ACTION,
        MockReply::err(ConnectorError::Rejected("Connection not found".into())),
    );

    let response = get(t.app, "/api/v1/onboarding/templates").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["templates"], json!([]));
    assert_eq!(json["data"]["error"], "Connection not found");
}

#[tokio::test]
async fn template_schema_is_returned_as_received() {
    let t = common::build_test_app();
    script_happy_path(&t.mock);

    let response = get(t.app, "/api/v1/onboarding/templates/standard/schema").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["required"], json!(["startDate"]));
}

// ---------------------------------------------------------------------------
// Opening a session
// ---------------------------------------------------------------------------

#[tokio::test]
async fn opening_for_inactive_candidate_is_rejected() {
    let t = common::build_test_app();
    let response = post(t.app, "/api/v1/candidates/4/onboarding").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
    assert!(t.state.sessions.is_empty());
}

#[tokio::test]
async fn opening_for_unknown_candidate_returns_404() {
    let t = common::build_test_app();
    let response = post(t.app, "/api/v1/candidates/999/onboarding").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "Candidate not found");
}

#[tokio::test]
async fn opened_session_starts_in_template_selection() {
    let t = common::build_test_app();
    t.mock.on_list_templates(&templates());

    let response = post(t.app.clone(), "/api/v1/candidates/1/onboarding?wait=true").await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    let state = &json["data"]["state"];
    assert_eq!(json["data"]["candidate_id"], "1");
    assert_eq!(state["open"], true);
    assert_eq!(state["step"], "template_selection");
    assert_eq!(state["templates"]["state"], "loaded");
    assert_eq!(state["filtered_templates"].as_array().unwrap().len(), 3);
    assert_eq!(state["can_submit"], false);
    assert_eq!(t.state.sessions.len(), 1);
}

#[tokio::test]
async fn search_narrows_the_selection_table() {
    let t = common::build_test_app();
    t.mock.on_list_templates(&templates());
    let session = open_session(&t, "1").await;

    let uri = format!("/api/v1/onboarding/sessions/{session}/search");
    let response = send_json(t.app, Method::PUT, &uri, json!({ "query": "exec" })).await;

    let json = body_json(response).await;
    let filtered = json["data"]["state"]["filtered_templates"].as_array().unwrap();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0]["id"], "executive");
}

// ---------------------------------------------------------------------------
// Template selection and form
// ---------------------------------------------------------------------------

#[tokio::test]
async fn selecting_a_template_loads_its_schema() {
    let t = common::build_test_app();
    script_happy_path(&t.mock);
    let session = open_session(&t, "1").await;

    let json = select(&t, &session, "standard").await;
    let state = &json["data"]["state"];

    assert_eq!(state["step"], "form");
    assert_eq!(state["selected_template_id"], "standard");
    assert_eq!(state["is_loading_schema"], false);
    assert_eq!(state["form_schema"]["required"], json!(["startDate"]));
}

#[tokio::test]
async fn schema_failure_returns_to_selection_with_notification() {
    let t = common::build_test_app();
    t.mock.on_list_templates(&templates());
    t.mock.on_template_schema(
        "remote",
        MockReply::err(ConnectorError::Rejected("Template is archived".into())),
    );
    let session = open_session(&t, "1").await;

    let json = select(&t, &session, "remote").await;
    let state = &json["data"]["state"];

    assert_eq!(state["step"], "template_selection");
    assert!(state["selected_template_id"].is_null());
    assert_eq!(state["notification"]["message"], "Template is archived");
}

#[tokio::test]
async fn back_clears_the_form() {
    let t = common::build_test_app();
    script_happy_path(&t.mock);
    let session = open_session(&t, "1").await;
    select(&t, &session, "standard").await;

    let uri = format!("/api/v1/onboarding/sessions/{session}/back");
    let json = body_json(post(t.app, &uri).await).await;
    let state = &json["data"]["state"];

    assert_eq!(state["step"], "template_selection");
    assert!(state["selected_template_id"].is_null());
    assert!(state["form_schema"].is_null());
    assert_eq!(state["form_data"], json!({}));
}

// ---------------------------------------------------------------------------
// Submission
// ---------------------------------------------------------------------------

#[tokio::test]
async fn submit_without_form_data_is_disabled() {
    let t = common::build_test_app();
    script_happy_path(&t.mock);
    let session = open_session(&t, "1").await;
    select(&t, &session, "standard").await;

    let uri = format!("/api/v1/onboarding/sessions/{session}/submit");
    let response = post(t.app, &uri).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "SUBMIT_DISABLED");
    assert_eq!(t.mock.action_count(ONBOARDING_ACTION), 0);
}

#[tokio::test]
async fn successful_submission_closes_the_session() {
    let t = common::build_test_app();
    script_happy_path(&t.mock);
    t.mock
        .on_onboarding(MockReply::ok(json!({ "employeeId": "E-1001" })));
    let session = open_session(&t, "1").await;
    select(&t, &session, "standard").await;
    fill_form(&t, &session, json!({ "startDate": "2024-05-01" })).await;

    let uri = format!("/api/v1/onboarding/sessions/{session}/submit");
    let response = post(t.app.clone(), &uri).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["output"]["employeeId"], "E-1001");
    assert_eq!(json["data"]["state"]["open"], false);

    assert_eq!(
        t.mock.action_inputs(ONBOARDING_ACTION),
        vec![json!({
            "data": { "startDate": "2024-05-01" },
            "onboardingTemplate": "standard"
        })]
    );

    let response = get(t.app, &format!("/api/v1/onboarding/sessions/{session}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(t.state.sessions.is_empty());
}

#[tokio::test]
async fn failed_submission_keeps_the_form_and_notifies() {
    let t = common::build_test_app();
    script_happy_path(&t.mock);
    t.mock.on_onboarding(MockReply::err(ConnectorError::Api {
        status: 503,
        message: "Connector unavailable".into(),
    }));
    let session = open_session(&t, "1").await;
    select(&t, &session, "standard").await;
    fill_form(&t, &session, json!({ "startDate": "2024-05-01" })).await;

    let uri = format!("/api/v1/onboarding/sessions/{session}/submit");
    let response = post(t.app.clone(), &uri).await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let json = body_json(response).await;
    assert_eq!(json["error"], "Connector unavailable");
    assert_eq!(json["code"], "UPSTREAM_ERROR");

    let session_uri = format!("/api/v1/onboarding/sessions/{session}");
    let json = body_json(get(t.app.clone(), &session_uri).await).await;
    let state = &json["data"]["state"];
    assert_eq!(state["open"], true);
    assert_eq!(state["step"], "form");
    assert_eq!(state["is_submitting"], false);
    assert_eq!(state["form_data"]["startDate"], "2024-05-01");
    assert_eq!(state["notification"]["message"], "Connector unavailable");
    assert_eq!(state["can_submit"], true);

    let json = body_json(delete(t.app, &format!("{session_uri}/notification")).await).await;
    assert!(json["data"]["state"]["notification"].is_null());
}

// ---------------------------------------------------------------------------
// Closing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn closing_removes_the_session() {
    let t = common::build_test_app();
    t.mock.on_list_templates(&templates());
    let session = open_session(&t, "3").await;

    let uri = format!("/api/v1/onboarding/sessions/{session}");
    let response = delete(t.app.clone(), &uri).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get(t.app, &uri).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(t.state.sessions.is_empty());
}
