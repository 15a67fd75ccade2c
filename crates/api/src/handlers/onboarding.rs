//! Handlers for the onboarding workflow.
//!
//! Template catalog endpoints proxy the HR connector. Session endpoints
//! drive one [`OnboardingModal`](talent_dashboard::OnboardingModal) per
//! open session; every session response carries the modal snapshot.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use talent_core::error::CoreError;
use talent_core::onboarding::{self, FormData, OnboardingTemplate};
use talent_dashboard::{ModalConfig, ModalSnapshot, OnboardingModal};
use talent_integration::CatalogStatus;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::sessions::SessionId;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// `?q=` filter for the template listing.
#[derive(Debug, Deserialize)]
pub struct TemplateQuery {
    #[serde(default)]
    pub q: String,
    /// Drop the cached listing before reading.
    #[serde(default)]
    pub refresh: bool,
}

/// `?wait=true` holds the response until the background load has finished.
#[derive(Debug, Default, Deserialize)]
pub struct WaitParams {
    #[serde(default)]
    pub wait: bool,
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
}

#[derive(Debug, Deserialize)]
pub struct SelectTemplateRequest {
    pub template_id: String,
}

#[derive(Debug, Deserialize)]
pub struct FormChangeRequest {
    pub data: FormData,
}

#[derive(Debug, Serialize)]
pub struct TemplateListing {
    pub templates: Vec<OnboardingTemplate>,
    #[serde(flatten)]
    pub status: CatalogStatus,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: SessionId,
    pub candidate_id: String,
    pub state: ModalSnapshot,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub output: serde_json::Value,
    pub state: ModalSnapshot,
}

fn session_response(id: SessionId, modal: &OnboardingModal) -> SessionResponse {
    SessionResponse {
        session_id: id,
        candidate_id: modal.candidate().id.clone(),
        state: modal.snapshot(),
    }
}

fn find_session(state: &AppState, id: SessionId) -> AppResult<Arc<OnboardingModal>> {
    state.sessions.get(&id).ok_or_else(|| {
        AppError::Core(CoreError::NotFound {
            entity: "Onboarding session",
            id: id.to_string(),
        })
    })
}

async fn join(handle: tokio::task::JoinHandle<()>) -> AppResult<()> {
    handle
        .await
        .map_err(|e| AppError::InternalError(format!("Background load failed: {e}")))
}

// ---------------------------------------------------------------------------
// GET /onboarding/templates
// ---------------------------------------------------------------------------

/// List onboarding templates, optionally filtered by name.
///
/// A connector failure is reported inline in `error` rather than as an
/// error status, mirroring the selection table.
pub async fn list_templates(
    State(state): State<AppState>,
    Query(params): Query<TemplateQuery>,
) -> AppResult<impl IntoResponse> {
    if params.refresh {
        state.catalog.invalidate();
    }

    let templates = match state.catalog.list_templates().await {
        Ok(all) => onboarding::filter_templates(&all, &params.q)
            .into_iter()
            .cloned()
            .collect(),
        Err(_) => Vec::new(),
    };

    Ok(Json(DataResponse {
        data: TemplateListing {
            templates,
            status: state.catalog.status(),
        },
    }))
}

// ---------------------------------------------------------------------------
// GET /onboarding/templates/{id}/schema
// ---------------------------------------------------------------------------

pub async fn get_template_schema(
    State(state): State<AppState>,
    Path(template_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let schema = state.catalog.get_template_schema(&template_id).await?;
    Ok(Json(DataResponse { data: schema }))
}

// ---------------------------------------------------------------------------
// POST /candidates/{id}/onboarding
// ---------------------------------------------------------------------------

/// Open an onboarding session for an active candidate.
pub async fn open_session(
    State(state): State<AppState>,
    Path(candidate_id): Path<String>,
    Query(wait): Query<WaitParams>,
) -> AppResult<impl IntoResponse> {
    let candidate = state
        .candidates
        .get(&candidate_id)
        .cloned()
        .ok_or(CoreError::NotFound {
            entity: "Candidate",
            id: candidate_id,
        })?;
    candidate.ensure_hireable()?;

    let opened = state.sessions.open(
        candidate,
        Arc::clone(&state.catalog),
        ModalConfig {
            form_debounce: state.config.form_debounce,
        },
    );
    if wait.wait {
        join(opened.templates_loaded).await?;
    }

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: session_response(opened.id, &opened.modal),
        }),
    ))
}

// ---------------------------------------------------------------------------
// GET /onboarding/sessions/{id}
// ---------------------------------------------------------------------------

pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> AppResult<impl IntoResponse> {
    let modal = find_session(&state, id)?;
    Ok(Json(DataResponse {
        data: session_response(id, &modal),
    }))
}

// ---------------------------------------------------------------------------
// PUT /onboarding/sessions/{id}/search
// ---------------------------------------------------------------------------

pub async fn set_search(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
    Json(input): Json<SearchRequest>,
) -> AppResult<impl IntoResponse> {
    let modal = find_session(&state, id)?;
    modal.set_search_query(input.query);
    Ok(Json(DataResponse {
        data: session_response(id, &modal),
    }))
}

// ---------------------------------------------------------------------------
// POST /onboarding/sessions/{id}/template
// ---------------------------------------------------------------------------

/// Select a template. Responds in the form step straight away unless
/// `?wait=true` asks to hold until the schema fetch has settled.
pub async fn select_template(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
    Query(wait): Query<WaitParams>,
    Json(input): Json<SelectTemplateRequest>,
) -> AppResult<impl IntoResponse> {
    if input.template_id.trim().is_empty() {
        return Err(AppError::BadRequest("template_id must not be empty".into()));
    }

    let modal = find_session(&state, id)?;
    let schema_load = modal.select_template(&input.template_id)?;
    if wait.wait {
        join(schema_load).await?;
    }

    Ok(Json(DataResponse {
        data: session_response(id, &modal),
    }))
}

// ---------------------------------------------------------------------------
// PATCH /onboarding/sessions/{id}/form
// ---------------------------------------------------------------------------

/// Report the current form values. Applied after the debounce delay.
pub async fn update_form(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
    Json(input): Json<FormChangeRequest>,
) -> AppResult<impl IntoResponse> {
    let modal = find_session(&state, id)?;
    modal.on_form_change(input.data);
    Ok((
        StatusCode::ACCEPTED,
        Json(DataResponse {
            data: session_response(id, &modal),
        }),
    ))
}

// ---------------------------------------------------------------------------
// POST /onboarding/sessions/{id}/back
// ---------------------------------------------------------------------------

pub async fn go_back(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> AppResult<impl IntoResponse> {
    let modal = find_session(&state, id)?;
    modal.back();
    Ok(Json(DataResponse {
        data: session_response(id, &modal),
    }))
}

// ---------------------------------------------------------------------------
// POST /onboarding/sessions/{id}/submit
// ---------------------------------------------------------------------------

/// Submit the form. On success the session is closed and removed.
pub async fn submit(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> AppResult<impl IntoResponse> {
    let modal = find_session(&state, id)?;
    let output = modal.submit().await?;

    tracing::info!(session_id = %id, "Onboarding submitted");

    Ok(Json(DataResponse {
        data: SubmitResponse {
            output,
            state: modal.snapshot(),
        },
    }))
}

// ---------------------------------------------------------------------------
// DELETE /onboarding/sessions/{id}/notification
// ---------------------------------------------------------------------------

pub async fn dismiss_notification(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> AppResult<impl IntoResponse> {
    let modal = find_session(&state, id)?;
    modal.dismiss_notification();
    Ok(Json(DataResponse {
        data: session_response(id, &modal),
    }))
}

// ---------------------------------------------------------------------------
// DELETE /onboarding/sessions/{id}
// ---------------------------------------------------------------------------

pub async fn close_session(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> AppResult<impl IntoResponse> {
    let modal = find_session(&state, id)?;
    modal.close();
    Ok(StatusCode::NO_CONTENT)
}
