//! Handlers for the candidate directory.
//!
//! `/candidates` returns bare JSON (array or object); the directory table
//! view under `/api/v1` uses the `{ "data": ... }` envelope.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use talent_core::candidate::{Candidate, CandidateStatus};
use talent_core::error::CoreError;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// GET /candidates
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CandidateListParams {
    /// Only candidates with this status (`active`, `inactive`, `pending`).
    pub status: Option<String>,
}

/// List candidates, optionally filtered by status.
pub async fn list_candidates(
    State(state): State<AppState>,
    Query(params): Query<CandidateListParams>,
) -> AppResult<impl IntoResponse> {
    let status = params
        .status
        .as_deref()
        .map(CandidateStatus::parse)
        .transpose()?;

    let candidates: Vec<Candidate> = state
        .candidates
        .list()
        .iter()
        .filter(|c| status.is_none_or(|s| c.status == s))
        .cloned()
        .collect();

    Ok(Json(candidates))
}

// ---------------------------------------------------------------------------
// GET /candidates/{id}
// ---------------------------------------------------------------------------

/// Get a single candidate, or 404 `Candidate not found`.
pub async fn get_candidate(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let candidate = state
        .candidates
        .get(&id)
        .cloned()
        .ok_or(CoreError::NotFound {
            entity: "Candidate",
            id,
        })?;

    Ok(Json(candidate))
}

// ---------------------------------------------------------------------------
// GET /api/v1/directory
// ---------------------------------------------------------------------------

/// Rendered directory rows (status badge, formatted cells, hire action).
pub async fn get_directory(State(state): State<AppState>) -> impl IntoResponse {
    let view = state.directory.load().await;
    Json(DataResponse { data: view })
}
