//! Candidate directory routes.
//!
//! Mounted at the root (not under `/api/v1`) by `build_app_router()`.

use axum::routing::get;
use axum::Router;

use crate::handlers::candidates;
use crate::state::AppState;

/// Candidate routes.
///
/// ```text
/// GET    /candidates         -> list_candidates (?status=)
/// GET    /candidates/{id}    -> get_candidate
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/candidates", get(candidates::list_candidates))
        .route("/candidates/{id}", get(candidates::get_candidate))
}
