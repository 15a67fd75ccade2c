//! Route definitions for candidate onboarding.
//!
//! Mounted at `/onboarding` by `api_routes()`, except the session-opening
//! route which hangs off the candidate resource.

use axum::routing::{delete, get, patch, post, put};
use axum::Router;

use crate::handlers::onboarding;
use crate::state::AppState;

/// Onboarding routes.
///
/// ```text
/// GET    /templates                         -> list_templates
/// GET    /templates/{id}/schema             -> get_template_schema
/// GET    /sessions/{id}                     -> get_session
/// DELETE /sessions/{id}                     -> close_session
/// PUT    /sessions/{id}/search              -> set_search
/// POST   /sessions/{id}/template            -> select_template
/// PATCH  /sessions/{id}/form                -> update_form
/// POST   /sessions/{id}/back                -> go_back
/// POST   /sessions/{id}/submit              -> submit
/// DELETE /sessions/{id}/notification        -> dismiss_notification
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/templates", get(onboarding::list_templates))
        .route(
            "/templates/{id}/schema",
            get(onboarding::get_template_schema),
        )
        .route(
            "/sessions/{id}",
            get(onboarding::get_session).delete(onboarding::close_session),
        )
        .route("/sessions/{id}/search", put(onboarding::set_search))
        .route("/sessions/{id}/template", post(onboarding::select_template))
        .route("/sessions/{id}/form", patch(onboarding::update_form))
        .route("/sessions/{id}/back", post(onboarding::go_back))
        .route("/sessions/{id}/submit", post(onboarding::submit))
        .route(
            "/sessions/{id}/notification",
            delete(onboarding::dismiss_notification),
        )
}

/// ```text
/// POST   /candidates/{id}/onboarding        -> open_session
/// ```
pub fn candidate_router() -> Router<AppState> {
    Router::new().route("/candidates/{id}/onboarding", post(onboarding::open_session))
}
