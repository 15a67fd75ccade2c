pub mod candidates;
pub mod health;
pub mod onboarding;

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /directory                                       rendered candidate table
///
/// /candidates/{id}/onboarding                      open session (POST)
///
/// /onboarding/templates                            list templates (?q=, ?refresh=)
/// /onboarding/templates/{id}/schema                template form schema
///
/// /onboarding/sessions/{id}                        get, close (DELETE)
/// /onboarding/sessions/{id}/search                 set search query (PUT)
/// /onboarding/sessions/{id}/template               select template (POST)
/// /onboarding/sessions/{id}/form                   report form values (PATCH)
/// /onboarding/sessions/{id}/back                   back to selection (POST)
/// /onboarding/sessions/{id}/submit                 submit onboarding (POST)
/// /onboarding/sessions/{id}/notification           dismiss notification (DELETE)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/directory", get(handlers::candidates::get_directory))
        .merge(onboarding::candidate_router())
        .nest("/onboarding", onboarding::router())
}
