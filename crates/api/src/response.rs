//! Shared response envelope types for API handlers.
//!
//! Responses under `/api/v1` use a `{ "data": ... }` envelope. The
//! candidate directory endpoints at the root return bare JSON.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
///
/// # Example
///
/// ```ignore
/// Ok(Json(DataResponse { data: snapshot }))
/// ```
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
