//! Liveness endpoint.

use axum::Json;

use crate::models::StatusResponse;

/// `GET /` — fixed payload while the process is serving.
pub async fn root() -> Json<StatusResponse> {
    Json(StatusResponse {
        message: "API is running".to_string(),
    })
}
