pub mod metrics;
pub mod stream;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::metrics::MetricError;

// ─── Unified error type ──────────────────────────────────────────

#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
}

impl From<MetricError> for AppError {
    fn from(err: MetricError) -> Self {
        // Both core conditions are caller mistakes, never server faults.
        Self::BadRequest(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        let body = serde_json::json!({
            "error":  message,
            "status": status.as_u16(),
        });

        (status, Json(body)).into_response()
    }
}
