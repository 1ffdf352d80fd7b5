use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use crate::metrics::metric::{DEFAULT_MAX_SAMPLES, DEFAULT_WINDOW};
use crate::metrics::{MetricConfig, MetricSnapshot};
use crate::AppState;

use super::AppError;

// ─── Request types ───────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RecordLatencyRequest {
    /// Observed latency in nanoseconds. Must be > 0. A missing field
    /// decodes as 0 and is caught by the non-positive guard, so the
    /// caller gets a 400 rather than a deserialization error.
    #[serde(default)]
    pub latency_ns: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateMetricRequest {
    pub id: String,
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,
    #[serde(default = "default_max_samples")]
    pub max_samples: usize,
}

fn default_window_ms() -> u64 {
    DEFAULT_WINDOW.as_millis() as u64
}
fn default_max_samples() -> usize {
    DEFAULT_MAX_SAMPLES
}

// ─── POST /metrics/:id/latency ───────────────────────────────────

pub async fn record_latency(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<RecordLatencyRequest>,
) -> Result<StatusCode, AppError> {
    // Boundary check: i64 can carry a negative that Duration cannot.
    // The core re-checks the zero case on its own.
    if req.latency_ns <= 0 {
        return Err(AppError::BadRequest(
            "'latency_ns' must be a positive integer".into(),
        ));
    }

    let metric = state.registry.get_or_create(&id);
    metric.record(Duration::from_nanos(req.latency_ns as u64))?;
    Ok(StatusCode::ACCEPTED)
}

// ─── GET /metrics/:id ────────────────────────────────────────────

pub async fn get_metric(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<MetricSnapshot>, AppError> {
    let metric = state
        .registry
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("metric '{id}' not found")))?;
    Ok(Json(metric.snapshot()))
}

// ─── GET /metrics ────────────────────────────────────────────────

pub async fn list_metrics(State(state): State<Arc<AppState>>) -> Json<Vec<MetricSnapshot>> {
    // Listing and snapshotting are decoupled: the registry lock is
    // already released by the time any percentile work runs.
    let metrics = state.registry.list_all();
    Json(metrics.iter().map(|m| m.snapshot()).collect())
}

// ─── POST /metrics ───────────────────────────────────────────────

/// Explicit (re)definition. Re-creating an existing id discards its
/// samples on purpose.
pub async fn create_metric(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateMetricRequest>,
) -> Result<(StatusCode, Json<MetricSnapshot>), AppError> {
    let config = MetricConfig {
        id: req.id,
        window: Duration::from_millis(req.window_ms),
        max_samples: req.max_samples,
        created_at: chrono::Utc::now(),
    };
    let metric = state.registry.create(config)?;
    Ok((StatusCode::CREATED, Json(metric.snapshot())))
}
