use axum::{
    middleware as axum_mw,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::handlers;
use crate::middleware::timing;
use crate::AppState;

/// Builds the full Axum `Router` with all routes and middleware.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // ── Metric collection ───────────────────────────────────
        .route(
            "/metrics",
            get(handlers::metrics::list_metrics).post(handlers::metrics::create_metric),
        )
        .route("/metrics/stream", get(handlers::stream::metrics_stream))
        .route("/metrics/:id", get(handlers::metrics::get_metric))
        .route(
            "/metrics/:id/latency",
            post(handlers::metrics::record_latency),
        )
        // ── Per-route middleware: timing runs after routing so the
        //    matched path template is available ────────────────────
        .route_layer(axum_mw::from_fn_with_state(
            Arc::clone(&state),
            timing::timing_middleware,
        ))
        // ── Provide shared state to all routes above ────────────
        .with_state(state)
        .layer(CorsLayer::permissive())
}
