use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio_stream::wrappers::IntervalStream;
use tokio_stream::StreamExt;

use crate::metrics::MetricSnapshot;
use crate::AppState;

// ─── GET /metrics/stream ─────────────────────────────────────────
/// Server-Sent Events endpoint.
/// Pushes the full snapshot list as JSON every 500 ms so a dashboard
/// can watch percentiles move without polling.

pub async fn metrics_stream(
    State(state): State<Arc<AppState>>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>> {
    let interval = tokio::time::interval(Duration::from_millis(500));

    let stream = IntervalStream::new(interval).map(move |_| {
        let snapshots: Vec<MetricSnapshot> = state
            .registry
            .list_all()
            .iter()
            .map(|m| m.snapshot())
            .collect();
        let json = serde_json::to_string(&snapshots).unwrap_or_default();
        Ok(Event::default().data(json))
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}
