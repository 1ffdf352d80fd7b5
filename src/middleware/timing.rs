use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::AppState;

/// Ids written by this middleware carry this prefix so the server's
/// own traffic stays distinguishable from application metrics.
pub const SELF_METRIC_PREFIX: &str = "http:";

/// Measures every matched request and feeds the tracker with its own
/// traffic: the elapsed wall time lands in the registry under
/// `http:{METHOD} {route template}`, so the server's endpoints show up
/// in `GET /metrics` next to everything else. The route template is
/// used instead of the raw path to keep metric cardinality bounded.
///
/// Clients see the same measurement via two response headers,
/// `X-Response-Time-Us` and `Server-Timing`.
pub async fn timing_middleware(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    let method = req.method().clone();
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned());

    let start = Instant::now();
    let mut response = next.run(req).await;
    let elapsed = start.elapsed();

    // The SSE connection lives as long as its client; its wall time is
    // not a request latency.
    let streaming = route.as_deref() == Some("/metrics/stream");

    if !streaming {
        if let Some(route) = &route {
            let id = format!("{SELF_METRIC_PREFIX}{method} {route}");
            let metric = state.registry.get_or_create(&id);
            // A sub-nanosecond elapsed rounds up; zero is not a latency.
            let _ = metric.record(elapsed.max(Duration::from_nanos(1)));
        }
    }

    let us = elapsed.as_micros();
    if let Ok(val) = us.to_string().parse() {
        response.headers_mut().insert("X-Response-Time-Us", val);
    }
    let server_timing = format!("total;dur={:.3}", elapsed.as_secs_f64() * 1000.0);
    if let Ok(val) = server_timing.parse() {
        response.headers_mut().insert("Server-Timing", val);
    }

    if !streaming {
        let status = response.status().as_u16();
        let route = route.as_deref().unwrap_or("-");
        println!("{status}  {method} {route}  {us}us");
    }

    response
}
