use std::sync::Arc;

use latency_tracker::{server, AppState};

#[tokio::main]
async fn main() {
    println!();
    println!("╔══════════════════════════════════════════════════╗");
    println!("║   ⏱  LATENCY TRACKER                            ║");
    println!("╚══════════════════════════════════════════════════╝");
    println!();

    // ── 1. Build shared state ────────────────────────────────────
    let state = Arc::new(AppState::new());

    // ── 2. Build Axum router ─────────────────────────────────────
    let app = server::create_router(state);

    // ── 3. Bind & serve ──────────────────────────────────────────
    let addr = "0.0.0.0:8080";
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to port 8080 — is it already in use?");

    println!("Server listening on http://localhost:8080");
    println!("Record latency  → POST /metrics/{{id}}/latency");
    println!("One snapshot    → GET  /metrics/{{id}}");
    println!("All snapshots   → GET  /metrics");
    println!("Snapshot SSE    → GET  /metrics/stream");
    println!();

    axum::serve(listener, app)
        .await
        .expect("Server exited with error");
}
