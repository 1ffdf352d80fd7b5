pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod server;

use metrics::MetricRegistry;

/// Shared application state available to every handler via `State<Arc<AppState>>`.
/// Constructed explicitly at startup and passed by reference — there is
/// no process-global registry.
pub struct AppState {
    /// Central metric registry — handlers record samples and read snapshots.
    pub registry: MetricRegistry,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            registry: MetricRegistry::new(),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
