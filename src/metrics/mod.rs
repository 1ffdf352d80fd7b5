pub mod metric;
pub mod percentiles;
pub mod registry;

pub use metric::{Metric, MetricConfig, MetricSnapshot};
pub use registry::MetricRegistry;

use std::time::{Duration, Instant};

use thiserror::Error;

/// A single latency observation — the "write" side.
/// Handlers create one per `record` call; `snapshot` reads them back.
#[derive(Debug, Clone, Copy)]
pub struct LatencySample {
    /// Observed latency. Always > 0 — `Metric::record` rejects zero.
    pub latency: Duration,
    /// Instant the observation was ingested, used for window filtering.
    pub recorded_at: Instant,
}

/// Recoverable conditions reported to the immediate caller.
/// A rejected call leaves the metric/registry unchanged.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MetricError {
    #[error("latency must be greater than zero")]
    InvalidLatency,
    #[error("invalid metric config: {0}")]
    InvalidConfig(&'static str),
}
