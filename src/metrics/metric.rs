use std::collections::VecDeque;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Serialize, Serializer};

use super::percentiles::compute_percentile;
use super::{LatencySample, MetricError};

/// Window applied when a metric is created lazily on first write.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);
/// Sample cap applied when a metric is created lazily on first write.
pub const DEFAULT_MAX_SAMPLES: usize = 100;

// ─── Configuration ───────────────────────────────────────────────

/// Immutable once attached to a `Metric`. Validated by the registry
/// before a metric is ever constructed from it.
#[derive(Debug, Clone)]
pub struct MetricConfig {
    /// Unique within a registry.
    pub id: String,
    /// Trailing interval over which samples count toward percentiles.
    pub window: Duration,
    /// FIFO cap on retained samples.
    pub max_samples: usize,
    pub created_at: DateTime<Utc>,
}

impl MetricConfig {
    /// Config used by `get_or_create`: 1 minute window, 100 samples.
    pub fn with_defaults(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            window: DEFAULT_WINDOW,
            max_samples: DEFAULT_MAX_SAMPLES,
            created_at: Utc::now(),
        }
    }

    pub fn validate(&self) -> Result<(), MetricError> {
        if self.window.is_zero() {
            return Err(MetricError::InvalidConfig("window must be greater than zero"));
        }
        if self.max_samples == 0 {
            return Err(MetricError::InvalidConfig("max_samples must be greater than zero"));
        }
        Ok(())
    }
}

// ─── Metric ──────────────────────────────────────────────────────

/// One named latency series: a config plus a bounded FIFO of samples.
/// The mutex guards only the sample deque — it is never held across
/// percentile computation or any other blocking work, so contention
/// between metrics stays independent.
#[derive(Debug)]
pub struct Metric {
    config: MetricConfig,
    samples: Mutex<VecDeque<LatencySample>>,
}

impl Metric {
    pub fn new(config: MetricConfig) -> Self {
        // No preallocation: max_samples is caller-controlled and only
        // bounds the deque, it is not a sizing hint. The deque grows
        // with actual recordings.
        Self {
            config,
            samples: Mutex::new(VecDeque::new()),
        }
    }

    pub fn config(&self) -> &MetricConfig {
        &self.config
    }

    /// Ingest one observation. Rejects a zero latency — the HTTP layer
    /// checks `latency_ns <= 0` too, but this invariant belongs to the
    /// core and is enforced here independently.
    ///
    /// The lock covers only the append plus FIFO eviction; after
    /// return the sample is visible to any subsequent `snapshot`.
    pub fn record(&self, latency: Duration) -> Result<(), MetricError> {
        if latency.is_zero() {
            return Err(MetricError::InvalidLatency);
        }
        let sample = LatencySample {
            latency,
            recorded_at: Instant::now(),
        };

        let mut samples = self.samples.lock();
        samples.push_back(sample);
        while samples.len() > self.config.max_samples {
            samples.pop_front();
        }
        Ok(())
    }

    /// Compute current percentiles over the samples inside the window.
    ///
    /// Windowing is a read-time concern: writes store facts, reads
    /// apply interpretation. Samples are copied out under the lock and
    /// everything after — filter, sort, percentiles — runs on that
    /// owned copy, so concurrent `record` calls never tear a snapshot
    /// and the lock hold time is bounded by the copy alone.
    pub fn snapshot(&self) -> MetricSnapshot {
        let samples: Vec<LatencySample> = {
            let guard = self.samples.lock();
            guard.iter().copied().collect()
        };

        // Strictly after the cutoff counts as active. checked_sub only
        // fails when the process is younger than the window; every
        // retained sample is active in that case.
        let cutoff = Instant::now().checked_sub(self.config.window);
        let mut active: Vec<Duration> = samples
            .iter()
            .filter(|s| cutoff.map_or(true, |c| s.recorded_at > c))
            .map(|s| s.latency)
            .collect();
        active.sort_unstable();

        MetricSnapshot {
            metric_id: self.config.id.clone(),
            window: self.config.window,
            count: active.len(),
            p50: compute_percentile(&active, 50),
            p95: compute_percentile(&active, 95),
            p99: compute_percentile(&active, 99),
        }
    }
}

// ─── Snapshot ────────────────────────────────────────────────────

/// Read-only, point-in-time projection of one metric. Percentiles are
/// `None` when no sample fell inside the window — absence is explicit,
/// never a zero sentinel, since 0 ns would be a legitimate value.
#[derive(Debug, Clone, Serialize)]
pub struct MetricSnapshot {
    pub metric_id: String,
    #[serde(rename = "window_ns", serialize_with = "ser_duration_ns")]
    pub window: Duration,
    /// Samples that were inside the window at computation time.
    pub count: usize,
    #[serde(rename = "p50_ns", serialize_with = "ser_opt_duration_ns")]
    pub p50: Option<Duration>,
    #[serde(rename = "p95_ns", serialize_with = "ser_opt_duration_ns")]
    pub p95: Option<Duration>,
    #[serde(rename = "p99_ns", serialize_with = "ser_opt_duration_ns")]
    pub p99: Option<Duration>,
}

// Durations cross the wire as nanosecond integers, null for absent.

fn ser_duration_ns<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_nanos() as u64)
}

fn ser_opt_duration_ns<S: Serializer>(d: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
    match d {
        Some(d) => s.serialize_some(&(d.as_nanos() as u64)),
        None => s.serialize_none(),
    }
}
