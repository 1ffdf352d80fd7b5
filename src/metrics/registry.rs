use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use super::metric::{Metric, MetricConfig};
use super::MetricError;

/// Maps metric id → `Metric`. The RwLock guards only this map; each
/// metric carries its own mutex for its samples, and the two locks are
/// never held at the same time. One global lock here would serialize
/// unrelated metrics behind each other for no reason.
pub struct MetricRegistry {
    metrics: RwLock<HashMap<String, Arc<Metric>>>,
}

impl MetricRegistry {
    pub fn new() -> Self {
        Self {
            metrics: RwLock::new(HashMap::new()),
        }
    }

    /// Explicit metric (re)definition. Overwriting an existing id
    /// discards its samples — "redefine" semantics, not an upsert.
    /// An invalid config creates nothing and leaves the map untouched.
    pub fn create(&self, config: MetricConfig) -> Result<Arc<Metric>, MetricError> {
        config.validate()?;
        let metric = Arc::new(Metric::new(config));
        self.metrics
            .write()
            .insert(metric.config().id.clone(), Arc::clone(&metric));
        Ok(metric)
    }

    pub fn get(&self, id: &str) -> Option<Arc<Metric>> {
        self.metrics.read().get(id).cloned()
    }

    /// Lazy creation on first write, with the default config. The
    /// write lock makes this atomic per id: racing callers all end up
    /// holding the same `Metric` instance, and existing entries are
    /// never replaced.
    pub fn get_or_create(&self, id: &str) -> Arc<Metric> {
        let mut metrics = self.metrics.write();
        Arc::clone(
            metrics
                .entry(id.to_owned())
                .or_insert_with(|| Arc::new(Metric::new(MetricConfig::with_defaults(id)))),
        )
    }

    /// Point-in-time list of all registered metrics. The read lock is
    /// released before the caller snapshots anything, so per-metric
    /// work never serializes behind the registry.
    pub fn list_all(&self) -> Vec<Arc<Metric>> {
        self.metrics.read().values().cloned().collect()
    }
}

impl Default for MetricRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use chrono::Utc;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn config(id: &str, window: Duration, max_samples: usize) -> MetricConfig {
        MetricConfig {
            id: id.into(),
            window,
            max_samples,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn create_rejects_invalid_config() {
        let registry = MetricRegistry::new();

        let err = registry
            .create(config("bad", Duration::ZERO, 100))
            .unwrap_err();
        assert!(matches!(err, MetricError::InvalidConfig(_)));

        let err = registry
            .create(config("bad", Duration::from_secs(60), 0))
            .unwrap_err();
        assert!(matches!(err, MetricError::InvalidConfig(_)));

        // Nothing was registered by the failed calls.
        assert!(registry.get("bad").is_none());
    }

    #[test]
    fn create_overwrites_and_discards_samples() {
        let registry = MetricRegistry::new();
        let metric = registry
            .create(config("checkout", Duration::from_secs(60), 100))
            .unwrap();
        metric.record(ms(10)).unwrap();
        assert_eq!(metric.snapshot().count, 1);

        let recreated = registry
            .create(config("checkout", Duration::from_secs(30), 50))
            .unwrap();
        assert!(!Arc::ptr_eq(&metric, &recreated));
        assert_eq!(recreated.snapshot().count, 0);
        assert_eq!(registry.get("checkout").unwrap().snapshot().count, 0);
    }

    #[test]
    fn create_accepts_very_large_max_samples() {
        let registry = MetricRegistry::new();
        let metric = registry
            .create(config("wide", Duration::from_secs(60), usize::MAX >> 2))
            .unwrap();
        metric.record(ms(1)).unwrap();
        assert_eq!(metric.snapshot().count, 1);
    }

    #[test]
    fn get_unknown_returns_none() {
        let registry = MetricRegistry::new();
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn get_or_create_returns_the_same_instance() {
        let registry = MetricRegistry::new();
        let first = registry.get_or_create("api");
        let second = registry.get_or_create("api");
        assert!(Arc::ptr_eq(&first, &second));

        assert_eq!(first.config().window, Duration::from_secs(60));
        assert_eq!(first.config().max_samples, 100);
    }

    #[test]
    fn get_or_create_preserves_other_metrics() {
        let registry = MetricRegistry::new();
        registry
            .create(config("existing", Duration::from_secs(60), 100))
            .unwrap();

        // A first-seen id must insert into the existing map, not
        // replace it.
        registry.get_or_create("fresh");
        assert!(registry.get("existing").is_some());
        assert!(registry.get("fresh").is_some());
        assert_eq!(registry.list_all().len(), 2);
    }

    #[test]
    fn list_all_is_point_in_time() {
        let registry = MetricRegistry::new();
        assert!(registry.list_all().is_empty());

        registry.get_or_create("a");
        registry.get_or_create("b");
        let listed = registry.list_all();
        assert_eq!(listed.len(), 2);
    }

    #[test]
    fn concurrent_get_or_create_converges_on_one_instance() {
        let registry = MetricRegistry::new();
        let threads = 16;

        std::thread::scope(|s| {
            for i in 0..threads {
                let registry = &registry;
                s.spawn(move || {
                    let metric = registry.get_or_create("shared");
                    metric.record(ms(i + 1)).unwrap();
                });
            }
        });

        let metric = registry.get_or_create("shared");
        assert_eq!(registry.list_all().len(), 1);
        // Every thread's sample landed in the single instance.
        assert_eq!(metric.snapshot().count, threads as usize);
    }
}
