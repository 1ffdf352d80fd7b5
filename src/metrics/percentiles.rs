use std::time::Duration;

/// Nearest-rank percentile over an ascending-sorted slice:
/// `idx = ceil(p/100 * N) - 1`, clamped to `[0, N-1]`.
///
/// Deterministic, no interpolation — the result is always one of the
/// input values. Returns `None` only for an empty slice; for `N = 1`
/// every percentile is that single sample. Pure function, holds no
/// locks, safe to call from any task since the input is an owned copy.
pub fn compute_percentile(sorted: &[Duration], percentile: u8) -> Option<Duration> {
    let n = sorted.len();
    if n == 0 {
        return None;
    }
    let rank = ((f64::from(percentile) / 100.0) * n as f64).ceil() as usize;
    let idx = rank.saturating_sub(1).min(n - 1);
    Some(sorted[idx])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn empty_input_yields_none() {
        assert_eq!(compute_percentile(&[], 50), None);
        assert_eq!(compute_percentile(&[], 99), None);
    }

    #[test]
    fn single_sample_dominates_every_percentile() {
        let data = [ms(7)];
        for p in [1, 50, 95, 99, 100] {
            assert_eq!(compute_percentile(&data, p), Some(ms(7)));
        }
    }

    #[test]
    fn nearest_rank_with_three_samples() {
        // N=3: idx50 = ceil(1.5)-1 = 1, idx95 = ceil(2.85)-1 = 2,
        // idx99 = ceil(2.97)-1 = 2
        let data = [ms(10), ms(20), ms(30)];
        assert_eq!(compute_percentile(&data, 50), Some(ms(20)));
        assert_eq!(compute_percentile(&data, 95), Some(ms(30)));
        assert_eq!(compute_percentile(&data, 99), Some(ms(30)));
    }

    #[test]
    fn p100_selects_the_maximum() {
        let data = [ms(1), ms(2), ms(3), ms(4)];
        assert_eq!(compute_percentile(&data, 100), Some(ms(4)));
    }

    #[test]
    fn monotonic_in_percentile() {
        let data = [ms(5), ms(8), ms(13), ms(21), ms(34)];
        let mut last = Duration::ZERO;
        for p in 1..=100 {
            let v = compute_percentile(&data, p).unwrap();
            assert!(v >= last, "p{p} regressed: {v:?} < {last:?}");
            last = v;
        }
    }
}
