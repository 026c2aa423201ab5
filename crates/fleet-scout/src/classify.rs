//! Result collection and good/bad classification

use fleet_core::{Host, HostPair};
use std::collections::{BTreeSet, HashMap};
use tracing::warn;

/// Bandwidth results keyed by unordered host pair.
///
/// The first recorded figure for a pair wins; later writes for the same
/// pair are dropped with a warning.
#[derive(Debug, Clone, Default)]
pub struct PairResults {
    results: HashMap<HostPair, f64>,
}

impl PairResults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a result; returns false when the pair already had one
    pub fn record(&mut self, pair: HostPair, bandwidth_gbps: f64) -> bool {
        if self.results.contains_key(&pair) {
            warn!(pair = %pair, "duplicate result for pair, keeping the first");
            return false;
        }
        self.results.insert(pair, bandwidth_gbps);
        true
    }

    pub fn get(&self, pair: &HostPair) -> Option<f64> {
        self.results.get(pair).copied()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Results sorted by bandwidth, highest first
    pub fn iter_sorted(&self) -> Vec<(&HostPair, f64)> {
        let mut entries: Vec<_> = self.results.iter().map(|(p, bw)| (p, *bw)).collect();
        entries.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries
    }

    pub fn max(&self) -> Option<f64> {
        self.results.values().copied().reduce(f64::max)
    }

    pub fn min(&self) -> Option<f64> {
        self.results.values().copied().reduce(f64::min)
    }
}

/// Hosts split by benchmark outcome.
///
/// A host appears in `good` when any of its pairs met the threshold and in
/// `bad` when any fell short; the sets may overlap, and the retest pass
/// exists to disambiguate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub good: BTreeSet<Host>,
    pub bad: BTreeSet<Host>,
}

impl Classification {
    /// Hosts that only ever measured below threshold
    pub fn bad_only(&self) -> Vec<&Host> {
        self.bad.iter().filter(|h| !self.good.contains(*h)).collect()
    }
}

/// Split hosts into good and bad sets using per-pair thresholds.
///
/// A pair with no threshold entry passes trivially (threshold zero).
pub fn classify(results: &PairResults, thresholds: &HashMap<HostPair, f64>) -> Classification {
    let mut classification = Classification::default();

    for (pair, bandwidth) in &results.results {
        let threshold = thresholds.get(pair).copied().unwrap_or(0.0);
        let bucket = if *bandwidth >= threshold {
            &mut classification.good
        } else {
            &mut classification.bad
        };
        bucket.insert(pair.first().clone());
        bucket.insert(pair.second().clone());
    }

    classification
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(a: &str, b: &str) -> HostPair {
        HostPair::new(Host::new(a), Host::new(b))
    }

    #[test]
    fn test_first_result_wins() {
        let mut results = PairResults::new();
        assert!(results.record(pair("gpu-1", "gpu-2"), 390.0));
        // Same pair in swapped order is still a duplicate
        assert!(!results.record(pair("gpu-2", "gpu-1"), 10.0));
        assert_eq!(results.get(&pair("gpu-1", "gpu-2")), Some(390.0));
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn test_iter_sorted_descending() {
        let mut results = PairResults::new();
        results.record(pair("a", "b"), 200.0);
        results.record(pair("c", "d"), 390.0);
        results.record(pair("e", "f"), 100.0);

        let sorted: Vec<f64> = results.iter_sorted().iter().map(|(_, bw)| *bw).collect();
        assert_eq!(sorted, vec![390.0, 200.0, 100.0]);
        assert_eq!(results.max(), Some(390.0));
        assert_eq!(results.min(), Some(100.0));
    }

    #[test]
    fn test_classify_by_pair_threshold() {
        let mut results = PairResults::new();
        results.record(pair("gpu-1", "gpu-2"), 390.0);
        results.record(pair("gpu-3", "gpu-4"), 120.0);

        let thresholds = HashMap::from([
            (pair("gpu-1", "gpu-2"), 365.0),
            (pair("gpu-3", "gpu-4"), 365.0),
        ]);

        let c = classify(&results, &thresholds);
        assert_eq!(c.good, BTreeSet::from([Host::new("gpu-1"), Host::new("gpu-2")]));
        assert_eq!(c.bad, BTreeSet::from([Host::new("gpu-3"), Host::new("gpu-4")]));
    }

    #[test]
    fn test_host_may_be_in_both_sets() {
        let mut results = PairResults::new();
        results.record(pair("gpu-1", "gpu-2"), 390.0);
        results.record(pair("gpu-1", "gpu-3"), 120.0);

        let thresholds = HashMap::from([
            (pair("gpu-1", "gpu-2"), 365.0),
            (pair("gpu-1", "gpu-3"), 365.0),
        ]);

        let c = classify(&results, &thresholds);
        assert!(c.good.contains(&Host::new("gpu-1")));
        assert!(c.bad.contains(&Host::new("gpu-1")));
        // Only gpu-3 never passed anywhere
        assert_eq!(c.bad_only(), vec![&Host::new("gpu-3")]);
    }

    #[test]
    fn test_missing_threshold_passes() {
        let mut results = PairResults::new();
        results.record(pair("gpu-1", "gpu-2"), 1.0);
        let c = classify(&results, &HashMap::new());
        assert!(c.bad.is_empty());
        assert_eq!(c.good.len(), 2);
    }

    #[test]
    fn test_exact_threshold_is_good() {
        let mut results = PairResults::new();
        results.record(pair("gpu-1", "gpu-2"), 365.0);
        let thresholds = HashMap::from([(pair("gpu-1", "gpu-2"), 365.0)]);
        let c = classify(&results, &thresholds);
        assert!(c.bad.is_empty());
    }
}
