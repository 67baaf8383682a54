use crate::core::fingerprint::Fingerprint;
use serde::{Deserialize, Serialize};

/// Pair counts from comparing two fingerprints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comparison {
    /// Detector pairs present in both fingerprints.
    pub shared: usize,
    /// Shared pairs whose differences are strictly closer than the threshold.
    pub similar: usize,
}

/// Count shared and similar pairs, walking the smaller fingerprint.
pub fn compare(a: &Fingerprint, b: &Fingerprint, threshold: u64) -> Comparison {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };

    let mut result = Comparison::default();
    for (key, value) in small.iter() {
        let Some(other) = large.get(&key) else {
            continue;
        };
        result.shared += 1;
        if value.abs_diff(other) < threshold {
            result.similar += 1;
        }
    }
    result
}

/// True when at least `min_pair` shared pairs are similar under `threshold`.
pub fn is_same_event(a: &Fingerprint, b: &Fingerprint, threshold: u64, min_pair: usize) -> bool {
    compare(a, b, threshold).similar >= min_pair
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fingerprint::PairKey;

    fn fp(items: &[((i64, i64), i64)]) -> Fingerprint {
        items
            .iter()
            .map(|&((a, b), v)| (PairKey::new(a, b), v))
            .collect()
    }

    #[test]
    fn test_identical_fingerprints_match() {
        let a = fp(&[((1, 2), -10), ((1, 3), 40)]);
        assert!(is_same_event(&a, &a, 100, 1));
        assert!(is_same_event(&a, &a, 1, 2));
        assert_eq!(compare(&a, &a, 1), Comparison { shared: 2, similar: 2 });
    }

    #[test]
    fn test_threshold_is_strict() {
        let a = fp(&[((1, 2), 0)]);
        let b = fp(&[((1, 2), 100)]);
        assert!(!is_same_event(&a, &b, 100, 1));
        assert!(is_same_event(&a, &b, 101, 1));
    }

    #[test]
    fn test_disjoint_fingerprints_never_match() {
        let a = fp(&[((1, 2), 0)]);
        let b = fp(&[((3, 4), 0)]);
        assert_eq!(compare(&a, &b, 1000), Comparison { shared: 0, similar: 0 });
        assert!(!is_same_event(&a, &b, 1000, 1));
    }

    #[test]
    fn test_quorum_counts_only_similar_shared_pairs() {
        let a = fp(&[((1, 2), 0), ((1, 3), 0), ((2, 3), 0)]);
        let b = fp(&[((1, 2), 5), ((1, 3), 500), ((2, 4), 0)]);
        assert_eq!(compare(&a, &b, 100), Comparison { shared: 2, similar: 1 });
        assert!(is_same_event(&a, &b, 100, 1));
        assert!(!is_same_event(&a, &b, 100, 2));
    }

    #[test]
    fn test_comparison_is_symmetric() {
        let a = fp(&[((1, 2), 0), ((1, 3), 0)]);
        let b = fp(&[((1, 2), 50)]);
        assert_eq!(compare(&a, &b, 60), compare(&b, &a, 60));
    }

    #[test]
    fn test_extreme_values_do_not_overflow() {
        let a = fp(&[((1, 2), i64::MIN)]);
        let b = fp(&[((1, 2), i64::MAX)]);
        assert!(!is_same_event(&a, &b, u64::MAX, 1));
        assert!(is_same_event(&a, &a, 1, 1));
    }
}
