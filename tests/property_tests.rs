//! Property-based tests for the similarity judge and the deduplicator.

#![allow(clippy::unwrap_used)]

use coindedup::{DedupConfig, Deduplicator, Fingerprint, Reading, Verdict, is_same_event};
use proptest::prelude::*;

fn reading() -> impl Strategy<Value = Reading> {
    (1i64..6, -1000i64..1000).prop_map(|(id, t)| Reading::new(id, t))
}

fn record() -> impl Strategy<Value = Vec<Reading>> {
    prop::collection::vec(reading(), 0..5)
}

fn stream() -> impl Strategy<Value = Vec<Vec<Reading>>> {
    prop::collection::vec(record(), 0..40)
}

/// Indices classified as duplicates. The window is large enough that nothing is evicted.
fn duplicate_indices(records: &[Vec<Reading>], threshold: u64, min_pair: usize) -> Vec<usize> {
    let mut dedup = Deduplicator::new(DedupConfig::new(threshold, 1000, min_pair).unwrap());
    records
        .iter()
        .enumerate()
        .filter(|(_, r)| matches!(dedup.observe(r), Verdict::Duplicate(_)))
        .map(|(i, _)| i)
        .collect()
}

proptest! {
    /// Property: every non-empty fingerprint matches itself.
    #[test]
    fn prop_fingerprint_matches_itself(readings in record(), threshold in 1u64..500) {
        let fp = Fingerprint::from_readings(&readings);
        prop_assert_eq!(is_same_event(&fp, &fp, threshold, 1), !fp.is_empty());
    }

    /// Property: the judge ignores argument order.
    #[test]
    fn prop_judge_is_symmetric(
        a in record(),
        b in record(),
        threshold in 1u64..500,
        min_pair in 1usize..4,
    ) {
        let fa = Fingerprint::from_readings(&a);
        let fb = Fingerprint::from_readings(&b);
        prop_assert_eq!(
            is_same_event(&fa, &fb, threshold, min_pair),
            is_same_event(&fb, &fa, threshold, min_pair)
        );
    }

    /// Property: records with fewer than two readings are always skipped and leave no state.
    #[test]
    fn prop_short_records_are_skipped(records in stream()) {
        let mut dedup = Deduplicator::new(DedupConfig::default());
        for r in &records {
            let before_history = dedup.history().len();
            let before_previous = dedup.previous().cloned();
            let verdict = dedup.observe(r);
            if r.len() < 2 {
                prop_assert_eq!(verdict, Verdict::Skipped);
                prop_assert_eq!(dedup.history().len(), before_history);
                prop_assert_eq!(dedup.previous().cloned(), before_previous);
            } else {
                prop_assert_ne!(verdict, Verdict::Skipped);
            }
        }
    }

    /// Property: the history window never exceeds its capacity.
    #[test]
    fn prop_history_is_bounded(records in stream(), history_size in 1usize..4) {
        let mut dedup = Deduplicator::new(DedupConfig::new(300, history_size, 1).unwrap());
        for r in &records {
            dedup.observe(r);
            prop_assert!(dedup.history().len() <= history_size);
        }
    }

    /// Property: a wider threshold never turns a duplicate back into a kept record.
    #[test]
    fn prop_duplicates_grow_with_threshold(
        records in stream(),
        threshold in 1u64..300,
        extra in 0u64..300,
        min_pair in 1usize..3,
    ) {
        let narrow = duplicate_indices(&records, threshold, min_pair);
        let wide = duplicate_indices(&records, threshold + extra, min_pair);
        prop_assert!(narrow.iter().all(|i| wide.contains(i)));
    }

    /// Property: a larger quorum never turns a kept record into a duplicate.
    #[test]
    fn prop_duplicates_shrink_with_min_pair(
        records in stream(),
        threshold in 1u64..300,
        min_pair in 1usize..3,
        extra in 0usize..3,
    ) {
        let loose = duplicate_indices(&records, threshold, min_pair);
        let strict = duplicate_indices(&records, threshold, min_pair + extra);
        prop_assert!(strict.iter().all(|i| loose.contains(i)));
    }
}
