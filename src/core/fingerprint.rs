use crate::core::record::Reading;
use std::collections::HashMap;

/// Unordered detector pair, stored as `(min_id, max_id)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairKey(i64, i64);

impl PairKey {
    pub fn new(a: i64, b: i64) -> Self {
        if a <= b { Self(a, b) } else { Self(b, a) }
    }

    pub fn low(&self) -> i64 {
        self.0
    }

    pub fn high(&self) -> i64 {
        self.1
    }
}

/// Pairwise timing differences of one record, keyed by canonical detector pair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fingerprint {
    pairs: HashMap<PairKey, i64>,
}

impl Fingerprint {
    /// Build the fingerprint for every combination of readings in list order.
    ///
    /// The key is canonicalized but the value keeps the sign of
    /// `earlier.time - later.time` as listed, so `[(2,5),(1,9)]` stores
    /// `(1,2) -> -4`, not `4`. Repeated pairs keep the last combination seen.
    pub fn from_readings(readings: &[Reading]) -> Self {
        let mut pairs = HashMap::new();
        for (i, first) in readings.iter().enumerate() {
            for second in &readings[i + 1..] {
                pairs.insert(
                    PairKey::new(first.detector_id, second.detector_id),
                    first.time.saturating_sub(second.time),
                );
            }
        }
        Self { pairs }
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn get(&self, key: &PairKey) -> Option<i64> {
        self.pairs.get(key).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PairKey, i64)> + '_ {
        self.pairs.iter().map(|(k, v)| (*k, *v))
    }
}

impl FromIterator<(PairKey, i64)> for Fingerprint {
    fn from_iter<T: IntoIterator<Item = (PairKey, i64)>>(iter: T) -> Self {
        Self {
            pairs: iter.into_iter().collect(),
        }
    }
}
