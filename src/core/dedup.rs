use crate::core::fingerprint::Fingerprint;
use crate::core::history::History;
use crate::core::record::{Reading, Record};
use crate::core::similarity::is_same_event;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_THRESHOLD: u64 = 100;
pub const DEFAULT_HISTORY_SIZE: usize = 1000;
pub const DEFAULT_MIN_PAIR: usize = 1;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{field} must be a positive integer")]
    NotPositive { field: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DedupConfig {
    /// Largest pair difference delta (exclusive) that still counts as similar.
    pub threshold: u64,
    /// Number of duplicate fingerprints remembered for long-range matching.
    pub history_size: usize,
    /// Similar shared pairs needed to call two records the same event.
    pub min_pair: usize,
}

impl DedupConfig {
    pub fn new(threshold: u64, history_size: usize, min_pair: usize) -> Result<Self, ConfigError> {
        let config = Self {
            threshold,
            history_size,
            min_pair,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.threshold == 0 {
            return Err(ConfigError::NotPositive { field: "threshold" });
        }
        if self.history_size == 0 {
            return Err(ConfigError::NotPositive {
                field: "history_size",
            });
        }
        if self.min_pair == 0 {
            return Err(ConfigError::NotPositive { field: "min_pair" });
        }
        Ok(())
    }
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            history_size: DEFAULT_HISTORY_SIZE,
            min_pair: DEFAULT_MIN_PAIR,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchSource {
    History,
    Previous,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Kept,
    Duplicate(MatchSource),
    /// Fewer than two readings; never compared, kept, or remembered.
    Skipped,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DedupStats {
    pub observed: usize,
    pub kept: usize,
    pub history_matches: usize,
    pub previous_matches: usize,
    pub skipped: usize,
}

impl DedupStats {
    pub fn duplicates(&self) -> usize {
        self.history_matches + self.previous_matches
    }
}

/// Stateful filter for one stream. Create a fresh instance per input.
#[derive(Debug, Clone)]
pub struct Deduplicator {
    config: DedupConfig,
    previous: Option<Fingerprint>,
    history: History,
    stats: DedupStats,
}

impl Deduplicator {
    pub fn new(config: DedupConfig) -> Self {
        Self {
            config,
            previous: None,
            history: History::with_capacity(config.history_size),
            stats: DedupStats::default(),
        }
    }

    /// Classify the next record and update state.
    ///
    /// The history window is checked first, then the last kept record.
    /// Duplicates go into the history window; kept records only replace the
    /// previous-kept slot.
    pub fn observe(&mut self, readings: &[Reading]) -> Verdict {
        self.stats.observed += 1;

        let current = Fingerprint::from_readings(readings);
        if current.is_empty() {
            self.stats.skipped += 1;
            return Verdict::Skipped;
        }

        let DedupConfig {
            threshold,
            min_pair,
            ..
        } = self.config;

        let source = if self
            .history
            .iter()
            .any(|seen| is_same_event(&current, seen, threshold, min_pair))
        {
            Some(MatchSource::History)
        } else if self
            .previous
            .as_ref()
            .is_some_and(|prev| is_same_event(&current, prev, threshold, min_pair))
        {
            Some(MatchSource::Previous)
        } else {
            None
        };

        match source {
            Some(source) => {
                match source {
                    MatchSource::History => self.stats.history_matches += 1,
                    MatchSource::Previous => self.stats.previous_matches += 1,
                }
                log::debug!(
                    "duplicate #{} matched {:?} ({} pairs)",
                    self.stats.observed,
                    source,
                    current.len()
                );
                self.history.push(current);
                Verdict::Duplicate(source)
            }
            None => {
                self.stats.kept += 1;
                self.previous = Some(current);
                Verdict::Kept
            }
        }
    }

    /// Run every record through [`Self::observe`] and return the kept ones in order.
    pub fn filter<I>(&mut self, records: I) -> Vec<Record>
    where
        I: IntoIterator<Item = Record>,
    {
        records
            .into_iter()
            .filter(|record| self.observe(&record.readings) == Verdict::Kept)
            .collect()
    }

    pub fn config(&self) -> &DedupConfig {
        &self.config
    }

    pub fn stats(&self) -> DedupStats {
        self.stats
    }

    pub fn previous(&self) -> Option<&Fingerprint> {
        self.previous.as_ref()
    }

    pub fn history(&self) -> &History {
        &self.history
    }
}
