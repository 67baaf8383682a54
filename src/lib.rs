//! Near-duplicate suppression for multi-detector coincidence logs.
//!
//! Each input line lists `(detector_id, time)` readings. Lines whose pairwise
//! timing pattern matches the last kept event, or any event in a bounded window
//! of recently seen duplicates, are dropped.

pub mod core;
pub mod services;

pub use crate::core::dedup::{DedupConfig, DedupStats, Deduplicator, MatchSource, Verdict};
pub use crate::core::fingerprint::{Fingerprint, PairKey};
pub use crate::core::record::{ParseError, Reading, Record, parse_line};
pub use crate::core::similarity::{Comparison, compare, is_same_event};
pub use crate::services::{FilterService, FilterSummary, RunRecord};
