use crate::core::fingerprint::Fingerprint;
use std::collections::VecDeque;

const PREALLOCATE_LIMIT: usize = 4096;

/// Fixed-capacity FIFO of duplicate fingerprints. The oldest entry is evicted on overflow.
#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<Fingerprint>,
    capacity: usize,
}

impl History {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            // Capped pre-allocation; the deque grows on demand past it.
            entries: VecDeque::with_capacity(capacity.min(PREALLOCATE_LIMIT)),
            capacity,
        }
    }

    /// Append `fingerprint`, returning the evicted entry when the window was full.
    pub fn push(&mut self, fingerprint: Fingerprint) -> Option<Fingerprint> {
        if self.capacity == 0 {
            return Some(fingerprint);
        }
        let evicted = if self.entries.len() == self.capacity {
            self.entries.pop_front()
        } else {
            None
        };
        self.entries.push_back(fingerprint);
        evicted
    }

    /// Oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &Fingerprint> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
