//! Exactly-once bookkeeping of counted track IDs.

use std::collections::HashSet;

/// Result of offering one track to the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordOutcome {
    /// This call added the track to the count.
    pub counted: bool,
    /// Running total after the call.
    pub total: usize,
}

/// Append-only set of counted track IDs.
///
/// A track ID enters at most once no matter how many frames it spends on the
/// line, so the total never decreases.
#[derive(Debug, Clone, Default)]
pub struct CountLedger {
    seen: HashSet<u64>,
    order: Vec<u64>,
}

impl CountLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, track_id: u64, crossed: bool) -> RecordOutcome {
        let counted = crossed && self.seen.insert(track_id);
        if counted {
            self.order.push(track_id);
        }
        RecordOutcome {
            counted,
            total: self.total(),
        }
    }

    pub fn total(&self) -> usize {
        self.order.len()
    }

    pub fn contains(&self, track_id: u64) -> bool {
        self.seen.contains(&track_id)
    }

    /// Counted IDs in the order they were counted.
    pub fn ids(&self) -> &[u64] {
        &self.order
    }
}
