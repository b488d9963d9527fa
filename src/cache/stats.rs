//! Sweep Statistics Module
//!
//! Counts what a single cleaner sweep did with each file it visited.

use serde::Serialize;

// == Sweep Stats ==
/// Per-sweep counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SweepStats {
    /// Envelope files visited
    pub scanned: u64,
    /// Entries still within their TTL
    pub live: u64,
    /// Expired entries removed
    pub expired: u64,
    /// Undecodable files removed
    pub corrupt: u64,
    /// Files that vanished between listing and reading
    pub vanished: u64,
    /// Files that could not be read or removed
    pub failed: u64,
}

impl SweepStats {
    // == Constructor ==
    /// Creates a new SweepStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Removed ==
    /// Total files reclaimed by the sweep.
    pub fn removed(&self) -> u64 {
        self.expired + self.corrupt
    }

    // == Record Live ==
    /// Records an entry that is still within its TTL.
    pub fn record_live(&mut self) {
        self.scanned += 1;
        self.live += 1;
    }

    // == Record Expired ==
    /// Records an expired entry that was removed.
    pub fn record_expired(&mut self) {
        self.scanned += 1;
        self.expired += 1;
    }

    // == Record Corrupt ==
    /// Records an undecodable file that was removed.
    pub fn record_corrupt(&mut self) {
        self.scanned += 1;
        self.corrupt += 1;
    }

    // == Record Vanished ==
    /// Records a file that disappeared before it could be read.
    pub fn record_vanished(&mut self) {
        self.scanned += 1;
        self.vanished += 1;
    }

    // == Record Failure ==
    /// Records a file that could not be read; it is left in place.
    pub fn record_failure(&mut self) {
        self.scanned += 1;
        self.failed += 1;
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = SweepStats::new();
        assert_eq!(stats.scanned, 0);
        assert_eq!(stats.removed(), 0);
    }

    #[test]
    fn test_stats_counts() {
        let mut stats = SweepStats::new();
        stats.record_live();
        stats.record_expired();
        stats.record_expired();
        stats.record_corrupt();
        stats.record_vanished();
        stats.record_failure();

        assert_eq!(stats.scanned, 6);
        assert_eq!(stats.live, 1);
        assert_eq!(stats.removed(), 3);
        assert_eq!(stats.vanished, 1);
        assert_eq!(stats.failed, 1);
    }
}
