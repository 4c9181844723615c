use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Live counters for one sync run.
///
/// Shared between workers and the progress display; every item lands in
/// exactly one of the three buckets.
#[derive(Debug, Default)]
pub struct SyncStats {
    committed: AtomicUsize,
    skipped: AtomicUsize,
    failed: AtomicUsize,
}

impl SyncStats {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn committed(&self) -> usize {
        self.committed.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::SeqCst)
    }

    /// Items finished so far, whatever their outcome.
    #[must_use]
    pub fn processed(&self) -> usize {
        self.committed() + self.skipped() + self.failed()
    }

    pub(crate) fn increment_committed(&self) {
        self.committed.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn increment_skipped(&self) {
        self.skipped.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn increment_failed(&self) {
        self.failed.fetch_add(1, Ordering::SeqCst);
    }

    /// Freezes the current counts.
    #[must_use]
    pub fn summary(&self, total: usize) -> SyncSummary {
        SyncSummary {
            committed: self.committed(),
            skipped: self.skipped(),
            failed: self.failed(),
            total,
        }
    }
}

/// Final counts of a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncSummary {
    pub committed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub total: usize,
}

impl SyncSummary {
    /// True when no item failed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

impl fmt::Display for SyncSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} committed, {} skipped, {} failed ({} total)",
            self.committed, self.skipped, self.failed, self.total
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_and_summary() {
        let stats = SyncStats::new();
        stats.increment_committed();
        stats.increment_committed();
        stats.increment_skipped();
        stats.increment_failed();

        assert_eq!(stats.processed(), 4);
        let summary = stats.summary(5);
        assert_eq!(
            summary,
            SyncSummary {
                committed: 2,
                skipped: 1,
                failed: 1,
                total: 5
            }
        );
        assert!(!summary.is_clean());
        assert_eq!(
            summary.to_string(),
            "2 committed, 1 skipped, 1 failed (5 total)"
        );
    }
}
