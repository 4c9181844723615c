//! Batch driver: processes every enumerated track against the destination.
//!
//! # Architecture
//!
//! - [`SyncEngine`] - Bounded workers, per-path locking, item pacing
//! - [`SyncStats`] - Live counters, readable while the run is in flight
//! - [`SyncSummary`] - Frozen counts returned at the end

mod engine;
mod stats;

pub use engine::SyncEngine;
pub use stats::{SyncStats, SyncSummary};

use std::time::Duration;

use crate::playlist::DEFAULT_PAGE_DELAY;

/// Minimum allowed worker count.
pub const MIN_CONCURRENCY: usize = 1;

/// Maximum allowed worker count.
pub const MAX_CONCURRENCY: usize = 8;

/// Default worker count: one track at a time.
pub const DEFAULT_CONCURRENCY: usize = 1;

/// Default pause a worker takes after each acquisition attempt.
pub const DEFAULT_ITEM_DELAY: Duration = Duration::from_millis(1500);

/// Errors from the batch driver itself (never from individual items).
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error(
        "invalid concurrency value {value}: must be between {MIN_CONCURRENCY} and {MAX_CONCURRENCY}"
    )]
    InvalidConcurrency { value: usize },

    #[error("worker semaphore closed unexpectedly")]
    SemaphoreClosed,
}

/// Pacing and parallelism for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncSettings {
    pub concurrency: usize,
    pub item_delay: Duration,
    pub page_delay: Duration,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            item_delay: DEFAULT_ITEM_DELAY,
            page_delay: DEFAULT_PAGE_DELAY,
        }
    }
}

impl SyncSettings {
    /// Settings with no pacing, for tests and dry harnesses.
    #[must_use]
    pub fn unpaced(concurrency: usize) -> Self {
        Self {
            concurrency,
            item_delay: Duration::ZERO,
            page_delay: Duration::ZERO,
        }
    }
}
