//! Outcome counters shared by the fetch and process pools

use std::sync::atomic::{AtomicU64, Ordering};

/// Per-run outcome counters.
///
/// Only ever incremented. Every job bumps exactly one of `transferred` or
/// `failed`; `bytes_fetched` tracks payload volume for the run summary.
#[derive(Debug, Default)]
pub struct OutcomeCounters {
    transferred: AtomicU64,
    failed: AtomicU64,
    bytes_fetched: AtomicU64,
}

impl OutcomeCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_transferred(&self) {
        self.transferred.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(counter = "transferred", "Counter incremented");
    }

    pub fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(counter = "failed", "Counter incremented");
    }

    pub fn record_bytes(&self, bytes: u64) {
        self.bytes_fetched.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            transferred: self.transferred.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            bytes_fetched: self.bytes_fetched.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterSnapshot {
    pub transferred: u64,
    pub failed: u64,
    pub bytes_fetched: u64,
}
