//! Global atomic counters for llmeval observability.
//!
//! Counters are incremented silently at the call site. Call
//! [`Metrics::flush`] to emit current values as a single
//! `tracing::info!` event at the end of a phase.

use std::sync::atomic::{AtomicU64, Ordering};

/// Global metrics singleton.
pub static METRICS: Metrics = Metrics::new();

/// Lock-free counters for one process.
pub struct Metrics {
    requests_sent: AtomicU64,
    requests_failed: AtomicU64,
    records_scored: AtomicU64,
    parse_failures: AtomicU64,
}

impl Metrics {
    const fn new() -> Self {
        Self {
            requests_sent: AtomicU64::new(0),
            requests_failed: AtomicU64::new(0),
            records_scored: AtomicU64::new(0),
            parse_failures: AtomicU64::new(0),
        }
    }

    /// Count one evaluation request (warm-ups excluded).
    pub fn inc_requests_sent(&self) {
        self.requests_sent.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "requests_sent", "counter incremented");
    }

    pub fn inc_requests_failed(&self) {
        self.requests_failed.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "requests_failed", "counter incremented");
    }

    pub fn inc_records_scored(&self) {
        self.records_scored.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "records_scored", "counter incremented");
    }

    /// Count one successful response whose content was not valid JSON.
    pub fn inc_parse_failures(&self) {
        self.parse_failures.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "parse_failures", "counter incremented");
    }

    /// Emit all current counter values as a single `info!` event.
    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            requests_sent = self.requests_sent(),
            requests_failed = self.requests_failed(),
            records_scored = self.records_scored(),
            parse_failures = self.parse_failures(),
        );
    }

    pub fn requests_sent(&self) -> u64 {
        self.requests_sent.load(Ordering::Relaxed)
    }

    pub fn requests_failed(&self) -> u64 {
        self.requests_failed.load(Ordering::Relaxed)
    }

    pub fn records_scored(&self) -> u64 {
        self.records_scored.load(Ordering::Relaxed)
    }

    pub fn parse_failures(&self) -> u64 {
        self.parse_failures.load(Ordering::Relaxed)
    }
}
