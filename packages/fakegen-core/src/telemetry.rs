//! Phase timing and per-declaration metrics (C10).
//!
//! Counters are plain atomics; phase timing rides on `tracing` spans so
//! that a host embedding this crate gets structured events for free rather
//! than hand-rolled `Instant` bookkeeping. The four levels in spec.md
//! §4.10 map onto `tracing::Level`; errors and warnings are always emitted
//! regardless of the configured level (enforced by the caller never gating
//! `tracing::warn!`/`tracing::error!` behind a level check).

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Quiet,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Maps onto the `tracing::Level` a span/event at this granularity
    /// should be filtered at.
    pub fn tracing_filter(&self) -> &'static str {
        match self {
            LogLevel::Quiet => "error",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Thread-safe counters for one compilation unit's pass: how many
/// declarations were observed, validated, rejected, generated, or skipped
/// by the incremental cache.
#[derive(Debug, Default)]
pub struct Counters {
    pub observed: AtomicU64,
    pub validated: AtomicU64,
    pub rejected: AtomicU64,
    pub generated: AtomicU64,
    pub skipped: AtomicU64,
}

impl Counters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn incr_observed(&self) {
        self.observed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn incr_validated(&self) {
        self.validated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn incr_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn incr_generated(&self) {
        self.generated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn incr_skipped(&self) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }

    /// Exact only after the pass completes; approximate (but never
    /// under-reported past the true value at read time) while concurrent
    /// writers are still active.
    pub fn snapshot(&self) -> Summary {
        Summary {
            observed: self.observed.load(Ordering::Relaxed),
            validated: self.validated.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            generated: self.generated.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Summary {
    pub observed: u64,
    pub validated: u64,
    pub rejected: u64,
    pub generated: u64,
    pub skipped: u64,
}

impl std::fmt::Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} observed, {} validated ({} rejected), {} generated, {} skipped",
            self.observed, self.validated, self.rejected, self.generated, self.skipped
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_ordering_matches_verbosity() {
        assert!(LogLevel::Quiet < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Debug);
        assert!(LogLevel::Debug < LogLevel::Trace);
    }

    #[test]
    fn counters_accumulate() {
        let counters = Counters::new();
        counters.incr_observed();
        counters.incr_observed();
        counters.incr_validated();
        counters.incr_generated();
        let summary = counters.snapshot();
        assert_eq!(summary.observed, 2);
        assert_eq!(summary.validated, 1);
        assert_eq!(summary.generated, 1);
        assert_eq!(summary.skipped, 0);
    }
}
