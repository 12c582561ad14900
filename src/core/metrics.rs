//! Per-predictor counters. No allocations, no locks, just atomics.

use core::sync::atomic::{AtomicU64, Ordering};

/// All counters are monotonic.
#[derive(Debug)]
pub struct PredictorMetrics {
    pub calls: AtomicU64,
    pub abstentions: AtomicU64,
    /// `try_predict` found the state held.
    pub contended: AtomicU64,
}

impl PredictorMetrics {
    pub const fn new() -> Self {
        Self {
            calls: AtomicU64::new(0),
            abstentions: AtomicU64::new(0),
            contended: AtomicU64::new(0),
        }
    }

    #[inline(always)]
    pub fn record_call(&self, abstained: bool) {
        self.calls.fetch_add(1, Ordering::Relaxed);
        if abstained {
            self.abstentions.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[inline(always)]
    pub fn record_contention(&self) {
        self.contended.fetch_add(1, Ordering::Relaxed);
    }

    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }

    pub fn abstentions(&self) -> u64 {
        self.abstentions.load(Ordering::Relaxed)
    }

    pub fn decisions(&self) -> u64 {
        self.calls().saturating_sub(self.abstentions())
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            calls: self.calls(),
            abstentions: self.abstentions(),
            contended: self.contended.load(Ordering::Relaxed),
        }
    }
}

impl Default for PredictorMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Immutable snapshot for export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub calls: u64,
    pub abstentions: u64,
    pub contended: u64,
}
