//! Execution counters
//!
//! Rules, stages and pipelines each own their counters. Rules are copied per
//! stage when a state snapshot is resolved, so counters never alias across
//! stages.

use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic counter metric
#[derive(Debug, Default)]
pub struct Counter {
    value: AtomicU64,
}

impl Counter {
    /// Create a new counter
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment the counter
    pub fn inc(&self) {
        self.add(1);
    }

    /// Add a value to the counter
    pub fn add(&self, value: u64) {
        self.value.fetch_add(value, Ordering::Relaxed);
    }

    /// Get the current value
    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}

/// Per-rule execution counters
#[derive(Debug, Default)]
pub struct RuleMetrics {
    pub evaluated: Counter,
    pub matched: Counter,
    pub not_matched: Counter,
    pub executed: Counter,
    pub failed: Counter,
}

/// Point-in-time copy of [`RuleMetrics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuleMetricsSnapshot {
    pub evaluated: u64,
    pub matched: u64,
    pub not_matched: u64,
    pub executed: u64,
    pub failed: u64,
}

impl RuleMetrics {
    pub fn snapshot(&self) -> RuleMetricsSnapshot {
        RuleMetricsSnapshot {
            evaluated: self.evaluated.get(),
            matched: self.matched.get(),
            not_matched: self.not_matched.get(),
            executed: self.executed.get(),
            failed: self.failed.get(),
        }
    }
}
