//! Metrics registry
//!
//! Counters only, monotonic, reset on process start. Relaxed ordering is
//! enough: readers only need eventually-exact totals.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Operational counters shared by the HTTP handlers and the balance engine
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    checks_run: AtomicU64,
    checks_unbalanced: AtomicU64,
    repairs_run: AtomicU64,
    repairs_failed: AtomicU64,
    groups_rebalanced: AtomicU64,
    rows_rewritten: AtomicU64,
    resources_created: AtomicU64,
    resources_deleted: AtomicU64,
}

impl MetricsRegistry {
    /// Create a new metrics registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    // Balance checker

    pub fn record_check(&self, balanced: bool) {
        self.checks_run.fetch_add(1, Ordering::Relaxed);
        if !balanced {
            self.checks_unbalanced.fetch_add(1, Ordering::Relaxed);
        }
    }

    // Balance repairer

    /// Count a committed repair and what it rewrote
    pub fn record_repair(&self, unbalanced_groups: u64, rows: u64) {
        self.repairs_run.fetch_add(1, Ordering::Relaxed);
        self.groups_rebalanced
            .fetch_add(unbalanced_groups, Ordering::Relaxed);
        self.rows_rewritten.fetch_add(rows, Ordering::Relaxed);
    }

    pub fn record_repair_failure(&self) {
        self.repairs_failed.fetch_add(1, Ordering::Relaxed);
    }

    // Resources

    pub fn increment_resources_created(&self) {
        self.resources_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_resources_deleted(&self) {
        self.resources_deleted.fetch_add(1, Ordering::Relaxed);
    }

    /// Get all metrics as a snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            checks_run: self.checks_run.load(Ordering::Relaxed),
            checks_unbalanced: self.checks_unbalanced.load(Ordering::Relaxed),
            repairs_run: self.repairs_run.load(Ordering::Relaxed),
            repairs_failed: self.repairs_failed.load(Ordering::Relaxed),
            groups_rebalanced: self.groups_rebalanced.load(Ordering::Relaxed),
            rows_rewritten: self.rows_rewritten.load(Ordering::Relaxed),
            resources_created: self.resources_created.load(Ordering::Relaxed),
            resources_deleted: self.resources_deleted.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time snapshot of all metrics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub checks_run: u64,
    pub checks_unbalanced: u64,
    pub repairs_run: u64,
    pub repairs_failed: u64,
    pub groups_rebalanced: u64,
    pub rows_rewritten: u64,
    pub resources_created: u64,
    pub resources_deleted: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_registry_has_zero_values() {
        let snapshot = MetricsRegistry::new().snapshot();
        assert_eq!(snapshot.checks_run, 0);
        assert_eq!(snapshot.repairs_run, 0);
        assert_eq!(snapshot.rows_rewritten, 0);
    }

    #[test]
    fn test_record_check() {
        let registry = MetricsRegistry::new();
        registry.record_check(true);
        registry.record_check(false);

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.checks_run, 2);
        assert_eq!(snapshot.checks_unbalanced, 1);
    }

    #[test]
    fn test_record_repair_accumulates() {
        let registry = MetricsRegistry::new();
        registry.record_repair(1, 3);
        registry.record_repair(0, 3);
        registry.record_repair_failure();

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.repairs_run, 2);
        assert_eq!(snapshot.repairs_failed, 1);
        assert_eq!(snapshot.groups_rebalanced, 1);
        assert_eq!(snapshot.rows_rewritten, 6);
    }

    #[test]
    fn test_snapshot_serializes_every_counter() {
        let json = serde_json::to_value(MetricsRegistry::new().snapshot()).unwrap();
        assert_eq!(json.as_object().unwrap().len(), 8);
        assert_eq!(json["repairs_run"], 0);
    }
}
