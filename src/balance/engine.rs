//! Balance engine bound to a database
//!
//! Opens the right kind of transaction for each operation, records
//! metrics and emits the structured log lines.

use std::sync::Arc;

use super::checker::{self, Verdict};
use super::errors::BalanceResult;
use super::repairer;
use super::report::RepairReport;
use crate::model::NameIdentifier;
use crate::observability::{log_event, log_event_with_fields, Event, MetricsRegistry};
use crate::store::Database;

/// Entry point for check and repair
#[derive(Debug, Clone)]
pub struct BalanceEngine {
    db: Arc<Database>,
    metrics: Arc<MetricsRegistry>,
}

impl BalanceEngine {
    pub fn new(db: Arc<Database>, metrics: Arc<MetricsRegistry>) -> Self {
        Self { db, metrics }
    }

    pub fn database(&self) -> &Arc<Database> {
        &self.db
    }

    /// Check one group through a read transaction. Never writes.
    pub fn check(&self, name_identifier: NameIdentifier) -> BalanceResult<Verdict> {
        let txn = self.db.begin_read()?;
        let verdict = checker::check(&txn, name_identifier)?;

        self.metrics.record_check(verdict.is_balanced());
        log_event_with_fields(
            Event::BalanceChecked,
            &[
                ("name_identifier", &name_identifier.to_string()),
                ("balanced", if verdict.is_balanced() { "true" } else { "false" }),
            ],
        );

        Ok(verdict)
    }

    /// Repair every group and commit, or change nothing.
    pub fn repair(&self) -> BalanceResult<RepairReport> {
        log_event(Event::RepairBegin);

        match self.repair_and_commit() {
            Ok(report) => {
                self.metrics
                    .record_repair(report.unbalanced.len() as u64, report.rows_rewritten as u64);
                log_event_with_fields(
                    Event::RepairComplete,
                    &[
                        ("balanced", &report.balanced_list()),
                        ("rows", &report.rows_rewritten.to_string()),
                        ("unbalanced", &report.unbalanced_list()),
                    ],
                );
                Ok(report)
            }
            Err(e) => {
                self.metrics.record_repair_failure();
                log_event_with_fields(Event::RepairFailed, &[("reason", &e.to_string())]);
                Err(e)
            }
        }
    }

    fn repair_and_commit(&self) -> BalanceResult<RepairReport> {
        let mut txn = self.db.begin_write()?;
        let report = repairer::repair(&mut txn)?;
        txn.commit()?;
        Ok(report)
    }
}
