//! Repair report

use std::collections::BTreeSet;

use serde::Serialize;

use crate::model::NameIdentifier;

/// Outcome of one repair run.
///
/// Every group present in the family table lands in exactly one of the two
/// sets. Sets serialize as ascending arrays.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RepairReport {
    /// Groups whose rows all held the mean before the repair
    #[serde(rename = "balanced_families")]
    pub balanced: BTreeSet<NameIdentifier>,

    /// Groups with at least one row that had to be rewritten
    #[serde(rename = "unbalanced_families")]
    pub unbalanced: BTreeSet<NameIdentifier>,

    /// Rows written back by the repair
    #[serde(skip)]
    pub rows_rewritten: usize,
}

impl RepairReport {
    pub fn is_empty(&self) -> bool {
        self.balanced.is_empty() && self.unbalanced.is_empty()
    }

    /// Unbalanced keys joined for a log field, e.g. `7,12`
    pub fn unbalanced_list(&self) -> String {
        join_keys(&self.unbalanced)
    }

    pub fn balanced_list(&self) -> String {
        join_keys(&self.balanced)
    }
}

fn join_keys(keys: &BTreeSet<NameIdentifier>) -> String {
    keys.iter()
        .map(|k| k.to_string())
        .collect::<Vec<_>>()
        .join(",")
}
