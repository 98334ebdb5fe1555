//! Balance Invariant Tests
//!
//! End-to-end checks of the checker and the repairer through a `Database`:
//! - verdicts for balanced, unbalanced and unknown groups
//! - repair rewrites every row to the floor of its group mean
//! - every group lands in exactly one report set
//! - a second repair changes nothing

use std::collections::BTreeSet;
use std::sync::Arc;

use multiverse::balance::{BalanceEngine, BalanceError, Verdict};
use multiverse::observability::MetricsRegistry;
use multiverse::store::{Database, Tables};

fn engine_with(rows: &[(i64, i64)]) -> BalanceEngine {
    let mut tables = Tables::new();
    for (name_identifier, power) in rows {
        tables.insert_family(*name_identifier, *power, None).unwrap();
    }
    BalanceEngine::new(
        Arc::new(Database::from_tables(tables)),
        Arc::new(MetricsRegistry::new()),
    )
}

fn powers_by_group(engine: &BalanceEngine, name_identifier: i64) -> Vec<i64> {
    engine
        .database()
        .snapshot()
        .unwrap()
        .families_by_name_identifier(name_identifier)
        .map(|f| f.fam_power)
        .collect()
}

// =============================================================================
// Checker
// =============================================================================

#[test]
fn test_check_equal_group_is_balanced() {
    let engine = engine_with(&[(1, 10), (1, 10), (1, 10)]);
    assert_eq!(engine.check(1).unwrap(), Verdict::Balanced);
}

#[test]
fn test_check_unequal_group_is_unbalanced() {
    let engine = engine_with(&[(2, 10), (2, 20)]);
    let verdict = engine.check(2).unwrap();
    assert_eq!(verdict, Verdict::Unbalanced);
    assert!(verdict.message().contains("NOT EQUAL"));
}

#[test]
fn test_check_compares_every_row_not_just_the_last() {
    // The odd row is in the middle; the first and last rows agree.
    let engine = engine_with(&[(3, 5), (3, 9), (3, 5)]);
    assert_eq!(engine.check(3).unwrap(), Verdict::Unbalanced);
}

#[test]
fn test_check_single_row_is_balanced() {
    let engine = engine_with(&[(4, -7)]);
    assert_eq!(engine.check(4).unwrap(), Verdict::Balanced);
}

#[test]
fn test_check_unknown_group_is_not_found() {
    let engine = engine_with(&[(1, 10)]);
    assert!(matches!(engine.check(99), Err(BalanceError::NotFound(99))));
}

#[test]
fn test_check_never_writes() {
    let engine = engine_with(&[(2, 10), (2, 20)]);
    let before = engine.database().snapshot().unwrap();
    engine.check(2).unwrap();
    assert_eq!(engine.database().snapshot().unwrap(), before);
}

// =============================================================================
// Repairer
// =============================================================================

#[test]
fn test_repair_mixed_table() {
    let engine = engine_with(&[(1, 10), (1, 10), (2, 10), (2, 20), (3, 1), (3, 2), (3, 4)]);

    let report = engine.repair().unwrap();

    assert_eq!(report.balanced, BTreeSet::from([1]));
    assert_eq!(report.unbalanced, BTreeSet::from([2, 3]));
    assert_eq!(report.rows_rewritten, 7);

    assert_eq!(powers_by_group(&engine, 1), vec![10, 10]);
    assert_eq!(powers_by_group(&engine, 2), vec![15, 15]);
    // (1 + 2 + 4) / 3 = 2 remainder 1
    assert_eq!(powers_by_group(&engine, 3), vec![2, 2, 2]);
}

#[test]
fn test_repair_two_groups_one_unbalanced() {
    let engine = engine_with(&[(7, 10), (7, 20), (9, 5)]);

    let report = engine.repair().unwrap();

    assert_eq!(report.balanced, BTreeSet::from([9]));
    assert_eq!(report.unbalanced, BTreeSet::from([7]));
    assert_eq!(powers_by_group(&engine, 7), vec![15, 15]);
    assert_eq!(powers_by_group(&engine, 9), vec![5]);
}

#[test]
fn test_repair_mean_rounds_toward_negative_infinity() {
    let engine = engine_with(&[(5, -1), (5, -2)]);
    engine.repair().unwrap();
    assert_eq!(powers_by_group(&engine, 5), vec![-2, -2]);
}

#[test]
fn test_repair_is_idempotent() {
    let engine = engine_with(&[(1, 3), (1, 8), (2, 4), (6, 0), (6, 100), (6, 7)]);

    let first = engine.repair().unwrap();
    let after_first = engine.database().snapshot().unwrap();

    let second = engine.repair().unwrap();
    let after_second = engine.database().snapshot().unwrap();

    assert_eq!(after_first, after_second);
    assert!(second.unbalanced.is_empty());

    let all: BTreeSet<i64> = first.balanced.union(&first.unbalanced).copied().collect();
    assert_eq!(second.balanced, all);
}

#[test]
fn test_repair_groups_are_exclusive_and_complete() {
    let engine = engine_with(&[(9, 1), (8, 1), (8, 2), (7, 4), (7, 4), (-1, 0)]);

    let report = engine.repair().unwrap();

    assert!(report.balanced.is_disjoint(&report.unbalanced));
    let reported: BTreeSet<i64> = report.balanced.union(&report.unbalanced).copied().collect();
    assert_eq!(reported, BTreeSet::from([-1, 7, 8, 9]));
}

#[test]
fn test_every_group_checks_balanced_after_repair() {
    let engine = engine_with(&[(1, 1), (1, 2), (2, 30), (2, -30), (2, 1)]);
    engine.repair().unwrap();
    assert_eq!(engine.check(1).unwrap(), Verdict::Balanced);
    assert_eq!(engine.check(2).unwrap(), Verdict::Balanced);
}

#[test]
fn test_repair_empty_table_returns_empty_report() {
    let engine = engine_with(&[]);
    let report = engine.repair().unwrap();
    assert!(report.is_empty());

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(
        json,
        serde_json::json!({"balanced_families": [], "unbalanced_families": []})
    );
}

#[test]
fn test_repair_leaves_other_columns_alone() {
    let mut tables = Tables::new();
    let universe = tables.insert_universe("Earth-616");
    let family = tables.insert_family(1, 10, Some(universe.id)).unwrap();
    tables.insert_family(1, 20, None).unwrap();
    tables.insert_person(4, Some(family.id)).unwrap();

    let db = Arc::new(Database::from_tables(tables));
    let engine = BalanceEngine::new(db.clone(), Arc::new(MetricsRegistry::new()));
    engine.repair().unwrap();

    let after = db.snapshot().unwrap();
    let repaired = after.family(family.id).unwrap();
    assert_eq!(repaired.fam_power, 15);
    assert_eq!(repaired.universe_id, Some(universe.id));
    assert_eq!(after.counts(), (1, 2, 1));
}
