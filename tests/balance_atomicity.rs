//! Repair Atomicity Tests
//!
//! A repair that fails at any point leaves every row exactly as it was,
//! both in memory and in the on-disk image.

use std::sync::Arc;

use multiverse::balance::{BalanceEngine, BalanceError};
use multiverse::observability::MetricsRegistry;
use multiverse::store::{image_path, Database, FaultPlan, StoreError, Tables};
use tempfile::TempDir;

fn unbalanced_tables() -> Tables {
    let mut tables = Tables::new();
    for (name_identifier, power) in [(1, 10), (1, 30), (2, 5), (2, 6), (3, 4), (3, 4)] {
        tables.insert_family(name_identifier, power, None).unwrap();
    }
    tables
}

fn engine(db: &Arc<Database>) -> (BalanceEngine, Arc<MetricsRegistry>) {
    let metrics = Arc::new(MetricsRegistry::new());
    (BalanceEngine::new(db.clone(), metrics.clone()), metrics)
}

// =============================================================================
// In-memory store
// =============================================================================

#[test]
fn test_write_failure_midway_changes_nothing() {
    let db = Arc::new(Database::from_tables(unbalanced_tables()));
    let before = db.snapshot().unwrap();
    let (engine, metrics) = engine(&db);

    // Three of six rows are written before the failure.
    db.arm_faults(FaultPlan::fail_after_writes(3));
    let result = engine.repair();

    assert!(matches!(result, Err(BalanceError::StoreUnavailable(_))));
    assert_eq!(db.snapshot().unwrap(), before);
    assert_eq!(metrics.snapshot().repairs_failed, 1);
    assert_eq!(metrics.snapshot().repairs_run, 0);
}

#[test]
fn test_every_failure_point_changes_nothing() {
    let plans = [
        FaultPlan::fail_on_begin(),
        FaultPlan::fail_after_writes(0),
        FaultPlan::fail_after_writes(5),
        FaultPlan::fail_on_commit(),
    ];

    for plan in plans {
        let db = Arc::new(Database::from_tables(unbalanced_tables()));
        let before = db.snapshot().unwrap();
        let (engine, _) = engine(&db);

        db.arm_faults(plan);
        assert!(engine.repair().is_err(), "{:?} should fail the repair", plan);
        db.clear_faults();
        assert_eq!(db.snapshot().unwrap(), before, "{:?} leaked writes", plan);
    }
}

#[test]
fn test_repair_succeeds_after_fault_is_cleared() {
    let db = Arc::new(Database::from_tables(unbalanced_tables()));
    let (engine, _) = engine(&db);

    db.arm_faults(FaultPlan::fail_on_commit());
    assert!(engine.repair().is_err());

    db.clear_faults();
    let report = engine.repair().unwrap();
    assert_eq!(report.unbalanced.len(), 2);
    assert_eq!(report.balanced.len(), 1);
}

// =============================================================================
// Durable store
// =============================================================================

fn durable(dir: &TempDir) -> Arc<Database> {
    let db = Database::open(dir.path()).unwrap();
    {
        let mut txn = db.begin_write().unwrap();
        for (name_identifier, power) in [(1, 10), (1, 30), (2, 5), (2, 6)] {
            txn.write(|t| t.insert_family(name_identifier, power, None))
                .unwrap();
        }
        txn.commit().unwrap();
    }
    Arc::new(db)
}

#[test]
fn test_failed_commit_leaves_image_untouched() {
    let dir = TempDir::new().unwrap();
    let db = durable(&dir);
    let image_before = std::fs::read(image_path(dir.path())).unwrap();
    let (engine, _) = engine(&db);

    db.arm_faults(FaultPlan::fail_on_commit());
    assert!(engine.repair().is_err());

    let image_after = std::fs::read(image_path(dir.path())).unwrap();
    assert_eq!(image_before, image_after);

    db.clear_faults();
    let in_memory = db.snapshot().unwrap();
    drop(engine);
    drop(db);

    let reopened = Database::open(dir.path()).unwrap();
    assert_eq!(reopened.snapshot().unwrap(), in_memory);
}

#[test]
fn test_committed_repair_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let db = durable(&dir);
    let (engine, _) = engine(&db);

    engine.repair().unwrap();
    drop(engine);
    drop(db);

    let reopened = Database::open(dir.path()).unwrap();
    let powers: Vec<i64> = reopened
        .snapshot()
        .unwrap()
        .families()
        .map(|f| f.fam_power)
        .collect();
    assert_eq!(powers, vec![20, 20, 5, 5]);
}

#[test]
fn test_repair_is_not_lost_to_a_second_handle() {
    let dir = TempDir::new().unwrap();
    let db = durable(&dir);
    let (engine, _) = engine(&db);

    // A second handle on the same dir is refused, so it can never repair a
    // stale copy or overwrite this handle's repair.
    let err = Database::open(dir.path()).unwrap_err();
    assert!(matches!(err, StoreError::Unavailable(_)));

    engine.repair().unwrap();
    {
        let mut txn = db.begin_write().unwrap();
        txn.write(|t| Ok(t.insert_universe("Alpha"))).unwrap();
        txn.commit().unwrap();
    }
    drop(engine);
    drop(db);

    let reopened = Database::open(dir.path()).unwrap();
    let tables = reopened.snapshot().unwrap();
    let powers: Vec<i64> = tables.families().map(|f| f.fam_power).collect();
    assert_eq!(powers, vec![20, 20, 5, 5]);
    assert_eq!(tables.counts(), (1, 4, 0));
}
