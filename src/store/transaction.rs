//! Read and write transactions
//!
//! A `ReadTxn` holds the shared table lock for its whole lifetime, so every
//! read inside it sees the same committed state. A `WriteTxn` holds the
//! exclusive lock and works on a staged copy of the tables; `commit`
//! persists the staged copy and publishes it, anything else discards it.
//! Holding the exclusive lock across read-modify-write serializes writers.

use std::path::Path;
use std::sync::{RwLockReadGuard, RwLockWriteGuard};

use uuid::Uuid;

use super::errors::StoreResult;
use super::fault::FaultPlan;
use super::persist;
use super::tables::Tables;
use crate::model::{Family, FamilyId, NameIdentifier, Power};
use crate::observability::{log_event_with_fields, Event};

/// Read access to family rows
pub trait FamilyReader {
    /// Every family row in store order
    fn fetch_all_families(&self) -> StoreResult<Vec<Family>>;

    /// Family rows sharing `name_identifier`, in store order
    fn fetch_families_by_name_identifier(
        &self,
        name_identifier: NameIdentifier,
    ) -> StoreResult<Vec<Family>>;
}

/// Batch write access to family power
pub trait FamilyWriter: FamilyReader {
    /// Apply every update or fail; on failure the transaction must be dropped.
    fn update_family_powers(&mut self, updates: &[PowerUpdate]) -> StoreResult<()>;
}

/// New `fam_power` for one family row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerUpdate {
    pub family_id: FamilyId,
    pub fam_power: Power,
}

impl FamilyReader for Tables {
    fn fetch_all_families(&self) -> StoreResult<Vec<Family>> {
        Ok(self.families().cloned().collect())
    }

    fn fetch_families_by_name_identifier(
        &self,
        name_identifier: NameIdentifier,
    ) -> StoreResult<Vec<Family>> {
        Ok(self
            .families_by_name_identifier(name_identifier)
            .cloned()
            .collect())
    }
}

/// Consistent read-only view of the tables
pub struct ReadTxn<'a> {
    tables: RwLockReadGuard<'a, Tables>,
}

impl<'a> ReadTxn<'a> {
    pub(crate) fn new(tables: RwLockReadGuard<'a, Tables>) -> Self {
        Self { tables }
    }

    pub fn tables(&self) -> &Tables {
        &self.tables
    }
}

impl FamilyReader for ReadTxn<'_> {
    fn fetch_all_families(&self) -> StoreResult<Vec<Family>> {
        self.tables.fetch_all_families()
    }

    fn fetch_families_by_name_identifier(
        &self,
        name_identifier: NameIdentifier,
    ) -> StoreResult<Vec<Family>> {
        self.tables.fetch_families_by_name_identifier(name_identifier)
    }
}

/// Exclusive read-modify-write transaction
pub struct WriteTxn<'a> {
    id: Uuid,
    guard: RwLockWriteGuard<'a, Tables>,
    staged: Tables,
    image: Option<&'a Path>,
    faults: FaultPlan,
    writes: usize,
}

impl<'a> WriteTxn<'a> {
    pub(crate) fn new(
        guard: RwLockWriteGuard<'a, Tables>,
        image: Option<&'a Path>,
        faults: FaultPlan,
    ) -> Self {
        let staged = guard.clone();
        Self {
            id: Uuid::new_v4(),
            guard,
            staged,
            image,
            faults,
            writes: 0,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Staged tables, including this transaction's uncommitted writes
    pub fn tables(&self) -> &Tables {
        &self.staged
    }

    /// Number of row writes applied so far
    pub fn writes(&self) -> usize {
        self.writes
    }

    /// Apply one row write to the staged tables.
    pub fn write<T, F>(&mut self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&mut Tables) -> StoreResult<T>,
    {
        self.faults.check_write(self.writes)?;
        let out = f(&mut self.staged)?;
        self.writes += 1;
        Ok(out)
    }

    /// Persist and publish the staged tables.
    ///
    /// The image is written before the in-memory tables are replaced, so a
    /// failed persist leaves both disk and memory at the previous commit.
    pub fn commit(mut self) -> StoreResult<()> {
        let txn_id = self.id.to_string();

        if let Err(e) = self.faults.check_commit() {
            log_event_with_fields(Event::TxnCommitFailed, &[("txn_id", &txn_id), ("reason", &e.to_string())]);
            return Err(e);
        }

        if let Some(path) = self.image {
            if let Err(e) = persist::write_image(path, &self.staged) {
                log_event_with_fields(Event::TxnCommitFailed, &[("txn_id", &txn_id), ("reason", &e.to_string())]);
                return Err(e);
            }
        }

        *self.guard = std::mem::take(&mut self.staged);
        Ok(())
    }

    /// Discard the staged tables
    pub fn rollback(self) {
        log_event_with_fields(
            Event::TxnRolledBack,
            &[("txn_id", &self.id.to_string()), ("writes", &self.writes.to_string())],
        );
    }
}

impl FamilyReader for WriteTxn<'_> {
    fn fetch_all_families(&self) -> StoreResult<Vec<Family>> {
        self.staged.fetch_all_families()
    }

    fn fetch_families_by_name_identifier(
        &self,
        name_identifier: NameIdentifier,
    ) -> StoreResult<Vec<Family>> {
        self.staged.fetch_families_by_name_identifier(name_identifier)
    }
}

impl FamilyWriter for WriteTxn<'_> {
    fn update_family_powers(&mut self, updates: &[PowerUpdate]) -> StoreResult<()> {
        for update in updates {
            self.write(|tables| tables.set_family_power(update.family_id, update.fam_power))?;
        }
        Ok(())
    }
}
