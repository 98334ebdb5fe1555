//! Database handle owning the tables

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};

use super::errors::{StoreError, StoreResult};
use super::fault::FaultPlan;
use super::lock::DirLock;
use super::persist;
use super::tables::Tables;
use super::transaction::{ReadTxn, WriteTxn};

/// Owner of the universe, family and person tables.
///
/// Shared across request handlers behind an `Arc`. All access goes through
/// `begin_read` / `begin_write`.
#[derive(Debug)]
pub struct Database {
    tables: RwLock<Tables>,
    image: Option<PathBuf>,
    faults: Mutex<FaultPlan>,
    _lock: Option<DirLock>,
}

impl Database {
    /// Ephemeral store; nothing touches disk
    pub fn in_memory() -> Self {
        Self::from_tables(Tables::new())
    }

    /// Ephemeral store pre-loaded with `tables`
    pub fn from_tables(tables: Tables) -> Self {
        Self {
            tables: RwLock::new(tables),
            image: None,
            faults: Mutex::new(FaultPlan::none()),
            _lock: None,
        }
    }

    /// Open a durable store in `data_dir`.
    ///
    /// The directory must exist and must not be held by another handle; the
    /// returned `Database` owns it until dropped. A missing image starts
    /// empty; a corrupted image is an error, never silently replaced.
    pub fn open(data_dir: &Path) -> StoreResult<Self> {
        let meta = fs::metadata(data_dir).map_err(|e| StoreError::io_at(data_dir, e))?;
        if !meta.is_dir() {
            return Err(StoreError::Unavailable(format!(
                "data_dir {} is not a directory",
                data_dir.display()
            )));
        }

        let lock = DirLock::acquire(data_dir)?;
        let image = persist::image_path(data_dir);
        let tables = persist::read_image(&image)?.unwrap_or_default();

        Ok(Self {
            tables: RwLock::new(tables),
            image: Some(image),
            faults: Mutex::new(FaultPlan::none()),
            _lock: Some(lock),
        })
    }

    pub fn is_durable(&self) -> bool {
        self.image.is_some()
    }

    /// Begin a read transaction over the last committed state
    pub fn begin_read(&self) -> StoreResult<ReadTxn<'_>> {
        self.current_faults()?.check_begin()?;
        let guard = self.tables.read().map_err(|_| StoreError::poisoned())?;
        Ok(ReadTxn::new(guard))
    }

    /// Begin an exclusive write transaction. Blocks while another writer
    /// or any reader holds the tables.
    pub fn begin_write(&self) -> StoreResult<WriteTxn<'_>> {
        let faults = self.current_faults()?;
        faults.check_begin()?;
        let guard = self.tables.write().map_err(|_| StoreError::poisoned())?;
        Ok(WriteTxn::new(guard, self.image.as_deref(), faults))
    }

    /// Copy of the last committed tables
    pub fn snapshot(&self) -> StoreResult<Tables> {
        Ok(self.begin_read()?.tables().clone())
    }

    /// Arm a fault plan for every transaction that begins from now on
    pub fn arm_faults(&self, plan: FaultPlan) {
        match self.faults.lock() {
            Ok(mut faults) => *faults = plan,
            Err(poisoned) => *poisoned.into_inner() = plan,
        }
    }

    pub fn clear_faults(&self) {
        self.arm_faults(FaultPlan::none());
    }

    fn current_faults(&self) -> StoreResult<FaultPlan> {
        self.faults
            .lock()
            .map(|faults| *faults)
            .map_err(|_| StoreError::poisoned())
    }
}

impl Default for Database {
    fn default() -> Self {
        Self::in_memory()
    }
}
