//! Persistence store for universes, families and people
//!
//! The store offers exactly what the balance engine and the resource layer
//! need:
//!
//! - point and filtered reads (`Tables`)
//! - snapshot-consistent read transactions (`ReadTxn`)
//! - exclusive all-or-nothing write transactions (`WriteTxn`)
//! - an optional durable image, checksummed and replaced atomically, owned
//!   by one handle at a time
//! - fault injection for exercising rollback paths

mod checksum;
mod database;
mod errors;
mod fault;
mod lock;
mod persist;
mod tables;
mod transaction;

pub use checksum::{compute_checksum, format_checksum, parse_checksum};
pub use database::Database;
pub use errors::{StoreError, StoreResult};
pub use fault::{points as fault_points, FaultPlan};
pub use lock::{lock_path, LOCK_FILE};
pub use persist::{image_path, IMAGE_FILE};
pub use tables::Tables;
pub use transaction::{FamilyReader, FamilyWriter, PowerUpdate, ReadTxn, WriteTxn};
