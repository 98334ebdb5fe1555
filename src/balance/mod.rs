//! Family power balance engine
//!
//! Families that share a `name_identifier` are the same family living in
//! different universes, and should all carry the same `fam_power`.
//!
//! - `check` reports whether one group currently agrees, comparing every
//!   row against the first row of the group.
//! - `repair` rewrites every row of every group to the group's mean and
//!   reports which groups already agreed before the rewrite.
//!
//! The pure functions take any `FamilyReader` / `FamilyWriter`; the
//! `BalanceEngine` binds them to a `Database` and its transactions.

mod checker;
mod engine;
mod errors;
mod repairer;
mod report;

pub use checker::{check, Verdict};
pub use engine::BalanceEngine;
pub use errors::{BalanceError, BalanceResult};
pub use repairer::{plan_repair, repair, GroupPlan, RepairPlan};
pub use report::RepairReport;
