//! Fault injection for store transactions
//!
//! A `FaultPlan` is armed on a `Database` and copied into every transaction
//! that begins while it is armed. Injected faults surface as
//! `StoreError::Unavailable`, the same way a lost connection would, so the
//! callers' rollback paths can be exercised without a real outage.
//!
//! ```ignore
//! db.arm_faults(FaultPlan::fail_after_writes(1));
//! assert!(engine.repair().is_err());
//! db.clear_faults();
//! ```

use super::errors::{StoreError, StoreResult};

/// Named points where a transaction can be made to fail
pub mod points {
    pub const BEGIN: &str = "txn_begin";
    pub const WRITE: &str = "txn_write";
    pub const COMMIT: &str = "txn_commit";

    /// Get all fault point names
    pub fn all() -> &'static [&'static str] {
        &[BEGIN, WRITE, COMMIT]
    }
}

/// Which transaction steps should fail
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FaultPlan {
    fail_on_begin: bool,
    fail_after_writes: Option<usize>,
    fail_on_commit: bool,
}

impl FaultPlan {
    /// A plan that injects nothing
    pub fn none() -> Self {
        Self::default()
    }

    /// Every transaction fails to begin
    pub fn fail_on_begin() -> Self {
        Self {
            fail_on_begin: true,
            ..Self::default()
        }
    }

    /// The first `n` row writes of a transaction succeed, the next one fails
    pub fn fail_after_writes(n: usize) -> Self {
        Self {
            fail_after_writes: Some(n),
            ..Self::default()
        }
    }

    /// Writes succeed but the commit fails
    pub fn fail_on_commit() -> Self {
        Self {
            fail_on_commit: true,
            ..Self::default()
        }
    }

    pub fn is_armed(&self) -> bool {
        *self != Self::none()
    }

    pub(crate) fn check_begin(&self) -> StoreResult<()> {
        if self.fail_on_begin {
            return Err(injected(points::BEGIN));
        }
        Ok(())
    }

    /// `completed` is the number of row writes already applied in the transaction
    pub(crate) fn check_write(&self, completed: usize) -> StoreResult<()> {
        match self.fail_after_writes {
            Some(limit) if completed >= limit => Err(injected(points::WRITE)),
            _ => Ok(()),
        }
    }

    pub(crate) fn check_commit(&self) -> StoreResult<()> {
        if self.fail_on_commit {
            return Err(injected(points::COMMIT));
        }
        Ok(())
    }
}

fn injected(point: &str) -> StoreError {
    StoreError::Unavailable(format!("injected fault at {}", point))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_never_fails() {
        let plan = FaultPlan::none();
        assert!(!plan.is_armed());
        assert!(plan.check_begin().is_ok());
        assert!(plan.check_write(1_000).is_ok());
        assert!(plan.check_commit().is_ok());
    }

    #[test]
    fn test_fail_after_writes_counts() {
        let plan = FaultPlan::fail_after_writes(2);
        assert!(plan.check_write(0).is_ok());
        assert!(plan.check_write(1).is_ok());
        assert!(plan.check_write(2).is_err());
    }

    #[test]
    fn test_injected_error_names_point() {
        let err = FaultPlan::fail_on_commit().check_commit().unwrap_err();
        assert!(err.to_string().contains("txn_commit"));
        assert!(err.is_unavailable());
    }

    #[test]
    fn test_point_names_are_lowercase_with_underscores() {
        for point in points::all() {
            assert!(point.chars().all(|c| c.is_lowercase() || c == '_'));
        }
    }
}
