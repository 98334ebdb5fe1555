//! Read-only balance check for one family group

use serde::Serialize;

use super::errors::{BalanceError, BalanceResult};
use crate::model::NameIdentifier;
use crate::store::FamilyReader;

/// Whether every row of a group currently has the same power
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Balanced,
    Unbalanced,
}

impl Verdict {
    /// Human-readable verdict returned by the check endpoint
    pub fn message(&self) -> &'static str {
        match self {
            Verdict::Balanced => "Power for the given Family is EQUAL in all universe (Balanced)",
            Verdict::Unbalanced => {
                "Power for the given Family is NOT EQUAL in all universe (Unbalanced)"
            }
        }
    }

    pub fn is_balanced(&self) -> bool {
        matches!(self, Verdict::Balanced)
    }
}

/// Compare every row of the group against the first row in store order.
///
/// The baseline is the first row's current power, not the group mean.
pub fn check<R>(reader: &R, name_identifier: NameIdentifier) -> BalanceResult<Verdict>
where
    R: FamilyReader + ?Sized,
{
    let families = reader.fetch_families_by_name_identifier(name_identifier)?;

    let baseline = families
        .first()
        .map(|f| f.fam_power)
        .ok_or(BalanceError::NotFound(name_identifier))?;

    if families.iter().all(|f| f.fam_power == baseline) {
        Ok(Verdict::Balanced)
    } else {
        Ok(Verdict::Unbalanced)
    }
}
