//! Group-mean repair over the whole family table
//!
//! One pass groups rows by `name_identifier` and accumulates sum, count and
//! the spread of pre-repair values. The mean is the floor of sum / count in
//! the stored integer type. A group is balanced when every pre-repair value
//! already equals that mean, which holds exactly when all values are equal.
//! Every row of every group is then written back as one batch.

use std::collections::BTreeMap;

use super::errors::BalanceResult;
use super::report::RepairReport;
use crate::model::{Family, NameIdentifier, Power};
use crate::store::{FamilyWriter, PowerUpdate};

/// Running totals for one group
#[derive(Debug, Clone, Copy)]
struct GroupTotals {
    sum: i128,
    count: u64,
    min: Power,
    max: Power,
}

impl GroupTotals {
    fn first(power: Power) -> Self {
        Self {
            sum: power as i128,
            count: 1,
            min: power,
            max: power,
        }
    }

    fn add(&mut self, power: Power) {
        self.sum += power as i128;
        self.count += 1;
        self.min = self.min.min(power);
        self.max = self.max.max(power);
    }

    /// Floor of the arithmetic mean. Always within [min, max], so it fits.
    fn mean(&self) -> Power {
        self.sum.div_euclid(self.count as i128) as Power
    }

    fn was_balanced(&self) -> bool {
        self.min == self.max
    }
}

/// Per-group result of planning a repair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupPlan {
    pub rows: u64,
    pub mean: Power,
    pub balanced: bool,
}

/// Everything a repair will write, computed without touching the store
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepairPlan {
    pub groups: BTreeMap<NameIdentifier, GroupPlan>,
    pub updates: Vec<PowerUpdate>,
}

impl RepairPlan {
    pub fn report(&self) -> RepairReport {
        let mut report = RepairReport {
            rows_rewritten: self.updates.len(),
            ..Default::default()
        };
        for (key, group) in &self.groups {
            if group.balanced {
                report.balanced.insert(*key);
            } else {
                report.unbalanced.insert(*key);
            }
        }
        report
    }
}

/// Compute group means and the batch of power updates for `families`.
pub fn plan_repair(families: &[Family]) -> RepairPlan {
    let mut totals: BTreeMap<NameIdentifier, GroupTotals> = BTreeMap::new();
    for family in families {
        totals
            .entry(family.name_identifier)
            .and_modify(|t| t.add(family.fam_power))
            .or_insert_with(|| GroupTotals::first(family.fam_power));
    }

    let groups: BTreeMap<NameIdentifier, GroupPlan> = totals
        .iter()
        .map(|(key, t)| {
            let plan = GroupPlan {
                rows: t.count,
                mean: t.mean(),
                balanced: t.was_balanced(),
            };
            (*key, plan)
        })
        .collect();

    let updates = families
        .iter()
        .filter_map(|family| {
            groups.get(&family.name_identifier).map(|group| PowerUpdate {
                family_id: family.id,
                fam_power: group.mean,
            })
        })
        .collect();

    RepairPlan { groups, updates }
}

/// Rewrite every family row to its group mean inside `txn`.
///
/// Reads all rows once, writes all of them back in one batch. The caller
/// owns the transaction and decides whether to commit; on error nothing
/// should be committed.
pub fn repair<W>(txn: &mut W) -> BalanceResult<RepairReport>
where
    W: FamilyWriter + ?Sized,
{
    let families = txn.fetch_all_families()?;
    let plan = plan_repair(&families);
    txn.update_family_powers(&plan.updates)?;
    Ok(plan.report())
}
