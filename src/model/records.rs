//! Universe, Family and Person rows

use serde::{Deserialize, Serialize};

/// Primary key of a universe row
pub type UniverseId = u64;

/// Primary key of a family row
pub type FamilyId = u64;

/// Primary key of a person row
pub type PersonId = u64;

/// Grouping key shared by the same family across universes
pub type NameIdentifier = i64;

/// Stored numeric type of `power` and `fam_power`
pub type Power = i64;

/// A universe: a named container of families
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Universe {
    pub id: UniverseId,
    pub name: String,
}

/// A family row, one per universe it lives in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Family {
    pub id: FamilyId,
    /// Accumulated strength. Defaults to 0.
    #[serde(default)]
    pub fam_power: Power,
    pub name_identifier: NameIdentifier,
    #[serde(default)]
    pub universe_id: Option<UniverseId>,
}

impl Family {
    /// Create a family with zero power
    pub fn new(id: FamilyId, name_identifier: NameIdentifier) -> Self {
        Self {
            id,
            fam_power: 0,
            name_identifier,
            universe_id: None,
        }
    }

    pub fn with_power(mut self, fam_power: Power) -> Self {
        self.fam_power = fam_power;
        self
    }

    pub fn in_universe(mut self, universe_id: UniverseId) -> Self {
        self.universe_id = Some(universe_id);
        self
    }
}

/// A person, optionally belonging to a family
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub power: Power,
    #[serde(default)]
    pub family_id: Option<FamilyId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_defaults_power_to_zero() {
        let family: Family =
            serde_json::from_str(r#"{"id": 4, "name_identifier": 7}"#).unwrap();
        assert_eq!(family.fam_power, 0);
        assert_eq!(family.universe_id, None);
    }

    #[test]
    fn test_family_builder() {
        let family = Family::new(1, 7).with_power(10).in_universe(2);
        assert_eq!(family.fam_power, 10);
        assert_eq!(family.name_identifier, 7);
        assert_eq!(family.universe_id, Some(2));
    }
}
