//! In-memory tables
//!
//! Rows are kept in id order, so every scan returns rows in ascending
//! primary key order. That order is the "store order" callers observe.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::errors::{StoreError, StoreResult};
use crate::model::{
    Family, FamilyId, NameIdentifier, Person, PersonId, Power, RecordKind, Universe, UniverseId,
};

/// Auto-increment counters, one per table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct NextIds {
    universe: u64,
    family: u64,
    person: u64,
}

fn allocate(counter: &mut u64) -> u64 {
    *counter += 1;
    *counter
}

/// The three tables plus their id counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tables {
    universes: BTreeMap<UniverseId, Universe>,
    families: BTreeMap<FamilyId, Family>,
    people: BTreeMap<PersonId, Person>,
    next_ids: NextIds,
}

impl Tables {
    pub fn new() -> Self {
        Self::default()
    }

    // ==================
    // Universes
    // ==================

    pub fn universes(&self) -> impl Iterator<Item = &Universe> {
        self.universes.values()
    }

    pub fn universe(&self, id: UniverseId) -> StoreResult<&Universe> {
        self.universes
            .get(&id)
            .ok_or_else(|| StoreError::not_found(RecordKind::Universe, id))
    }

    pub fn insert_universe(&mut self, name: impl Into<String>) -> Universe {
        let id = allocate(&mut self.next_ids.universe);
        let universe = Universe {
            id,
            name: name.into(),
        };
        self.universes.insert(id, universe.clone());
        universe
    }

    pub fn rename_universe(&mut self, id: UniverseId, name: impl Into<String>) -> StoreResult<Universe> {
        let universe = self
            .universes
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found(RecordKind::Universe, id))?;
        universe.name = name.into();
        Ok(universe.clone())
    }

    /// Delete a universe and, by cascade, its families and their people.
    pub fn delete_universe(&mut self, id: UniverseId) -> StoreResult<Universe> {
        let universe = self
            .universes
            .remove(&id)
            .ok_or_else(|| StoreError::not_found(RecordKind::Universe, id))?;

        let doomed: Vec<FamilyId> = self
            .families
            .values()
            .filter(|f| f.universe_id == Some(id))
            .map(|f| f.id)
            .collect();
        for family_id in doomed {
            self.delete_family(family_id)?;
        }

        Ok(universe)
    }

    // ==================
    // Families
    // ==================

    pub fn families(&self) -> impl Iterator<Item = &Family> {
        self.families.values()
    }

    pub fn family(&self, id: FamilyId) -> StoreResult<&Family> {
        self.families
            .get(&id)
            .ok_or_else(|| StoreError::not_found(RecordKind::Family, id))
    }

    pub fn families_by_name_identifier(
        &self,
        name_identifier: NameIdentifier,
    ) -> impl Iterator<Item = &Family> {
        self.families
            .values()
            .filter(move |f| f.name_identifier == name_identifier)
    }

    pub fn families_in_universe(&self, universe_id: UniverseId) -> impl Iterator<Item = &Family> {
        self.families
            .values()
            .filter(move |f| f.universe_id == Some(universe_id))
    }

    pub fn insert_family(
        &mut self,
        name_identifier: NameIdentifier,
        fam_power: Power,
        universe_id: Option<UniverseId>,
    ) -> StoreResult<Family> {
        if let Some(universe_id) = universe_id {
            self.universe(universe_id)?;
        }
        let id = allocate(&mut self.next_ids.family);
        let family = Family {
            id,
            fam_power,
            name_identifier,
            universe_id,
        };
        self.families.insert(id, family.clone());
        Ok(family)
    }

    /// Replace an existing family row. The id must already exist.
    pub fn update_family(&mut self, family: Family) -> StoreResult<Family> {
        if let Some(universe_id) = family.universe_id {
            self.universe(universe_id)?;
        }
        let slot = self
            .families
            .get_mut(&family.id)
            .ok_or_else(|| StoreError::not_found(RecordKind::Family, family.id))?;
        *slot = family.clone();
        Ok(family)
    }

    pub fn set_family_power(&mut self, id: FamilyId, fam_power: Power) -> StoreResult<()> {
        let family = self
            .families
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found(RecordKind::Family, id))?;
        family.fam_power = fam_power;
        Ok(())
    }

    /// Delete a family and, by cascade, its people.
    pub fn delete_family(&mut self, id: FamilyId) -> StoreResult<Family> {
        let family = self
            .families
            .remove(&id)
            .ok_or_else(|| StoreError::not_found(RecordKind::Family, id))?;
        self.people.retain(|_, p| p.family_id != Some(id));
        Ok(family)
    }

    // ==================
    // People
    // ==================

    pub fn people(&self) -> impl Iterator<Item = &Person> {
        self.people.values()
    }

    pub fn person(&self, id: PersonId) -> StoreResult<&Person> {
        self.people
            .get(&id)
            .ok_or_else(|| StoreError::not_found(RecordKind::Person, id))
    }

    pub fn people_in_family(&self, family_id: FamilyId) -> impl Iterator<Item = &Person> {
        self.people
            .values()
            .filter(move |p| p.family_id == Some(family_id))
    }

    pub fn insert_person(&mut self, power: Power, family_id: Option<FamilyId>) -> StoreResult<Person> {
        if let Some(family_id) = family_id {
            self.family(family_id)?;
        }
        let id = allocate(&mut self.next_ids.person);
        let person = Person {
            id,
            power,
            family_id,
        };
        self.people.insert(id, person.clone());
        Ok(person)
    }

    /// Replace an existing person row. The id must already exist.
    pub fn update_person(&mut self, person: Person) -> StoreResult<Person> {
        if let Some(family_id) = person.family_id {
            self.family(family_id)?;
        }
        let slot = self
            .people
            .get_mut(&person.id)
            .ok_or_else(|| StoreError::not_found(RecordKind::Person, person.id))?;
        *slot = person.clone();
        Ok(person)
    }

    pub fn delete_person(&mut self, id: PersonId) -> StoreResult<Person> {
        self.people
            .remove(&id)
            .ok_or_else(|| StoreError::not_found(RecordKind::Person, id))
    }

    /// Row counts as (universes, families, people)
    pub fn counts(&self) -> (usize, usize, usize) {
        (self.universes.len(), self.families.len(), self.people.len())
    }
}
