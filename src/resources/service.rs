//! CRUD and relationship operations over the store
//!
//! Every mutation runs in its own write transaction and either commits as
//! a whole or rolls back.

use std::sync::Arc;

use super::document::{InboundResource, ResourceIdentifier};
use super::errors::{ResourceError, ResourceResult};
use crate::model::{
    Family, FamilyId, NameIdentifier, Person, PersonId, RecordKind, Universe, UniverseId,
};
use crate::observability::{log_event_with_fields, Event, MetricsRegistry};
use crate::store::{Database, Tables, WriteTxn};

/// Resource operations bound to a database
#[derive(Debug, Clone)]
pub struct ResourceService {
    db: Arc<Database>,
    metrics: Arc<MetricsRegistry>,
}

impl ResourceService {
    pub fn new(db: Arc<Database>, metrics: Arc<MetricsRegistry>) -> Self {
        Self { db, metrics }
    }

    fn read<T, F>(&self, f: F) -> ResourceResult<T>
    where
        F: FnOnce(&Tables) -> ResourceResult<T>,
    {
        let txn = self.db.begin_read()?;
        f(txn.tables())
    }

    fn write<T, F>(&self, f: F) -> ResourceResult<T>
    where
        F: FnOnce(&mut WriteTxn<'_>) -> ResourceResult<T>,
    {
        let mut txn = self.db.begin_write()?;
        match f(&mut txn) {
            Ok(out) => {
                txn.commit()?;
                Ok(out)
            }
            Err(e) => {
                txn.rollback();
                Err(e)
            }
        }
    }

    fn created(&self, kind: RecordKind, id: u64) {
        self.metrics.increment_resources_created();
        log_event_with_fields(
            Event::ResourceCreated,
            &[("kind", kind.as_str()), ("id", &id.to_string())],
        );
    }

    fn deleted(&self, kind: RecordKind, id: u64) {
        self.metrics.increment_resources_deleted();
        log_event_with_fields(
            Event::ResourceDeleted,
            &[("kind", kind.as_str()), ("id", &id.to_string())],
        );
    }

    // ==================
    // Universes
    // ==================

    pub fn list_universes(&self) -> ResourceResult<Vec<Universe>> {
        self.read(|t| Ok(t.universes().cloned().collect()))
    }

    pub fn get_universe(&self, id: UniverseId) -> ResourceResult<Universe> {
        self.read(|t| Ok(t.universe(id)?.clone()))
    }

    pub fn create_universe(&self, body: &InboundResource) -> ResourceResult<Universe> {
        body.expect_kind(RecordKind::Universe)?;
        let name = body.required_string("name")?;

        let universe = self.write(|txn| Ok(txn.write(|t| Ok(t.insert_universe(name)))?))?;
        self.created(RecordKind::Universe, universe.id);
        Ok(universe)
    }

    pub fn update_universe(&self, id: UniverseId, body: &InboundResource) -> ResourceResult<Universe> {
        body.expect_kind(RecordKind::Universe)?;
        body.expect_id(id)?;
        let name = body.optional_string("name")?;

        self.write(|txn| match name {
            Some(name) => Ok(txn.write(|t| t.rename_universe(id, name))?),
            None => Ok(txn.tables().universe(id)?.clone()),
        })
    }

    /// Deletes the universe's families and their people as well
    pub fn delete_universe(&self, id: UniverseId) -> ResourceResult<()> {
        self.write(|txn| Ok(txn.write(|t| t.delete_universe(id))?))?;
        self.deleted(RecordKind::Universe, id);
        Ok(())
    }

    pub fn universe_families(&self, id: UniverseId) -> ResourceResult<Vec<Family>> {
        self.read(|t| {
            t.universe(id)?;
            Ok(t.families_in_universe(id).cloned().collect())
        })
    }

    // ==================
    // Families
    // ==================

    pub fn list_families(&self, name_identifier: Option<NameIdentifier>) -> ResourceResult<Vec<Family>> {
        self.read(|t| {
            Ok(match name_identifier {
                Some(key) => t.families_by_name_identifier(key).cloned().collect(),
                None => t.families().cloned().collect(),
            })
        })
    }

    pub fn get_family(&self, id: FamilyId) -> ResourceResult<Family> {
        self.read(|t| Ok(t.family(id)?.clone()))
    }

    /// Create a family. A universe in the path overrides any in the body.
    pub fn create_family(
        &self,
        body: &InboundResource,
        path_universe: Option<UniverseId>,
    ) -> ResourceResult<Family> {
        body.expect_kind(RecordKind::Family)?;
        let name_identifier = body.required_i64("name_identifier")?;
        let fam_power = body.optional_i64("fam_power")?.unwrap_or(0);
        let universe_id = match path_universe {
            Some(id) => Some(id),
            None => body.to_one("universe", RecordKind::Universe)?.flatten(),
        };

        let family = self.write(|txn| {
            Ok(txn.write(|t| t.insert_family(name_identifier, fam_power, universe_id))?)
        })?;
        self.created(RecordKind::Family, family.id);
        Ok(family)
    }

    pub fn update_family(&self, id: FamilyId, body: &InboundResource) -> ResourceResult<Family> {
        body.expect_kind(RecordKind::Family)?;
        body.expect_id(id)?;
        let fam_power = body.optional_i64("fam_power")?;
        let name_identifier = body.optional_i64("name_identifier")?;
        let universe = body.to_one("universe", RecordKind::Universe)?;

        self.write(|txn| {
            let mut family = txn.tables().family(id)?.clone();
            if let Some(fam_power) = fam_power {
                family.fam_power = fam_power;
            }
            if let Some(name_identifier) = name_identifier {
                family.name_identifier = name_identifier;
            }
            if let Some(universe_id) = universe {
                family.universe_id = universe_id;
            }
            Ok(txn.write(|t| t.update_family(family))?)
        })
    }

    /// Deletes the family's people as well
    pub fn delete_family(&self, id: FamilyId) -> ResourceResult<()> {
        self.write(|txn| Ok(txn.write(|t| t.delete_family(id))?))?;
        self.deleted(RecordKind::Family, id);
        Ok(())
    }

    pub fn family_people(&self, id: FamilyId) -> ResourceResult<Vec<Person>> {
        self.read(|t| {
            t.family(id)?;
            Ok(t.people_in_family(id).cloned().collect())
        })
    }

    pub fn family_universe(&self, id: FamilyId) -> ResourceResult<Option<ResourceIdentifier>> {
        self.read(|t| {
            Ok(t.family(id)?
                .universe_id
                .map(|u| ResourceIdentifier::new(RecordKind::Universe, u)))
        })
    }

    pub fn set_family_universe(
        &self,
        id: FamilyId,
        linkage: Option<&ResourceIdentifier>,
    ) -> ResourceResult<Family> {
        let universe_id = linkage
            .map(|identifier| identifier.expect(RecordKind::Universe))
            .transpose()?;

        self.write(|txn| {
            let mut family = txn.tables().family(id)?.clone();
            family.universe_id = universe_id;
            Ok(txn.write(|t| t.update_family(family))?)
        })
    }

    // ==================
    // People
    // ==================

    pub fn list_people(&self) -> ResourceResult<Vec<Person>> {
        self.read(|t| Ok(t.people().cloned().collect()))
    }

    pub fn get_person(&self, id: PersonId) -> ResourceResult<Person> {
        self.read(|t| Ok(t.person(id)?.clone()))
    }

    /// Create a person. A family in the path overrides any in the body.
    ///
    /// A person born into a family adds their power to the family's
    /// `fam_power`, in the same transaction as the insert.
    pub fn create_person(
        &self,
        body: &InboundResource,
        path_family: Option<FamilyId>,
    ) -> ResourceResult<Person> {
        body.expect_kind(RecordKind::Person)?;
        let power = body.required_i64("power")?;
        let family_id = match path_family {
            Some(id) => Some(id),
            None => body.to_one("family", RecordKind::Family)?.flatten(),
        };

        let person = self.write(|txn| {
            let person = txn.write(|t| t.insert_person(power, family_id))?;
            if let Some(family_id) = family_id {
                let current = txn.tables().family(family_id)?.fam_power;
                let fam_power = current.checked_add(power).ok_or(ResourceError::InvalidAttribute {
                    name: "power",
                    expected: "small enough to add to the family power",
                })?;
                txn.write(|t| t.set_family_power(family_id, fam_power))?;
            }
            Ok(person)
        })?;
        self.created(RecordKind::Person, person.id);
        Ok(person)
    }

    pub fn update_person(&self, id: PersonId, body: &InboundResource) -> ResourceResult<Person> {
        body.expect_kind(RecordKind::Person)?;
        body.expect_id(id)?;
        let power = body.optional_i64("power")?;
        let family = body.to_one("family", RecordKind::Family)?;

        self.write(|txn| {
            let mut person = txn.tables().person(id)?.clone();
            if let Some(power) = power {
                person.power = power;
            }
            if let Some(family_id) = family {
                person.family_id = family_id;
            }
            Ok(txn.write(|t| t.update_person(person))?)
        })
    }

    pub fn delete_person(&self, id: PersonId) -> ResourceResult<()> {
        self.write(|txn| Ok(txn.write(|t| t.delete_person(id))?))?;
        self.deleted(RecordKind::Person, id);
        Ok(())
    }

    pub fn person_family(&self, id: PersonId) -> ResourceResult<Option<ResourceIdentifier>> {
        self.read(|t| {
            Ok(t.person(id)?
                .family_id
                .map(|f| ResourceIdentifier::new(RecordKind::Family, f)))
        })
    }

    pub fn set_person_family(
        &self,
        id: PersonId,
        linkage: Option<&ResourceIdentifier>,
    ) -> ResourceResult<Person> {
        let family_id = linkage
            .map(|identifier| identifier.expect(RecordKind::Family))
            .transpose()?;

        self.write(|txn| {
            let mut person = txn.tables().person(id)?.clone();
            person.family_id = family_id;
            Ok(txn.write(|t| t.update_person(person))?)
        })
    }
}
