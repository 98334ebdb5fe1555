//! Record types for the three linked entities
//!
//! A Universe owns Families, a Family owns People. Families that share a
//! `name_identifier` are the same family instantiated once per universe.

mod records;

use std::fmt;

pub use records::{Family, FamilyId, NameIdentifier, Person, PersonId, Power, Universe, UniverseId};

/// Table a record belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Universe,
    Family,
    Person,
}

impl RecordKind {
    /// Resource type name used on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Universe => "universe",
            RecordKind::Family => "family",
            RecordKind::Person => "person",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Universe => write!(f, "Universe"),
            RecordKind::Family => write!(f, "Family"),
            RecordKind::Person => write!(f, "Person"),
        }
    }
}
