//! JSON:API-shaped documents
//!
//! Outbound: `{ "data": ..., "links": {...}, "jsonapi": {"version": "1.0"} }`
//! where `data` is a resource object, an array of them, or relationship
//! linkage. Inbound: `{ "data": { "type", "id"?, "attributes", "relationships" } }`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::errors::{ResourceError, ResourceResult};
use crate::model::{Family, Person, RecordKind, Universe};

pub const JSONAPI_VERSION: &str = "1.0";

#[derive(Debug, Clone, Serialize)]
pub struct JsonApi {
    pub version: &'static str,
}

/// Top-level document
#[derive(Debug, Clone, Serialize)]
pub struct Document<T: Serialize> {
    pub data: T,
    pub links: Links,
    pub jsonapi: JsonApi,
}

impl<T: Serialize> Document<T> {
    pub fn new(data: T, self_link: impl Into<String>) -> Self {
        Self {
            data,
            links: Links::to(self_link),
            jsonapi: JsonApi {
                version: JSONAPI_VERSION,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Links {
    #[serde(rename = "self")]
    pub self_link: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related: Option<String>,
}

impl Links {
    pub fn to(self_link: impl Into<String>) -> Self {
        Self {
            self_link: self_link.into(),
            related: None,
        }
    }

    pub fn with_related(mut self, related: impl Into<String>) -> Self {
        self.related = Some(related.into());
        self
    }
}

/// `{ "type": ..., "id": ... }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceIdentifier {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
}

impl ResourceIdentifier {
    pub fn new(kind: RecordKind, id: u64) -> Self {
        Self {
            kind: kind.as_str().to_string(),
            id: id.to_string(),
        }
    }

    /// Check the type and parse the id
    pub fn expect(&self, kind: RecordKind) -> ResourceResult<u64> {
        if self.kind != kind.as_str() {
            return Err(ResourceError::TypeMismatch {
                expected: kind.as_str(),
                found: self.kind.clone(),
            });
        }
        self.id
            .parse()
            .map_err(|_| ResourceError::InvalidBody(format!("'{}' is not a valid id", self.id)))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RelationshipObject {
    pub links: Links,
}

/// Outbound resource object
#[derive(Debug, Clone, Serialize)]
pub struct ResourceObject {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub id: String,
    pub attributes: Map<String, Value>,
    pub relationships: BTreeMap<&'static str, RelationshipObject>,
    pub links: Links,
}

/// A record that can be rendered as a resource object
pub trait Resource {
    const KIND: RecordKind;

    fn resource_id(&self) -> u64;

    fn attributes(&self) -> Map<String, Value>;

    /// Relationship name to its links
    fn relationships(&self) -> Vec<(&'static str, Links)>;

    fn self_path(&self) -> String;

    fn to_object(&self) -> ResourceObject {
        ResourceObject {
            kind: Self::KIND.as_str(),
            id: self.resource_id().to_string(),
            attributes: self.attributes(),
            relationships: self
                .relationships()
                .into_iter()
                .map(|(name, links)| (name, RelationshipObject { links }))
                .collect(),
            links: Links::to(self.self_path()),
        }
    }

    fn identifier(&self) -> ResourceIdentifier {
        ResourceIdentifier::new(Self::KIND, self.resource_id())
    }
}

impl Resource for Universe {
    const KIND: RecordKind = RecordKind::Universe;

    fn resource_id(&self) -> u64 {
        self.id
    }

    fn attributes(&self) -> Map<String, Value> {
        let mut attributes = Map::new();
        attributes.insert("name".to_string(), Value::from(self.name.clone()));
        attributes
    }

    fn relationships(&self) -> Vec<(&'static str, Links)> {
        vec![(
            "families",
            Links::to(format!("/universe/{}/relationships/families", self.id))
                .with_related(format!("/universe/{}/families", self.id)),
        )]
    }

    fn self_path(&self) -> String {
        format!("/universe/{}", self.id)
    }
}

impl Resource for Family {
    const KIND: RecordKind = RecordKind::Family;

    fn resource_id(&self) -> u64 {
        self.id
    }

    fn attributes(&self) -> Map<String, Value> {
        let mut attributes = Map::new();
        attributes.insert("fam_power".to_string(), Value::from(self.fam_power));
        attributes.insert("name_identifier".to_string(), Value::from(self.name_identifier));
        attributes
    }

    fn relationships(&self) -> Vec<(&'static str, Links)> {
        let people = Links::to(format!("/family/{}/relationships/people", self.id))
            .with_related(format!("/family/{}/people", self.id));
        let mut universe = Links::to(format!("/family/{}/relationships/universe", self.id));
        if let Some(universe_id) = self.universe_id {
            universe = universe.with_related(format!("/universe/{}", universe_id));
        }
        vec![("people", people), ("universe", universe)]
    }

    fn self_path(&self) -> String {
        format!("/family/{}", self.id)
    }
}

impl Resource for Person {
    const KIND: RecordKind = RecordKind::Person;

    fn resource_id(&self) -> u64 {
        self.id
    }

    fn attributes(&self) -> Map<String, Value> {
        let mut attributes = Map::new();
        attributes.insert("power".to_string(), Value::from(self.power));
        attributes
    }

    fn relationships(&self) -> Vec<(&'static str, Links)> {
        let mut family = Links::to(format!("/people/{}/relationships/family", self.id));
        if let Some(family_id) = self.family_id {
            family = family.with_related(format!("/family/{}", family_id));
        }
        vec![("family", family)]
    }

    fn self_path(&self) -> String {
        format!("/person/{}", self.id)
    }
}

// ==================
// Inbound
// ==================

/// Request body for create and update
#[derive(Debug, Clone, Deserialize)]
pub struct InboundDocument {
    pub data: InboundResource,
}

/// Request body for to-one relationship updates; `data: null` unlinks
#[derive(Debug, Clone, Deserialize)]
pub struct RelationshipDocument {
    pub data: Option<ResourceIdentifier>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InboundRelationship {
    pub data: Option<ResourceIdentifier>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InboundResource {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub attributes: Map<String, Value>,
    #[serde(default)]
    pub relationships: Map<String, Value>,
}

impl InboundResource {
    pub fn expect_kind(&self, kind: RecordKind) -> ResourceResult<()> {
        if self.kind != kind.as_str() {
            return Err(ResourceError::TypeMismatch {
                expected: kind.as_str(),
                found: self.kind.clone(),
            });
        }
        Ok(())
    }

    /// A body id, when given, must name the row in the path
    pub fn expect_id(&self, path_id: u64) -> ResourceResult<()> {
        match &self.id {
            Some(id) if id.parse::<u64>().ok() != Some(path_id) => Err(ResourceError::IdMismatch {
                expected: path_id,
                found: id.clone(),
            }),
            _ => Ok(()),
        }
    }

    pub fn optional_i64(&self, name: &'static str) -> ResourceResult<Option<i64>> {
        match self.attributes.get(name) {
            None => Ok(None),
            Some(value) => value.as_i64().map(Some).ok_or(ResourceError::InvalidAttribute {
                name,
                expected: "an integer",
            }),
        }
    }

    pub fn required_i64(&self, name: &'static str) -> ResourceResult<i64> {
        self.optional_i64(name)?
            .ok_or(ResourceError::MissingAttribute(name))
    }

    pub fn optional_string(&self, name: &'static str) -> ResourceResult<Option<String>> {
        match self.attributes.get(name) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(ResourceError::InvalidAttribute {
                name,
                expected: "a string",
            }),
        }
    }

    pub fn required_string(&self, name: &'static str) -> ResourceResult<String> {
        self.optional_string(name)?
            .ok_or(ResourceError::MissingAttribute(name))
    }

    /// To-one relationship linkage.
    ///
    /// `None` when the relationship is absent from the body,
    /// `Some(None)` when it is explicitly null.
    pub fn to_one(&self, name: &str, kind: RecordKind) -> ResourceResult<Option<Option<u64>>> {
        let Some(raw) = self.relationships.get(name) else {
            return Ok(None);
        };
        let relationship: InboundRelationship = serde_json::from_value(raw.clone())
            .map_err(|e| ResourceError::InvalidBody(format!("relationship '{}': {}", name, e)))?;
        match relationship.data {
            None => Ok(Some(None)),
            Some(identifier) => Ok(Some(Some(identifier.expect(kind)?))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn inbound(value: Value) -> InboundResource {
        serde_json::from_value::<InboundDocument>(value).unwrap().data
    }

    #[test]
    fn test_family_object_shape() {
        let family = Family::new(3, 7).with_power(15).in_universe(2);
        let json = serde_json::to_value(Document::new(family.to_object(), "/family/3")).unwrap();

        assert_eq!(json["data"]["type"], "family");
        assert_eq!(json["data"]["id"], "3");
        assert_eq!(json["data"]["attributes"]["fam_power"], 15);
        assert_eq!(json["data"]["attributes"]["name_identifier"], 7);
        assert_eq!(
            json["data"]["relationships"]["universe"]["links"]["related"],
            "/universe/2"
        );
        assert_eq!(json["data"]["links"]["self"], "/family/3");
        assert_eq!(json["jsonapi"]["version"], "1.0");
    }

    #[test]
    fn test_unlinked_person_has_no_related_family() {
        let person = Person {
            id: 1,
            power: 4,
            family_id: None,
        };
        let object = serde_json::to_value(person.to_object()).unwrap();
        assert!(object["relationships"]["family"]["links"].get("related").is_none());
    }

    #[test]
    fn test_required_attributes() {
        let resource = inbound(json!({"data": {"type": "person", "attributes": {}}}));
        assert!(matches!(
            resource.required_i64("power"),
            Err(ResourceError::MissingAttribute("power"))
        ));

        let resource = inbound(json!({"data": {"type": "person", "attributes": {"power": "ten"}}}));
        assert!(matches!(
            resource.required_i64("power"),
            Err(ResourceError::InvalidAttribute { name: "power", .. })
        ));
    }

    #[test]
    fn test_kind_and_id_checks() {
        let resource = inbound(json!({"data": {"type": "family", "id": "4"}}));
        assert!(resource.expect_kind(RecordKind::Family).is_ok());
        assert!(matches!(
            resource.expect_kind(RecordKind::Person),
            Err(ResourceError::TypeMismatch { .. })
        ));
        assert!(resource.expect_id(4).is_ok());
        assert!(matches!(
            resource.expect_id(5),
            Err(ResourceError::IdMismatch { expected: 5, .. })
        ));
    }

    #[test]
    fn test_to_one_linkage() {
        let resource = inbound(json!({"data": {
            "type": "family",
            "relationships": {
                "universe": {"data": {"type": "universe", "id": "2"}},
                "people": {"data": null}
            }
        }}));
        assert_eq!(resource.to_one("universe", RecordKind::Universe).unwrap(), Some(Some(2)));
        assert_eq!(resource.to_one("people", RecordKind::Person).unwrap(), Some(None));
        assert_eq!(resource.to_one("absent", RecordKind::Person).unwrap(), None);
        assert!(resource.to_one("universe", RecordKind::Family).is_err());
    }
}
