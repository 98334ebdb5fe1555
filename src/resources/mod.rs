//! Universe, family and person resources
//!
//! CRUD plus relationship traversal, rendered as JSON:API-shaped documents.
//! The HTTP routes in `http_server::resource_routes` are thin wrappers over
//! `ResourceService`.

pub mod document;
mod errors;
mod service;

pub use document::{
    Document, InboundDocument, InboundResource, Links, RelationshipDocument, Resource,
    ResourceIdentifier, ResourceObject,
};
pub use errors::{ResourceError, ResourceResult};
pub use service::ResourceService;
