//! Resource layer errors

use thiserror::Error;

use crate::model::RecordKind;
use crate::store::StoreError;

/// Result type for resource operations
pub type ResourceResult<T> = Result<T, ResourceError>;

/// Resource layer errors
#[derive(Debug, Error)]
pub enum ResourceError {
    // ==================
    // Client Errors (4xx)
    // ==================
    /// Row addressed by path or relationship does not exist
    #[error("{kind}: {id} not found")]
    NotFound { kind: RecordKind, id: u64 },

    /// Body is not a resource document
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    /// Required attribute absent
    #[error("Missing required attribute '{0}'")]
    MissingAttribute(&'static str),

    /// Attribute present with the wrong JSON type
    #[error("Attribute '{name}' must be {expected}")]
    InvalidAttribute {
        name: &'static str,
        expected: &'static str,
    },

    /// Body `type` does not match the endpoint
    #[error("Resource type '{found}' does not match endpoint type '{expected}'")]
    TypeMismatch { expected: &'static str, found: String },

    /// Body `id` does not match the path id
    #[error("Body id '{found}' does not match path id {expected}")]
    IdMismatch { expected: u64, found: String },

    // ==================
    // Server Errors (5xx)
    // ==================
    /// Store could not serve the request
    #[error("{0}")]
    Store(StoreError),
}

impl From<StoreError> for ResourceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { kind, id } => ResourceError::NotFound { kind, id },
            other => ResourceError::Store(other),
        }
    }
}

impl ResourceError {
    pub fn not_found(kind: RecordKind, id: u64) -> Self {
        ResourceError::NotFound { kind, id }
    }
}
