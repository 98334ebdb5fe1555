//! # HTTP API Errors
//!
//! Maps balance and resource errors to status codes and a JSON body:
//! `{ "error": <message>, "code": <status> }`.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::balance::BalanceError;
use crate::observability::{log_event_with_fields, Event};
use crate::resources::ResourceError;
use crate::store::StoreError;

/// Result type for HTTP handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// HTTP API errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Balance(#[from] BalanceError),

    #[error(transparent)]
    Resource(#[from] ResourceError),

    /// Body, path segment or query string could not be parsed
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Worker task failed before producing a result
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

fn store_status(err: &StoreError) -> StatusCode {
    match err {
        StoreError::NotFound { .. } => StatusCode::NOT_FOUND,
        StoreError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        StoreError::Io { .. } | StoreError::Corrupted(_) | StoreError::Serialization(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl ApiError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Balance(BalanceError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Balance(BalanceError::StoreUnavailable(e)) => match e {
                // A vanished row mid-repair is still a store failure.
                StoreError::NotFound { .. } => StatusCode::SERVICE_UNAVAILABLE,
                other => store_status(other),
            },

            ApiError::Resource(err) => match err {
                ResourceError::NotFound { .. } => StatusCode::NOT_FOUND,
                ResourceError::InvalidBody(_) => StatusCode::BAD_REQUEST,
                ResourceError::MissingAttribute(_) | ResourceError::InvalidAttribute { .. } => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                ResourceError::TypeMismatch { .. } | ResourceError::IdMismatch { .. } => {
                    StatusCode::CONFLICT
                }
                ResourceError::Store(e) => store_status(e),
            },

            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl From<&ApiError> for ErrorResponse {
    fn from(err: &ApiError) -> Self {
        Self {
            code: err.status_code().as_u16(),
            error: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse::from(&self);
        log_event_with_fields(
            Event::RequestRejected,
            &[("code", &body.code.to_string()), ("error", &body.error)],
        );
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RecordKind;

    #[test]
    fn test_balance_status_codes() {
        assert_eq!(
            ApiError::from(BalanceError::NotFound(7)).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(BalanceError::StoreUnavailable(StoreError::Unavailable(
                "down".to_string()
            )))
            .status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_resource_status_codes() {
        let not_found = ResourceError::not_found(RecordKind::Person, 1);
        assert_eq!(ApiError::from(not_found).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::from(ResourceError::MissingAttribute("power")).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::from(ResourceError::TypeMismatch {
                expected: "family",
                found: "person".to_string()
            })
            .status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(ResourceError::Store(StoreError::Corrupted("bad".to_string())))
                .status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_body() {
        let err = ApiError::from(BalanceError::NotFound(7));
        let body = ErrorResponse::from(&err);
        assert_eq!(body.code, 404);
        assert!(body.error.contains("name_identifier 7"));
    }

    #[test]
    fn test_bad_request_body() {
        let err = ApiError::BadRequest("Cannot parse `abc` to a `i64`".to_string());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let body = ErrorResponse::from(&err);
        assert_eq!(body.code, 400);
        assert!(body.error.starts_with("Invalid request"));
        assert!(body.error.contains("abc"));
    }
}
