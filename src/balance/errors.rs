//! Balance engine errors

use thiserror::Error;

use crate::model::NameIdentifier;
use crate::store::StoreError;

/// Result type for balance operations
pub type BalanceResult<T> = Result<T, BalanceError>;

/// Balance engine errors
#[derive(Debug, Error)]
pub enum BalanceError {
    /// Checker was asked about a group with no rows
    #[error("No family found with name_identifier {0}")]
    NotFound(NameIdentifier),

    /// Fetch or commit failed; nothing was changed
    #[error("{0}")]
    StoreUnavailable(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_names_the_group() {
        assert_eq!(
            BalanceError::NotFound(7).to_string(),
            "No family found with name_identifier 7"
        );
    }

    #[test]
    fn test_store_errors_convert() {
        let err: BalanceError = StoreError::Unavailable("connection reset".to_string()).into();
        assert!(matches!(err, BalanceError::StoreUnavailable(_)));
        assert!(err.to_string().contains("connection reset"));
    }
}
