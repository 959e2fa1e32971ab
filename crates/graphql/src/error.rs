//! Mapping of domain errors onto GraphQL errors.
//!
//! Every error carries a stable `extensions.code` so clients can tell a
//! bad cursor from a bad argument or an outage without parsing messages.

use async_graphql::{Error, ErrorExtensions};
use tracing::error;

use quill_core::error::{DomainError, PaginationError};

/// Stable error code for a domain error.
pub fn error_code(err: &DomainError) -> &'static str {
    match err {
        DomainError::BlogNotFound(_) | DomainError::EntryNotFound(_) => "NOT_FOUND",
        DomainError::Unauthenticated => "UNAUTHENTICATED",
        DomainError::Forbidden(_) => "FORBIDDEN",
        DomainError::ValidationError(_) => "VALIDATION_ERROR",
        DomainError::Pagination(PaginationError::Validation(_)) => "VALIDATION_ERROR",
        DomainError::Pagination(PaginationError::InvalidCursor(_)) => "INVALID_CURSOR",
        DomainError::Pagination(PaginationError::Store(_)) | DomainError::Storage(_) => {
            "STORE_ERROR"
        }
    }
}

/// Wrapper for `DomainError`; orphan rules keep `ErrorExtensions` off the foreign type.
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl ErrorExtensions for ApiError {
    fn extend(&self) -> Error {
        let code = error_code(&self.0);
        let message = match code {
            // Storage details stay in the logs.
            "STORE_ERROR" => {
                error!(error = %self.0, "❌ Store failure while serving request");
                "Internal storage error".to_string()
            }
            _ => self.0.to_string(),
        };
        Error::new(message).extend_with(|_, e| e.set("code", code))
    }
}

/// Convert a domain error into a GraphQL error with its code attached.
pub fn api_error(err: DomainError) -> Error {
    ApiError(err).extend()
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_core::error::{CursorError, StorageError};
    use quill_core::models::BlogId;

    // Test critique: chaque catégorie d'erreur a un code distinct et stable
    #[test]
    fn test_error_codes() {
        assert_eq!(error_code(&DomainError::BlogNotFound(BlogId(1))), "NOT_FOUND");
        assert_eq!(error_code(&DomainError::Unauthenticated), "UNAUTHENTICATED");
        assert_eq!(
            error_code(&PaginationError::Validation("x".into()).into()),
            "VALIDATION_ERROR"
        );
        assert_eq!(
            error_code(&PaginationError::InvalidCursor(CursorError::Encoding).into()),
            "INVALID_CURSOR"
        );
        assert_eq!(
            error_code(&PaginationError::Store(StorageError::QueryError("x".into())).into()),
            "STORE_ERROR"
        );
    }

    // Test critique: les détails SQL ne fuient pas vers le client
    #[test]
    fn test_store_errors_are_masked() {
        let err = api_error(StorageError::QueryError("relation blogs does not exist".into()).into());
        assert!(!err.message.contains("relation"));
    }
}
