//! Error types for the Quill domain layer.
//!
//! This module defines a hierarchy of error types:
//!
//! - [`StorageError`] - Database/repository errors
//! - [`CursorError`] - Opaque cursor decoding failures
//! - [`PaginationError`] - Connection paginator errors
//! - [`DomainError`] - Business rule and authorization errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

use crate::models::{BlogId, EntryId};

// =============================================================================
// Storage Errors
// =============================================================================

/// Database and repository errors.
///
/// These errors originate from storage operations like queries,
/// transactions, and data serialization.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Failed to establish database connection.
    #[error("Database connection error: {0}")]
    ConnectionError(String),

    /// SQL query execution failed.
    #[error("Query execution error: {0}")]
    QueryError(String),

    /// Requested record was not found.
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Database constraint was violated (unique, foreign key, etc.).
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Database migration failed.
    #[error("Migration error: {0}")]
    MigrationError(String),

    /// Transaction commit/rollback failed.
    #[error("Transaction error: {0}")]
    TransactionError(String),

    /// Data serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

// =============================================================================
// Cursor Errors
// =============================================================================

/// Reasons an opaque cursor token failed to decode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CursorError {
    /// Token is longer than any cursor we ever issue.
    #[error("cursor exceeds max length: {len} chars (max {max})")]
    TooLong { len: usize, max: usize },

    /// Token is not valid URL-safe base64.
    #[error("cursor is not valid base64")]
    Encoding,

    /// Decoded bytes are not a cursor payload.
    #[error("cursor payload is malformed")]
    Malformed,

    /// Payload was produced by an unknown cursor format version.
    #[error("unsupported cursor version: {0}")]
    UnsupportedVersion(u8),

    /// Cursor belongs to a different collection.
    #[error("cursor belongs to '{found}', expected '{expected}'")]
    ScopeMismatch { expected: String, found: String },

    /// Payload was modified after it was issued.
    #[error("cursor checksum mismatch")]
    ChecksumMismatch,
}

// =============================================================================
// Pagination Errors
// =============================================================================

/// Errors returned by the connection paginator.
///
/// Validation and cursor errors are raised before the store is touched.
/// Store errors are passed through unchanged.
#[derive(Debug, Error)]
pub enum PaginationError {
    /// Pagination arguments are malformed.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A supplied cursor could not be decoded for this collection.
    #[error("Invalid cursor: {0}")]
    InvalidCursor(#[from] CursorError),

    /// The entity store failed.
    #[error("Store error: {0}")]
    Store(#[from] StorageError),
}

// =============================================================================
// Domain Errors
// =============================================================================

/// Business logic and authorization failures.
#[derive(Debug, Error)]
pub enum DomainError {
    /// Blog was not found in storage.
    #[error("Blog not found: {0}")]
    BlogNotFound(BlogId),

    /// Entry was not found in storage.
    #[error("Entry not found: {0}")]
    EntryNotFound(EntryId),

    /// The operation requires an authenticated user.
    #[error("Authentication required")]
    Unauthenticated,

    /// The authenticated user may not perform the operation.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Input failed validation.
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Paginated listing failed.
    #[error(transparent)]
    Pagination(#[from] PaginationError),

    /// Storage operation failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Result type for pagination operations.
pub type PaginationResult<T> = Result<T, PaginationError>;
