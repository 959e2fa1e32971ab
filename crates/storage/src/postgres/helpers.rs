//! Shared helper functions for PostgreSQL queries and row conversion.

use quill_core::error::{StorageError, StorageResult};
use quill_core::models::UserId;

/// Direction of a keyset bound on `(created_at, id)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeysetBound {
    /// Rows strictly after the key, ascending.
    After,
    /// Rows strictly before the key, descending.
    Before,
}

impl KeysetBound {
    /// Row-value comparison against two consecutive parameters.
    ///
    /// `first_param` is the 1-based index of the `created_at` parameter;
    /// the `id` parameter follows it.
    pub fn condition(self, first_param: usize) -> String {
        let op = match self {
            Self::After => ">",
            Self::Before => "<",
        };
        format!(
            "(created_at, id) {} (${}, ${})",
            op,
            first_param,
            first_param + 1
        )
    }

    /// ORDER BY clause matching the bound direction.
    pub fn order_by(self) -> &'static str {
        match self {
            Self::After => "ORDER BY created_at ASC, id ASC",
            Self::Before => "ORDER BY created_at DESC, id DESC",
        }
    }
}

/// Convert a stored user identifier back into a [`UserId`].
pub fn parse_user_id(raw: String, field_name: &str) -> StorageResult<UserId> {
    UserId::parse(&raw).ok_or_else(|| {
        StorageError::SerializationError(format!("{} is not a valid user id", field_name))
    })
}

/// Map a sqlx error, surfacing constraint violations separately.
pub fn query_error(e: sqlx::Error) -> StorageError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() || db.is_foreign_key_violation() || db.is_check_violation() {
            return StorageError::ConstraintViolation(db.message().to_string());
        }
    }
    StorageError::QueryError(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    // Test critique: les opérateurs et paramètres du keyset sont corrects
    #[test]
    fn test_keyset_condition_numbers_params() {
        assert_eq!(
            KeysetBound::After.condition(2),
            "(created_at, id) > ($2, $3)"
        );
        assert_eq!(
            KeysetBound::Before.condition(1),
            "(created_at, id) < ($1, $2)"
        );
    }

    // Test critique: l'ordre suit la direction du curseur
    #[test]
    fn test_keyset_order_matches_bound() {
        assert!(KeysetBound::After.order_by().contains("ASC"));
        assert!(KeysetBound::Before.order_by().contains("DESC"));
    }

    #[test]
    fn test_non_constraint_errors_are_query_errors() {
        let err = query_error(sqlx::Error::RowNotFound);
        assert!(matches!(err, StorageError::QueryError(_)));
    }

    #[test]
    fn test_invalid_user_id_names_field() {
        let err = parse_user_id("   ".into(), "blog.owner_id").unwrap_err();
        assert!(err.to_string().contains("blog.owner_id"));
    }
}
