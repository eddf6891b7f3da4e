//! Error types for the persistence layer

use std::fmt;

use serde::Serialize;
use sqlx::error::ErrorKind;
use thiserror::Error;

/// Failures while bringing the database up
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Database connection error: {0}")]
    ConnectionError(String),

    #[error("Database migration error: {0}")]
    MigrationError(String),
}

/// Column guarded by a uniqueness constraint on `users`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UniqueField {
    Username,
    Email,
}

impl UniqueField {
    pub fn as_str(&self) -> &'static str {
        match self {
            UniqueField::Username => "username",
            UniqueField::Email => "email",
        }
    }

    /// Finds the guarded column named in a constraint name or backend message.
    ///
    /// SQLite reports `UNIQUE constraint failed: users.email`, Postgres reports
    /// constraint names such as `users_email_key`.
    fn from_backend_text(text: &str) -> Option<Self> {
        if text.contains("username") {
            Some(UniqueField::Username)
        } else if text.contains("email") {
            Some(UniqueField::Email)
        } else {
            None
        }
    }
}

impl fmt::Display for UniqueField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a failed store operation.
///
/// Every backend failure is reduced to one of these three variants, so callers
/// never inspect driver errors themselves.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("User not found")]
    NotFound,

    #[error("{field} already exists")]
    UniqueViolation { field: UniqueField },

    #[error("Store error: {0}")]
    Backend(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(error: sqlx::Error) -> Self {
        match error {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(db_error) if matches!(db_error.kind(), ErrorKind::UniqueViolation) => {
                let field = db_error
                    .constraint()
                    .and_then(UniqueField::from_backend_text)
                    .or_else(|| UniqueField::from_backend_text(db_error.message()));

                match field {
                    Some(field) => StoreError::UniqueViolation { field },
                    None => StoreError::Backend(db_error.to_string()),
                }
            }
            other => StoreError::Backend(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_text_names_the_violated_column() {
        assert_eq!(
            UniqueField::from_backend_text("UNIQUE constraint failed: users.username"),
            Some(UniqueField::Username)
        );
        assert_eq!(
            UniqueField::from_backend_text("users_email_key"),
            Some(UniqueField::Email)
        );
        assert_eq!(UniqueField::from_backend_text("users_pkey"), None);
    }

    #[test]
    fn row_not_found_becomes_not_found() {
        let error = StoreError::from(sqlx::Error::RowNotFound);
        assert!(matches!(error, StoreError::NotFound));
    }

    #[test]
    fn other_driver_errors_keep_their_detail() {
        let error = StoreError::from(sqlx::Error::PoolTimedOut);
        match error {
            StoreError::Backend(detail) => assert!(!detail.is_empty()),
            other => panic!("expected backend error, got {other:?}"),
        }
    }

    #[test]
    fn unique_field_serializes_lowercase() {
        let value = serde_json::to_value(UniqueField::Email).unwrap();
        assert_eq!(value, "email");
    }
}
