//! Roster Database Crate
//!
//! The persistence gateway for the Roster user service: connection
//! management, the embedded `users` migration, and the [`UserStore`]
//! abstraction with its SQLite implementation.

use roster_config::DatabaseConfig;

pub mod connection;
pub mod entities;
pub mod migrations;
pub mod repos;
pub mod types;

pub use connection::{prepare_database, wait_for_database};
pub use migrations::run_migrations;

pub use entities::{NewUser, User, UserPatch};
pub use repos::{UserRepository, UserStore};
pub use types::{
    DatabaseError, DatabaseResult, StoreError, StoreResult, UniqueField,
};

/// Re-export the pool type so callers need not depend on sqlx directly
pub use sqlx::SqlitePool;

/// Wait for the database, then make sure the schema is in place
pub async fn initialize_database(config: &DatabaseConfig) -> DatabaseResult<SqlitePool> {
    let pool = wait_for_database(config)
        .await
        .map_err(|e| DatabaseError::ConnectionError(format!("{e:#}")))?;

    run_migrations(&pool)
        .await
        .map_err(|e| DatabaseError::MigrationError(format!("{e:#}")))?;

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn create_test_database() -> (SqlitePool, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");

        let config = DatabaseConfig {
            url: format!("sqlite://{}", db_path.display()),
            max_connections: 1,
            ..DatabaseConfig::default()
        };

        let pool = initialize_database(&config).await.unwrap();
        (pool, temp_dir)
    }

    #[tokio::test]
    async fn test_database_initialization() {
        let (pool, _temp_dir) = create_test_database().await;

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_foreign_keys_enabled() {
        let (pool, _temp_dir) = create_test_database().await;

        let result: (bool,) = sqlx::query_as("PRAGMA foreign_keys")
            .fetch_one(&pool)
            .await
            .unwrap();

        assert!(result.0);
    }

    #[tokio::test]
    async fn test_initialization_reports_connection_failure() {
        let temp_dir = TempDir::new().unwrap();
        let config = DatabaseConfig {
            url: format!("sqlite:{}", temp_dir.path().join("absent.db").display()),
            max_connections: 1,
            connect_attempts: 1,
            connect_backoff_seconds: 0,
        };

        let error = initialize_database(&config).await.unwrap_err();
        assert!(matches!(error, DatabaseError::ConnectionError(_)));
    }
}
