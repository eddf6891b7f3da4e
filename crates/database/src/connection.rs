//! Database connection management

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use roster_config::DatabaseConfig;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use tokio::fs;
use tokio::time::sleep;
use tracing::{info, warn};

/// Prepare and establish a database connection
pub async fn prepare_database(config: &DatabaseConfig) -> Result<SqlitePool> {
    ensure_sqlite_path(&config.url).await?;

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.url)
        .await
        .with_context(|| format!("failed to connect to database {}", config.url))?;

    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await
        .context("failed to enable foreign keys for sqlite")?;

    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await
        .context("failed to enable WAL mode for sqlite")?;

    // Avoid "database is locked" under concurrent writers
    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await
        .context("failed to set busy timeout for sqlite")?;

    info!(url = %config.url, "database connection established");
    Ok(pool)
}

/// Keep trying [`prepare_database`] until it succeeds or
/// `connect_attempts` is used up, sleeping `connect_backoff_seconds`
/// between tries.
pub async fn wait_for_database(config: &DatabaseConfig) -> Result<SqlitePool> {
    let attempts = config.connect_attempts.max(1);
    let backoff = Duration::from_secs(config.connect_backoff_seconds);
    let mut attempt = 1;

    loop {
        match prepare_database(config).await {
            Ok(pool) => return Ok(pool),
            Err(error) if attempt < attempts => {
                warn!(attempt, attempts, error = %error, "database not yet ready");
                info!(
                    seconds = config.connect_backoff_seconds,
                    "backing off before reconnecting"
                );
                sleep(backoff).await;
                attempt += 1;
            }
            Err(error) => {
                return Err(error.context(format!(
                    "database still unavailable after {attempts} attempts"
                )));
            }
        }
    }
}

/// Ensure the SQLite database file and directory exist
async fn ensure_sqlite_path(url: &str) -> Result<()> {
    let Some(sqlite_path) = url.strip_prefix("sqlite://") else {
        return Ok(());
    };

    if sqlite_path == ":memory:" {
        return Ok(());
    }

    let path = Path::new(sqlite_path);
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await.with_context(|| {
                format!("failed to create sqlite directory {}", parent.display())
            })?;
        }
    }

    if fs::metadata(path).await.is_err() {
        fs::OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(path)
            .await
            .with_context(|| format!("failed to create sqlite database file {}", path.display()))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_database_file_and_directories_are_created() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("nested/dir/test.db");

        let config = DatabaseConfig {
            url: format!("sqlite://{}", db_path.display()),
            max_connections: 1,
            ..DatabaseConfig::default()
        };

        let pool = wait_for_database(&config).await.unwrap();
        sqlx::query("SELECT 1").execute(&pool).await.unwrap();
        assert!(db_path.exists());
    }

    #[tokio::test]
    async fn test_in_memory_database() {
        let config = DatabaseConfig {
            url: "sqlite://:memory:".to_string(),
            max_connections: 1,
            ..DatabaseConfig::default()
        };

        let pool = prepare_database(&config).await.unwrap();
        sqlx::query("SELECT 1").execute(&pool).await.unwrap();
    }

    #[tokio::test]
    async fn test_wait_for_database_gives_up_after_configured_attempts() {
        let temp_dir = TempDir::new().unwrap();
        // Only `sqlite://` paths are created up front, and sqlx does not create missing files
        let config = DatabaseConfig {
            url: format!("sqlite:{}", temp_dir.path().join("absent.db").display()),
            max_connections: 1,
            connect_attempts: 2,
            connect_backoff_seconds: 0,
        };

        let error = wait_for_database(&config).await.unwrap_err();
        assert!(error.to_string().contains("after 2 attempts"));
    }
}
