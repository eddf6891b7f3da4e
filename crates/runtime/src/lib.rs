use std::sync::Arc;

use anyhow::{Context, Result};
use roster_config::AppConfig;
use roster_database::{initialize_database, SqlitePool, UserRepository, UserStore};
use tracing::info;

pub mod telemetry {
    use anyhow::Result;
    use tracing_subscriber::EnvFilter;

    /// Used when `RUST_LOG` is unset; sqlx logs every statement at `info`.
    pub const DEFAULT_FILTER: &str = "info,sqlx=warn";

    pub fn init_tracing() -> Result<()> {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .map_err(|error| anyhow::anyhow!("failed to set tracing subscriber: {error}"))
    }
}

#[derive(Clone)]
pub struct BackendServices {
    pub db_pool: SqlitePool,
    pub store: Arc<dyn UserStore>,
}

impl BackendServices {
    /// Wait for the database, apply the schema and build the user store.
    pub async fn initialise(config: &AppConfig) -> Result<Self> {
        let db_pool = initialize_database(&config.database)
            .await
            .context("failed to initialise database")?;

        let store: Arc<dyn UserStore> = Arc::new(UserRepository::new(db_pool.clone()));
        info!(url = %config.database.url, "user store ready");

        Ok(Self { db_pool, store })
    }
}

pub async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(?error, "failed to listen for shutdown signal");
    }
    info!("shutdown signal received");
}
