//! Database adapters (connection pool wiring).

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::instrument;

use crate::config::DatabaseConfig;
use crate::product_store::{PostgresProductStore, StoreError};

/// Open the process-wide connection pool.
#[instrument(skip_all, fields(max_connections = config.max_connections), err)]
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, StoreError> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.url)
        .await
        .map_err(|e| StoreError::Unavailable(format!("failed to connect to Postgres: {e}")))
}

/// Connect, make sure the `products` table exists, and wrap the pool in a store.
pub async fn connect_product_store(config: &DatabaseConfig) -> Result<PostgresProductStore, StoreError> {
    let pool = connect(config).await?;
    let store = PostgresProductStore::new(pool);
    store.ensure_schema().await?;
    tracing::info!("database connected");
    Ok(store)
}
