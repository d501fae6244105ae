use std::sync::Arc;

use catalog_infra::{
    db, AppConfig, InMemoryProductStore, PostgresProductStore, ProductCatalog, ProductStore,
    StoreError,
};

/// Type-erased store so one catalog type serves every backend.
pub type SharedStore = Arc<dyn ProductStore>;

pub type Catalog = ProductCatalog<SharedStore>;

/// Process-wide service wiring shared by the HTTP and RPC transports.
#[derive(Clone)]
pub struct AppServices {
    catalog: Arc<Catalog>,
    postgres: Option<PostgresProductStore>,
}

impl AppServices {
    /// In-memory wiring (dev/test).
    pub fn in_memory() -> Self {
        Self::with_store(Arc::new(InMemoryProductStore::new()))
    }

    pub fn with_store(store: SharedStore) -> Self {
        Self {
            catalog: Arc::new(ProductCatalog::new(store)),
            postgres: None,
        }
    }

    /// Postgres when `DATABASE_URL` is configured, in-memory otherwise.
    pub async fn from_config(config: &AppConfig) -> Result<Self, StoreError> {
        match &config.database {
            Some(db_config) => {
                let store = db::connect_product_store(db_config).await?;
                let shared: SharedStore = Arc::new(store.clone());
                Ok(Self {
                    catalog: Arc::new(ProductCatalog::new(shared)),
                    postgres: Some(store),
                })
            }
            None => {
                tracing::warn!("DATABASE_URL not set; using in-memory product store");
                Ok(Self::in_memory())
            }
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Release the connection pool (no-op for the in-memory store).
    pub async fn shutdown(&self) {
        if let Some(store) = &self.postgres {
            store.pool().close().await;
            tracing::info!("database connection closed");
        }
    }
}
