//! Infrastructure layer: product storage (in-memory / Postgres), the catalog
//! service built on top of it, configuration, and connection pool wiring.

pub mod catalog;
pub mod config;
pub mod db;
pub mod product_store;

pub use catalog::{CatalogError, ErrorKind, ProductCatalog};
pub use config::{AppConfig, ConfigError, DatabaseConfig};
pub use product_store::{InMemoryProductStore, PostgresProductStore, ProductStore, StoreError};
