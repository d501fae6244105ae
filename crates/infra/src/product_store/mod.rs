//! Product persistence boundary.
//!
//! The catalog talks to storage only through [`ProductStore`]; the concrete
//! backend (in-memory for tests/dev, Postgres for production) is chosen at
//! startup and injected.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryProductStore;
pub use postgres::PostgresProductStore;
pub use r#trait::{ProductStore, StoreError};
