use std::sync::Arc;

use thiserror::Error;

use catalog_core::ProductId;
use catalog_products::{CreateProduct, Pagination, Product, ProductPatch};

/// Store operation error.
///
/// These are **infrastructure errors** (connectivity, constraint violations,
/// undecodable rows) as opposed to catalog errors (not found, invalid ids).
/// They are never retried; the current call fails with them.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("constraint violation: {0}")]
    Constraint(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("failed to decode row: {0}")]
    Decode(String),
}

/// Single-table product store.
///
/// ## Availability filter
///
/// Every read except [`find_any`](ProductStore::find_any) and
/// [`find_by_ids`](ProductStore::find_by_ids) only sees rows with
/// `available = true`.
///
/// ## Conditional mutations
///
/// `update_available` and `soft_delete_available` must check availability and
/// mutate in one step, returning `None` when no active row matched. This keeps
/// "exists" and "mutate" atomic without explicit transactions.
///
/// ## Ordering
///
/// Lists are ordered by `id` ascending so pagination is reproducible.
#[async_trait::async_trait]
pub trait ProductStore: Send + Sync {
    /// Insert a new, available product and return it with its assigned id.
    async fn insert(&self, payload: CreateProduct) -> Result<Product, StoreError>;

    /// Count rows with `available = true`.
    async fn count_available(&self) -> Result<u64, StoreError>;

    /// One page of available rows, ordered by `id` ascending.
    async fn list_available(&self, pagination: Pagination) -> Result<Vec<Product>, StoreError>;

    async fn find_available(&self, id: ProductId) -> Result<Option<Product>, StoreError>;

    /// Direct lookup that bypasses the availability filter.
    async fn find_any(&self, id: ProductId) -> Result<Option<Product>, StoreError>;

    /// All rows whose id is in `ids`, regardless of availability.
    async fn find_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, StoreError>;

    /// Apply `patch` to the row if it is available.
    async fn update_available(
        &self,
        id: ProductId,
        patch: ProductPatch,
    ) -> Result<Option<Product>, StoreError>;

    /// Set `available = false` on the row if it is currently available.
    async fn soft_delete_available(&self, id: ProductId) -> Result<Option<Product>, StoreError>;
}

#[async_trait::async_trait]
impl<S> ProductStore for Arc<S>
where
    S: ProductStore + ?Sized,
{
    async fn insert(&self, payload: CreateProduct) -> Result<Product, StoreError> {
        (**self).insert(payload).await
    }

    async fn count_available(&self) -> Result<u64, StoreError> {
        (**self).count_available().await
    }

    async fn list_available(&self, pagination: Pagination) -> Result<Vec<Product>, StoreError> {
        (**self).list_available(pagination).await
    }

    async fn find_available(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        (**self).find_available(id).await
    }

    async fn find_any(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        (**self).find_any(id).await
    }

    async fn find_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, StoreError> {
        (**self).find_by_ids(ids).await
    }

    async fn update_available(
        &self,
        id: ProductId,
        patch: ProductPatch,
    ) -> Result<Option<Product>, StoreError> {
        (**self).update_available(id, patch).await
    }

    async fn soft_delete_available(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        (**self).soft_delete_available(id).await
    }
}
