//! Product catalog service: create / read / update / soft-delete / bulk validate.
//!
//! The catalog owns no state of its own; every call goes to the injected
//! [`ProductStore`]. Errors come back as [`CatalogError`], whose
//! [`ErrorKind`] carries a transport-neutral status so that HTTP and RPC
//! callers can each present them their own way.

use thiserror::Error;
use tracing::instrument;

use catalog_core::ProductId;
use catalog_products::{dedup_ids, missing_ids, CreateProduct, Page, Pagination, Product, UpdateProduct};

use crate::product_store::{ProductStore, StoreError};

/// Machine-readable classification of a catalog failure.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    InvalidIds,
    StoreFailure,
}

impl ErrorKind {
    /// HTTP-compatible status number.
    pub fn status(self) -> u16 {
        match self {
            ErrorKind::NotFound => 404,
            ErrorKind::InvalidIds => 400,
            ErrorKind::StoreFailure => 500,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::InvalidIds => "invalid_ids",
            ErrorKind::StoreFailure => "store_failure",
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CatalogError {
    /// No active product with this id (missing or soft-deleted).
    #[error("Product with ID: {0} was not found.")]
    NotFound(ProductId),

    /// Ids from a bulk validation that do not exist at all, in request order.
    #[error("Some products were not found: {}", format_ids(.0))]
    InvalidIds(Vec<ProductId>),

    #[error("store failure: {0}")]
    Store(#[from] StoreError),
}

impl CatalogError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CatalogError::NotFound(_) => ErrorKind::NotFound,
            CatalogError::InvalidIds(_) => ErrorKind::InvalidIds,
            CatalogError::Store(_) => ErrorKind::StoreFailure,
        }
    }

    pub fn status(&self) -> u16 {
        self.kind().status()
    }

    pub fn code(&self) -> &'static str {
        self.kind().code()
    }
}

fn format_ids(ids: &[ProductId]) -> String {
    let parts: Vec<String> = ids.iter().map(ProductId::to_string).collect();
    format!("[{}]", parts.join(", "))
}

/// Product data-access service.
///
/// The store is handed in at construction; there is no global connection.
#[derive(Debug)]
pub struct ProductCatalog<S> {
    store: S,
}

impl<S> ProductCatalog<S>
where
    S: ProductStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Insert a new product (available by default). Payload validation is the
    /// caller's job.
    #[instrument(skip_all, fields(name = %payload.name), err)]
    pub async fn create(&self, payload: CreateProduct) -> Result<Product, CatalogError> {
        let product = self.store.insert(payload).await?;
        tracing::info!(id = %product.id, "product created");
        Ok(product)
    }

    /// One page of available products, ordered by id, plus page metadata.
    ///
    /// A page past the last one yields empty `data` with `meta` still filled in.
    #[instrument(skip_all, fields(page = pagination.page(), limit = pagination.limit()), err)]
    pub async fn find_all(&self, pagination: Pagination) -> Result<Page<Product>, CatalogError> {
        let total_items = self.store.count_available().await?;
        let data = self.store.list_available(pagination).await?;
        Ok(Page::new(data, pagination, total_items))
    }

    #[instrument(skip(self), err)]
    pub async fn find_one(&self, id: ProductId) -> Result<Product, CatalogError> {
        self.store
            .find_available(id)
            .await?
            .ok_or(CatalogError::NotFound(id))
    }

    /// Patch an available product. Any `id` in the payload is discarded; `id`
    /// selects the row.
    #[instrument(skip(self, update), err)]
    pub async fn update(&self, id: ProductId, update: UpdateProduct) -> Result<Product, CatalogError> {
        let patch = update.into_patch();
        let product = self
            .store
            .update_available(id, patch)
            .await?
            .ok_or(CatalogError::NotFound(id))?;
        tracing::info!(id = %product.id, "product updated");
        Ok(product)
    }

    /// Soft delete: the row stays, with `available = false`.
    #[instrument(skip(self), err)]
    pub async fn remove(&self, id: ProductId) -> Result<Product, CatalogError> {
        let product = self
            .store
            .soft_delete_available(id)
            .await?
            .ok_or(CatalogError::NotFound(id))?;
        tracing::info!(id = %product.id, "product removed");
        Ok(product)
    }

    /// Check that every id exists (available or not) and return the matching rows.
    ///
    /// Duplicates are ignored. Fails with `InvalidIds` listing the ids that
    /// are absent from the store.
    #[instrument(skip_all, fields(requested = ids.len()), err)]
    pub async fn validate_products(&self, ids: &[ProductId]) -> Result<Vec<Product>, CatalogError> {
        let distinct = dedup_ids(ids);
        if distinct.is_empty() {
            return Ok(Vec::new());
        }

        let found = self.store.find_by_ids(&distinct).await?;
        if found.len() != distinct.len() {
            let missing = missing_ids(&distinct, found.iter().map(|p| p.id));
            tracing::warn!(missing = %format_ids(&missing), "product validation failed");
            return Err(CatalogError::InvalidIds(missing));
        }

        Ok(found)
    }
}
