use std::collections::BTreeMap;
use std::sync::RwLock;

use chrono::Utc;

use catalog_core::ProductId;
use catalog_products::{CreateProduct, Pagination, Product, ProductPatch};

use super::r#trait::{ProductStore, StoreError};

#[derive(Debug, Default)]
struct Table {
    last_id: i32,
    rows: BTreeMap<ProductId, Product>,
}

/// In-memory product table.
///
/// Intended for tests/dev. Ids are assigned sequentially starting at 1, and the
/// `BTreeMap` keeps rows in id order, matching the Postgres store's ordering.
#[derive(Debug, Default)]
pub struct InMemoryProductStore {
    table: RwLock<Table>,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Table>, StoreError> {
        self.table
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Table>, StoreError> {
        self.table
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))
    }
}

#[async_trait::async_trait]
impl ProductStore for InMemoryProductStore {
    async fn insert(&self, payload: CreateProduct) -> Result<Product, StoreError> {
        let mut table = self.write()?;
        let next = table
            .last_id
            .checked_add(1)
            .ok_or_else(|| StoreError::Constraint("product id sequence exhausted".to_string()))?;
        table.last_id = next;

        let id = ProductId::new(next);
        let product = Product::from_create(id, payload, Utc::now());
        table.rows.insert(id, product.clone());
        Ok(product)
    }

    async fn count_available(&self) -> Result<u64, StoreError> {
        let table = self.read()?;
        Ok(table.rows.values().filter(|p| p.is_active()).count() as u64)
    }

    async fn list_available(&self, pagination: Pagination) -> Result<Vec<Product>, StoreError> {
        let table = self.read()?;
        let skip = usize::try_from(pagination.offset()).unwrap_or(usize::MAX);
        Ok(table
            .rows
            .values()
            .filter(|p| p.is_active())
            .skip(skip)
            .take(pagination.limit() as usize)
            .cloned()
            .collect())
    }

    async fn find_available(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let table = self.read()?;
        Ok(table.rows.get(&id).filter(|p| p.is_active()).cloned())
    }

    async fn find_any(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let table = self.read()?;
        Ok(table.rows.get(&id).cloned())
    }

    async fn find_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, StoreError> {
        let table = self.read()?;
        let mut found: Vec<Product> = ids
            .iter()
            .filter_map(|id| table.rows.get(id).cloned())
            .collect();
        found.sort_by_key(|p| p.id);
        found.dedup_by_key(|p| p.id);
        Ok(found)
    }

    async fn update_available(
        &self,
        id: ProductId,
        patch: ProductPatch,
    ) -> Result<Option<Product>, StoreError> {
        let mut table = self.write()?;
        match table.rows.get_mut(&id) {
            Some(product) if product.is_active() => {
                product.apply_patch(patch, Utc::now());
                Ok(Some(product.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn soft_delete_available(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let mut table = self.write()?;
        match table.rows.get_mut(&id) {
            Some(product) if product.is_active() => {
                product.mark_unavailable(Utc::now());
                Ok(Some(product.clone()))
            }
            _ => Ok(None),
        }
    }
}
