//! Postgres-backed product store.
//!
//! ## Error Mapping
//!
//! SQLx errors are mapped to `StoreError` as follows:
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) | `23505` | `Constraint` |
//! | Database (not-null violation) | `23502` | `Constraint` |
//! | Database (check constraint violation) | `23514` | `Constraint` |
//! | Database (other) | Any other | `Database` |
//! | PoolClosed / PoolTimedOut / Io | N/A | `Unavailable` |
//! | ColumnDecode / Decode | N/A | `Decode` |
//! | Other | N/A | `Database` |
//!
//! ## Atomic check-then-act
//!
//! Update and soft delete are single `UPDATE ... WHERE id = $1 AND available
//! = TRUE RETURNING ...` statements; an empty result means the product is
//! missing or already soft-deleted.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Row};
use tracing::{instrument, Span};

use catalog_core::ProductId;
use catalog_products::{CreateProduct, Pagination, Product, ProductPatch};

use super::r#trait::{ProductStore, StoreError};

/// Postgres-backed product table.
///
/// ## Thread Safety
///
/// Uses the SQLx connection pool, which is `Send + Sync` and shared through an
/// `Arc`. The pool is created once at startup and closed on shutdown.
#[derive(Debug, Clone)]
pub struct PostgresProductStore {
    pool: Arc<PgPool>,
}

impl PostgresProductStore {
    /// Create a new PostgresProductStore with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create the `products` table and its availability index if missing.
    ///
    /// Bootstrap convenience for fresh databases; schema evolution is out of scope.
    #[instrument(skip(self), err)]
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS products (
                id SERIAL PRIMARY KEY,
                name TEXT NOT NULL,
                price DOUBLE PRECISION NOT NULL,
                available BOOLEAN NOT NULL DEFAULT TRUE,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_products_table", e))?;

        sqlx::query("CREATE INDEX IF NOT EXISTS products_available_idx ON products (available)")
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("create_products_available_index", e))?;

        Ok(())
    }
}

#[async_trait::async_trait]
impl ProductStore for PostgresProductStore {
    #[instrument(skip_all, fields(name = %payload.name), err)]
    async fn insert(&self, payload: CreateProduct) -> Result<Product, StoreError> {
        let row = sqlx::query(
            r#"
            INSERT INTO products (name, price)
            VALUES ($1, $2)
            RETURNING id, name, price, available, created_at, updated_at
            "#,
        )
        .bind(&payload.name)
        .bind(payload.price)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_product", e))?;

        decode_row(&row)
    }

    #[instrument(skip(self), fields(total_items = tracing::field::Empty), err)]
    async fn count_available(&self) -> Result<u64, StoreError> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM products WHERE available = TRUE")
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("count_available", e))?;

        let total: i64 = row
            .try_get("total")
            .map_err(|e| StoreError::Decode(format!("failed to read count: {e}")))?;

        Span::current().record("total_items", total);
        Ok(total.max(0) as u64)
    }

    #[instrument(skip_all, fields(page = pagination.page(), limit = pagination.limit()), err)]
    async fn list_available(&self, pagination: Pagination) -> Result<Vec<Product>, StoreError> {
        let offset = i64::try_from(pagination.offset()).unwrap_or(i64::MAX);

        let rows = sqlx::query(
            r#"
            SELECT id, name, price, available, created_at, updated_at
            FROM products
            WHERE available = TRUE
            ORDER BY id ASC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(i64::from(pagination.limit()))
        .bind(offset)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_available", e))?;

        rows.iter().map(decode_row).collect()
    }

    #[instrument(skip_all, fields(id = %id), err)]
    async fn find_available(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, price, available, created_at, updated_at
            FROM products
            WHERE id = $1 AND available = TRUE
            "#,
        )
        .bind(id.get())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_available", e))?;

        row.as_ref().map(decode_row).transpose()
    }

    #[instrument(skip_all, fields(id = %id), err)]
    async fn find_any(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, price, available, created_at, updated_at
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(id.get())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_any", e))?;

        row.as_ref().map(decode_row).transpose()
    }

    #[instrument(skip_all, fields(requested = ids.len()), err)]
    async fn find_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, StoreError> {
        let raw: Vec<i32> = ids.iter().map(|id| id.get()).collect();

        let rows = sqlx::query(
            r#"
            SELECT id, name, price, available, created_at, updated_at
            FROM products
            WHERE id = ANY($1)
            ORDER BY id ASC
            "#,
        )
        .bind(raw)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_by_ids", e))?;

        rows.iter().map(decode_row).collect()
    }

    #[instrument(skip_all, fields(id = %id), err)]
    async fn update_available(
        &self,
        id: ProductId,
        patch: ProductPatch,
    ) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query(
            r#"
            UPDATE products
            SET
                name = COALESCE($2, name),
                price = COALESCE($3, price),
                updated_at = NOW()
            WHERE id = $1 AND available = TRUE
            RETURNING id, name, price, available, created_at, updated_at
            "#,
        )
        .bind(id.get())
        .bind(patch.name)
        .bind(patch.price)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_available", e))?;

        row.as_ref().map(decode_row).transpose()
    }

    #[instrument(skip_all, fields(id = %id), err)]
    async fn soft_delete_available(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query(
            r#"
            UPDATE products
            SET available = FALSE, updated_at = NOW()
            WHERE id = $1 AND available = TRUE
            RETURNING id, name, price, available, created_at, updated_at
            "#,
        )
        .bind(id.get())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("soft_delete_available", e))?;

        row.as_ref().map(decode_row).transpose()
    }
}

/// Map SQLx errors to StoreError, naming the failing operation.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());

            match db_err.code().as_deref() {
                Some("23505") | Some("23502") | Some("23514") => StoreError::Constraint(msg),
                _ => StoreError::Database(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            StoreError::Unavailable(format!("connection pool closed in {}", operation))
        }
        sqlx::Error::PoolTimedOut => {
            StoreError::Unavailable(format!("connection pool timed out in {}", operation))
        }
        sqlx::Error::Io(e) => StoreError::Unavailable(format!("io error in {}: {}", operation, e)),
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
            StoreError::Decode(format!("{} in {}", err, operation))
        }
        _ => StoreError::Database(format!("sqlx error in {}: {}", operation, err)),
    }
}

// SQLx row types

#[derive(Debug)]
struct ProductRow {
    id: i32,
    name: String,
    price: f64,
    available: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for ProductRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(ProductRow {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            price: row.try_get("price")?,
            available: row.try_get("available")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: ProductId::new(row.id),
            name: row.name,
            price: row.price,
            available: row.available,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

fn decode_row(row: &sqlx::postgres::PgRow) -> Result<Product, StoreError> {
    ProductRow::from_row(row)
        .map(Product::from)
        .map_err(|e| StoreError::Decode(format!("failed to deserialize product row: {}", e)))
}
