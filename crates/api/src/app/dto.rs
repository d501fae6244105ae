use serde::Deserialize;

use catalog_core::{DomainResult, ProductId};
use catalog_products::{CreateProduct, Pagination};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub price: f64,
}

impl CreateProductRequest {
    pub fn into_payload(self) -> DomainResult<CreateProduct> {
        let payload = CreateProduct::new(self.name, self.price);
        payload.validate()?;
        Ok(payload)
    }
}

/// `?page=&limit=` query (both optional; defaults 1 and 10).
#[derive(Debug, Default, Deserialize)]
pub struct PaginationQuery {
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub limit: Option<i64>,
}

impl PaginationQuery {
    pub fn into_pagination(self) -> DomainResult<Pagination> {
        Pagination::from_parts(self.page, self.limit)
    }
}

#[derive(Debug, Deserialize)]
pub struct ValidateProductsRequest {
    pub ids: Vec<ProductId>,
}

pub fn parse_product_id(raw: &str) -> DomainResult<ProductId> {
    raw.parse()
}
