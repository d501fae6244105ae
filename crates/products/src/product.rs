use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use catalog_core::{DomainError, DomainResult, ProductId};

/// A catalog product as persisted by the store.
///
/// A product is *active* while `available` is true. Removing a product only
/// flips `available` to false; the row itself is kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: f64,
    pub available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Build a freshly inserted product (store-assigned id, available).
    pub fn from_create(id: ProductId, payload: CreateProduct, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: payload.name,
            price: payload.price,
            available: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.available
    }

    /// Apply a partial patch. Only provided fields change; `id` is never touched.
    pub fn apply_patch(&mut self, patch: ProductPatch, now: DateTime<Utc>) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        self.updated_at = now;
    }

    /// Soft delete: mark unavailable, keep the row.
    pub fn mark_unavailable(&mut self, now: DateTime<Utc>) {
        self.available = false;
        self.updated_at = now;
    }
}

/// Payload for creating a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateProduct {
    pub name: String,
    pub price: f64,
}

impl CreateProduct {
    pub fn new(name: impl Into<String>, price: f64) -> Self {
        Self {
            name: name.into(),
            price,
        }
    }

    /// Shape checks performed by transports before the payload reaches the catalog.
    pub fn validate(&self) -> DomainResult<()> {
        validate_name(&self.name)?;
        validate_price(self.price)
    }
}

/// Update payload as received from a caller.
///
/// Callers may echo the product `id` in the body; it is carried here only so it
/// can be discarded. The id addressed by the request is authoritative.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateProduct {
    #[serde(default)]
    pub id: Option<ProductId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
}

impl UpdateProduct {
    pub fn validate(&self) -> DomainResult<()> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(price) = self.price {
            validate_price(price)?;
        }
        Ok(())
    }

    /// Strip the `id` key, keeping only the mutable fields.
    pub fn into_patch(self) -> ProductPatch {
        ProductPatch {
            name: self.name,
            price: self.price,
        }
    }
}

/// Field-level patch applied to an active product.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub price: Option<f64>,
}

fn validate_name(name: &str) -> DomainResult<()> {
    if name.trim().is_empty() {
        return Err(DomainError::validation("product name cannot be empty"));
    }
    Ok(())
}

fn validate_price(price: f64) -> DomainResult<()> {
    if !price.is_finite() {
        return Err(DomainError::validation("price must be a finite number"));
    }
    if price < 0.0 {
        return Err(DomainError::validation("price must not be negative"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn pen() -> Product {
        Product::from_create(ProductId::new(1), CreateProduct::new("Pen", 1.5), test_time())
    }

    #[test]
    fn created_product_is_available() {
        let product = pen();
        assert_eq!(product.id, ProductId::new(1));
        assert_eq!(product.name, "Pen");
        assert_eq!(product.price, 1.5);
        assert!(product.is_active());
        assert_eq!(product.created_at, product.updated_at);
    }

    #[test]
    fn create_payload_rejects_blank_name() {
        let err = CreateProduct::new("   ", 1.0).validate().unwrap_err();
        match err {
            DomainError::Validation(_) => {}
            _ => panic!("Expected Validation error for empty name"),
        }
    }

    #[test]
    fn create_payload_rejects_negative_and_nan_prices() {
        assert!(CreateProduct::new("Pen", -0.01).validate().is_err());
        assert!(CreateProduct::new("Pen", f64::NAN).validate().is_err());
        assert!(CreateProduct::new("Pen", 0.0).validate().is_ok());
    }

    #[test]
    fn update_strips_id_from_patch() {
        let update = UpdateProduct {
            id: Some(ProductId::new(99)),
            name: Some("x".to_string()),
            price: None,
        };

        let patch = update.into_patch();
        assert_eq!(
            patch,
            ProductPatch {
                name: Some("x".to_string()),
                price: None,
            }
        );
    }

    #[test]
    fn apply_patch_changes_only_provided_fields() {
        let mut product = pen();
        product.apply_patch(
            ProductPatch {
                name: None,
                price: Some(2.25),
            },
            test_time(),
        );

        assert_eq!(product.id, ProductId::new(1));
        assert_eq!(product.name, "Pen");
        assert_eq!(product.price, 2.25);
        assert!(product.is_active());
    }

    #[test]
    fn mark_unavailable_keeps_fields() {
        let mut product = pen();
        product.mark_unavailable(test_time());

        assert!(!product.is_active());
        assert_eq!(product.name, "Pen");
        assert_eq!(product.id, ProductId::new(1));
    }

    #[test]
    fn update_payload_accepts_missing_fields() {
        let update: UpdateProduct = serde_json::from_value(serde_json::json!({ "name": "Pencil" })).unwrap();
        assert_eq!(update.id, None);
        assert_eq!(update.price, None);
        assert!(update.validate().is_ok());
        assert_eq!(
            update.into_patch(),
            ProductPatch {
                name: Some("Pencil".to_string()),
                price: None,
            }
        );
    }
}
