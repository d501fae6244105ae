//! Products domain module.
//!
//! This crate contains the catalog's business rules (product shape, patch
//! semantics, pagination arithmetic, id-set validation), implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage).

pub mod pagination;
pub mod product;
pub mod validation;

pub use pagination::{last_page, Page, PageMeta, Pagination};
pub use product::{CreateProduct, Product, ProductPatch, UpdateProduct};
pub use validation::{dedup_ids, missing_ids};
