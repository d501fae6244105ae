//! Page-number pagination and the `{ data, meta }` page envelope.

use serde::{Deserialize, Serialize};

use catalog_core::{DomainError, DomainResult};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;

/// A validated page request. Both `page` (1-based) and `limit` are positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    page: u32,
    limit: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Pagination {
    pub fn new(page: i64, limit: i64) -> DomainResult<Self> {
        Ok(Self {
            page: positive("page", page)?,
            limit: positive("limit", limit)?,
        })
    }

    /// Build from optional query values, falling back to the defaults.
    pub fn from_parts(page: Option<i64>, limit: Option<i64>) -> DomainResult<Self> {
        Self::new(
            page.unwrap_or(i64::from(DEFAULT_PAGE)),
            limit.unwrap_or(i64::from(DEFAULT_LIMIT)),
        )
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of rows to skip: `(page - 1) * limit`.
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

fn positive(field: &str, value: i64) -> DomainResult<u32> {
    if value <= 0 {
        return Err(DomainError::validation(format!(
            "{field} must be a positive integer (got {value})"
        )));
    }
    u32::try_from(value)
        .map_err(|_| DomainError::validation(format!("{field} is too large (got {value})")))
}

/// `ceil(total_items / limit)`; zero when there are no items.
pub fn last_page(total_items: u64, limit: u32) -> u64 {
    total_items.div_ceil(u64::from(limit))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    pub page: u32,
    pub last_page: u64,
    pub total_items: u64,
}

/// Page envelope returned by list operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, pagination: Pagination, total_items: u64) -> Self {
        Self {
            data,
            meta: PageMeta {
                page: pagination.page(),
                last_page: last_page(total_items, pagination.limit()),
                total_items,
            },
        }
    }
}
