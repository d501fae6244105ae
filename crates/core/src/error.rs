//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Covers input that is malformed before it ever reaches storage (blank names,
/// non-positive page sizes, unparsable identifiers). Lookup failures such as a
/// missing product are raised by the catalog, not here.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_detail() {
        let err = DomainError::validation("price must not be negative");
        assert_eq!(err.to_string(), "validation failed: price must not be negative");

        let err = DomainError::invalid_id("ProductId: abc");
        assert_eq!(err.to_string(), "invalid identifier: ProductId: abc");
    }
}
