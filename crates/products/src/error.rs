//! Service error taxonomy.

use thiserror::Error;

use gift_core::DomainError;

use crate::product::ProductId;
use crate::store::StoreError;

pub type ProductResult<T> = Result<T, ProductError>;

/// Failure of a product service operation.
///
/// Each kind maps to one response class at the HTTP boundary.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProductError {
    /// No product with this id exists.
    #[error("product not found: {0}")]
    NotFound(ProductId),

    /// A business rule rejected the request (reserved keyword, duplicate name).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The input was structurally invalid.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    #[error(transparent)]
    Store(StoreError),
}

impl ProductError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn duplicate_name(name: &str) -> Self {
        Self::InvalidArgument(format!("product name already exists: {name}"))
    }
}

impl From<DomainError> for ProductError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => Self::MalformedInput(msg),
            DomainError::InvariantViolation(msg) => Self::InvalidArgument(msg),
        }
    }
}

impl From<StoreError> for ProductError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateName(name) => Self::duplicate_name(&name),
            StoreError::NotFound(id) => Self::NotFound(id),
            other => Self::Store(other),
        }
    }
}
