//! Product storage boundary.
//!
//! The service only ever sees these traits. A store hands out transactions; all
//! reads and writes of one service operation go through a single transaction,
//! which is either committed or rolled back as a whole.

use async_trait::async_trait;
use thiserror::Error;

use crate::product::{NewProduct, Product, ProductId};

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage-level failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The store's uniqueness guard on `name` rejected a write.
    #[error("product name already exists: {0}")]
    DuplicateName(String),

    /// An overwrite targeted a record that no longer exists.
    #[error("product not found: {0}")]
    NotFound(ProductId),

    /// A persisted row no longer satisfies the domain rules.
    #[error("corrupt product row: {0}")]
    Corrupt(String),

    /// Driver or connection failure.
    #[error("storage backend error in {operation}: {message}")]
    Backend { operation: &'static str, message: String },
}

impl StoreError {
    pub fn backend(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Backend {
            operation,
            message: message.into(),
        }
    }
}

/// Factory for product transactions.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Open a transaction. Effects become visible to other callers only on commit.
    async fn begin(&self) -> StoreResult<Box<dyn ProductTransaction>>;
}

/// Operations available inside one transaction.
///
/// Dropping a transaction without calling [`commit`](Self::commit) discards it.
#[async_trait]
pub trait ProductTransaction: Send {
    async fn find_by_id(&mut self, id: ProductId) -> StoreResult<Option<Product>>;

    /// All products in ascending id order.
    async fn find_all(&mut self) -> StoreResult<Vec<Product>>;

    async fn exists_by_id(&mut self, id: ProductId) -> StoreResult<bool>;

    async fn exists_by_name(&mut self, name: &str) -> StoreResult<bool>;

    /// Persist a new product and return it with its assigned id.
    async fn insert(&mut self, product: NewProduct) -> StoreResult<Product>;

    /// Overwrite an existing product.
    async fn save(&mut self, product: Product) -> StoreResult<Product>;

    async fn delete_by_id(&mut self, id: ProductId) -> StoreResult<()>;

    async fn commit(self: Box<Self>) -> StoreResult<()>;

    async fn rollback(self: Box<Self>) -> StoreResult<()>;
}

#[async_trait]
impl<S> ProductStore for std::sync::Arc<S>
where
    S: ProductStore + ?Sized,
{
    async fn begin(&self) -> StoreResult<Box<dyn ProductTransaction>> {
        (**self).begin().await
    }
}
