use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};

use gift_core::Entity;
use gift_products::{
    NewProduct, Product, ProductId, ProductStore, ProductTransaction, StoreError, StoreResult,
};

#[derive(Debug, Clone, Default)]
struct Catalog {
    products: BTreeMap<ProductId, Product>,
    last_id: i64,
}

impl Catalog {
    fn name_taken(&self, name: &str, except: Option<ProductId>) -> bool {
        self.products
            .values()
            .any(|p| p.name().as_str() == name && Some(p.id()) != except)
    }
}

/// In-memory product store.
///
/// Intended for tests/dev. A transaction holds the catalog lock from `begin`
/// until it is committed, rolled back or dropped, so transactions never overlap.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProductStore {
    catalog: Arc<Mutex<Catalog>>,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of committed products.
    pub async fn len(&self) -> usize {
        self.catalog.lock().await.products.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl ProductStore for InMemoryProductStore {
    async fn begin(&self) -> StoreResult<Box<dyn ProductTransaction>> {
        let guard = self.catalog.clone().lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(InMemoryTransaction { guard, working }))
    }
}

/// Works on a private copy; `commit` writes the copy back.
struct InMemoryTransaction {
    guard: OwnedMutexGuard<Catalog>,
    working: Catalog,
}

#[async_trait]
impl ProductTransaction for InMemoryTransaction {
    async fn find_by_id(&mut self, id: ProductId) -> StoreResult<Option<Product>> {
        Ok(self.working.products.get(&id).cloned())
    }

    async fn find_all(&mut self) -> StoreResult<Vec<Product>> {
        Ok(self.working.products.values().cloned().collect())
    }

    async fn exists_by_id(&mut self, id: ProductId) -> StoreResult<bool> {
        Ok(self.working.products.contains_key(&id))
    }

    async fn exists_by_name(&mut self, name: &str) -> StoreResult<bool> {
        Ok(self.working.name_taken(name, None))
    }

    async fn insert(&mut self, product: NewProduct) -> StoreResult<Product> {
        if self.working.name_taken(product.name.as_str(), None) {
            return Err(StoreError::DuplicateName(product.name.as_str().to_string()));
        }

        let next = self.working.last_id + 1;
        let id = ProductId::from_raw(next)
            .map_err(|e| StoreError::backend("insert", e.to_string()))?;
        self.working.last_id = next;

        let stored = Product::from_new(id, product);
        self.working.products.insert(id, stored.clone());
        Ok(stored)
    }

    async fn save(&mut self, product: Product) -> StoreResult<Product> {
        let id = product.id();
        if !self.working.products.contains_key(&id) {
            return Err(StoreError::NotFound(id));
        }
        if self.working.name_taken(product.name().as_str(), Some(id)) {
            return Err(StoreError::DuplicateName(product.name().as_str().to_string()));
        }

        self.working.products.insert(id, product.clone());
        Ok(product)
    }

    async fn delete_by_id(&mut self, id: ProductId) -> StoreResult<()> {
        self.working
            .products
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound(id))
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let InMemoryTransaction { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> StoreResult<()> {
        Ok(())
    }
}
