//! Product service: catalog rules + transaction orchestration.
//!
//! Every public operation opens exactly one store transaction, runs its
//! validation reads and its mutation inside it, then commits. Any failure rolls
//! the transaction back before the error is returned.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use gift_core::Entity;

use crate::error::{ProductError, ProductResult};
use crate::policy::CatalogPolicy;
use crate::product::{NewProduct, ProductId, ProductName, ProductUpdate};
use crate::response::ProductResponse;
use crate::store::{ProductStore, ProductTransaction};

pub struct ProductService {
    store: Arc<dyn ProductStore>,
    policy: CatalogPolicy,
}

impl ProductService {
    pub fn new(store: Arc<dyn ProductStore>, policy: CatalogPolicy) -> Self {
        Self { store, policy }
    }

    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: ProductId) -> ProductResult<ProductResponse> {
        let mut tx = self.store.begin().await?;
        let result = match tx.find_by_id(id).await {
            Ok(Some(product)) => Ok(ProductResponse::from(product)),
            Ok(None) => Err(ProductError::NotFound(id)),
            Err(e) => Err(e.into()),
        };
        finish(tx, result).await
    }

    #[instrument(skip(self))]
    pub async fn get_all_products(&self) -> ProductResult<Vec<ProductResponse>> {
        let mut tx = self.store.begin().await?;
        let result = tx
            .find_all()
            .await
            .map(|products| products.into_iter().map(ProductResponse::from).collect())
            .map_err(ProductError::from);
        finish(tx, result).await
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn add_product(&self, input: NewProduct) -> ProductResult<ProductResponse> {
        let mut tx = self.store.begin().await?;
        let result = self.add_in(&mut *tx, input).await;
        let result = finish(tx, result).await;
        match &result {
            Ok(created) => info!(product_id = created.id, "product added"),
            Err(e) => debug!(error = %e, "product add rejected"),
        }
        result
    }

    #[instrument(skip(self, input), fields(product_id = %input.id, name = %input.name))]
    pub async fn update_product(&self, input: ProductUpdate) -> ProductResult<ProductResponse> {
        let mut tx = self.store.begin().await?;
        let result = self.update_in(&mut *tx, input).await;
        let result = finish(tx, result).await;
        match &result {
            Ok(_) => info!("product updated"),
            Err(e) => debug!(error = %e, "product update rejected"),
        }
        result
    }

    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete_product(&self, id: ProductId) -> ProductResult<()> {
        let mut tx = self.store.begin().await?;
        let result = delete_in(&mut *tx, id).await;
        let result = finish(tx, result).await;
        match &result {
            Ok(()) => info!("product deleted"),
            Err(e) => debug!(error = %e, "product delete rejected"),
        }
        result
    }

    /// Fail with [`ProductError::NotFound`] unless a product with `id` exists.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn validate_exist_product_id(&self, id: ProductId) -> ProductResult<()> {
        let mut tx = self.store.begin().await?;
        let result = ensure_exists(&mut *tx, id).await;
        finish(tx, result).await
    }

    async fn add_in(
        &self,
        tx: &mut dyn ProductTransaction,
        input: NewProduct,
    ) -> ProductResult<ProductResponse> {
        self.policy.check_name(&input.name)?;
        ensure_name_available(tx, &input.name).await?;

        let saved = tx.insert(input).await?;
        Ok(ProductResponse::from(saved))
    }

    async fn update_in(
        &self,
        tx: &mut dyn ProductTransaction,
        input: ProductUpdate,
    ) -> ProductResult<ProductResponse> {
        let mut product = tx
            .find_by_id(input.id)
            .await?
            .ok_or(ProductError::NotFound(input.id))?;

        self.policy.check_name(&input.name)?;
        // Keeping the current name is not a collision with itself.
        if product.name() != &input.name {
            ensure_name_available(tx, &input.name).await?;
        }

        product.update(input.name, input.price, input.image_url);
        let saved = tx.save(product).await?;
        debug_assert_eq!(saved.id(), input.id);
        Ok(ProductResponse::from(saved))
    }
}

async fn ensure_exists(tx: &mut dyn ProductTransaction, id: ProductId) -> ProductResult<()> {
    if !tx.exists_by_id(id).await? {
        return Err(ProductError::NotFound(id));
    }
    Ok(())
}

async fn ensure_name_available(
    tx: &mut dyn ProductTransaction,
    name: &ProductName,
) -> ProductResult<()> {
    if tx.exists_by_name(name.as_str()).await? {
        return Err(ProductError::duplicate_name(name.as_str()));
    }
    Ok(())
}

async fn delete_in(tx: &mut dyn ProductTransaction, id: ProductId) -> ProductResult<()> {
    ensure_exists(tx, id).await?;
    tx.delete_by_id(id).await?;
    Ok(())
}

/// Commit on success, roll back on failure.
///
/// A failed rollback is logged; the caller still sees the original error.
async fn finish<T: Send>(
    tx: Box<dyn ProductTransaction>,
    result: ProductResult<T>,
) -> ProductResult<T> {
    match result {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                warn!(error = %rollback_err, "transaction rollback failed");
            }
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::product::{ImageUrl, Price, Product};
    use crate::store::{StoreError, StoreResult};

    /// Store double that serves a fixed catalog and records how each
    /// transaction ended. Writes are accepted but not kept.
    #[derive(Default)]
    struct RecordingStore {
        products: Vec<Product>,
        outcomes: Arc<Mutex<Vec<&'static str>>>,
        writes: Arc<Mutex<Vec<&'static str>>>,
    }

    struct RecordingTx {
        products: Vec<Product>,
        outcomes: Arc<Mutex<Vec<&'static str>>>,
        writes: Arc<Mutex<Vec<&'static str>>>,
    }

    #[async_trait]
    impl ProductStore for RecordingStore {
        async fn begin(&self) -> StoreResult<Box<dyn ProductTransaction>> {
            Ok(Box::new(RecordingTx {
                products: self.products.clone(),
                outcomes: self.outcomes.clone(),
                writes: self.writes.clone(),
            }))
        }
    }

    #[async_trait]
    impl ProductTransaction for RecordingTx {
        async fn find_by_id(&mut self, id: ProductId) -> StoreResult<Option<Product>> {
            Ok(self.products.iter().find(|p| p.id() == id).cloned())
        }

        async fn find_all(&mut self) -> StoreResult<Vec<Product>> {
            Ok(self.products.clone())
        }

        async fn exists_by_id(&mut self, id: ProductId) -> StoreResult<bool> {
            Ok(self.products.iter().any(|p| p.id() == id))
        }

        async fn exists_by_name(&mut self, name: &str) -> StoreResult<bool> {
            Ok(self.products.iter().any(|p| p.name().as_str() == name))
        }

        async fn insert(&mut self, product: NewProduct) -> StoreResult<Product> {
            self.writes.lock().unwrap().push("insert");
            Ok(Product::from_new(ProductId::from_raw(100).unwrap(), product))
        }

        async fn save(&mut self, product: Product) -> StoreResult<Product> {
            self.writes.lock().unwrap().push("save");
            Ok(product)
        }

        async fn delete_by_id(&mut self, _id: ProductId) -> StoreResult<()> {
            self.writes.lock().unwrap().push("delete");
            Ok(())
        }

        async fn commit(self: Box<Self>) -> StoreResult<()> {
            self.outcomes.lock().unwrap().push("commit");
            Ok(())
        }

        async fn rollback(self: Box<Self>) -> StoreResult<()> {
            self.outcomes.lock().unwrap().push("rollback");
            Ok(())
        }
    }

    struct FailingStore;

    #[async_trait]
    impl ProductStore for FailingStore {
        async fn begin(&self) -> StoreResult<Box<dyn ProductTransaction>> {
            Err(StoreError::backend("begin", "pool closed"))
        }
    }

    fn product(id: i64, name: &str) -> Product {
        Product::from_parts(id, name.into(), 1000, "http://x/y.png".into()).unwrap()
    }

    fn new_product(name: &str) -> NewProduct {
        NewProduct {
            name: ProductName::parse(name).unwrap(),
            price: Price::new(1000).unwrap(),
            image_url: ImageUrl::parse("http://x/y.png").unwrap(),
        }
    }

    fn service(store: RecordingStore) -> ProductService {
        ProductService::new(Arc::new(store), CatalogPolicy::default())
    }

    fn id(raw: i64) -> ProductId {
        ProductId::from_raw(raw).unwrap()
    }

    #[tokio::test]
    async fn successful_add_commits() {
        let store = RecordingStore::default();
        let outcomes = store.outcomes.clone();
        let writes = store.writes.clone();

        let created = service(store).add_product(new_product("Mug")).await.unwrap();

        assert_eq!(created.id, 100);
        assert_eq!(*writes.lock().unwrap(), vec!["insert"]);
        assert_eq!(*outcomes.lock().unwrap(), vec!["commit"]);
    }

    #[tokio::test]
    async fn reserved_keyword_is_checked_before_uniqueness_and_rolls_back() {
        let store = RecordingStore {
            products: vec![product(1, "카카오머그")],
            ..Default::default()
        };
        let outcomes = store.outcomes.clone();
        let writes = store.writes.clone();

        let err = service(store)
            .add_product(new_product("카카오머그"))
            .await
            .unwrap_err();

        // Keyword message, not the duplicate-name message.
        assert!(matches!(err, ProductError::InvalidArgument(ref m) if m.contains("카카오")));
        assert!(writes.lock().unwrap().is_empty());
        assert_eq!(*outcomes.lock().unwrap(), vec!["rollback"]);
    }

    #[tokio::test]
    async fn duplicate_name_is_rejected_without_writing() {
        let store = RecordingStore {
            products: vec![product(1, "Mug")],
            ..Default::default()
        };
        let writes = store.writes.clone();

        let err = service(store).add_product(new_product("Mug")).await.unwrap_err();

        assert_eq!(err, ProductError::duplicate_name("Mug"));
        assert!(writes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_of_missing_product_is_not_found() {
        let store = RecordingStore::default();
        let outcomes = store.outcomes.clone();

        let err = service(store)
            .update_product(ProductUpdate {
                id: id(5),
                name: ProductName::parse("Cup").unwrap(),
                price: Price::new(1).unwrap(),
                image_url: ImageUrl::parse("http://x/c.png").unwrap(),
            })
            .await
            .unwrap_err();

        assert_eq!(err, ProductError::NotFound(id(5)));
        assert_eq!(*outcomes.lock().unwrap(), vec!["rollback"]);
    }

    #[tokio::test]
    async fn update_may_keep_own_name() {
        let store = RecordingStore {
            products: vec![product(1, "Mug")],
            ..Default::default()
        };

        let updated = service(store)
            .update_product(ProductUpdate {
                id: id(1),
                name: ProductName::parse("Mug").unwrap(),
                price: Price::new(2500).unwrap(),
                image_url: ImageUrl::parse("http://x/mug2.png").unwrap(),
            })
            .await
            .unwrap();

        assert_eq!(updated.price, 2500);
        assert_eq!(updated.image_url, "http://x/mug2.png");
    }

    #[tokio::test]
    async fn update_to_another_products_name_is_rejected() {
        let store = RecordingStore {
            products: vec![product(1, "Mug"), product(2, "Cup")],
            ..Default::default()
        };
        let writes = store.writes.clone();

        let err = service(store)
            .update_product(ProductUpdate {
                id: id(1),
                name: ProductName::parse("Cup").unwrap(),
                price: Price::new(1).unwrap(),
                image_url: ImageUrl::parse("http://x/c.png").unwrap(),
            })
            .await
            .unwrap_err();

        assert_eq!(err, ProductError::duplicate_name("Cup"));
        assert!(writes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_applies_reserved_keyword_rule() {
        let store = RecordingStore {
            products: vec![product(1, "Mug")],
            ..Default::default()
        };

        let err = service(store)
            .update_product(ProductUpdate {
                id: id(1),
                name: ProductName::parse("카카오 Mug").unwrap(),
                price: Price::new(1).unwrap(),
                image_url: ImageUrl::parse("http://x/c.png").unwrap(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, ProductError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn delete_checks_existence_first() {
        let store = RecordingStore::default();
        let writes = store.writes.clone();

        let err = service(store).delete_product(id(3)).await.unwrap_err();

        assert_eq!(err, ProductError::NotFound(id(3)));
        assert!(writes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn validate_exist_product_id_is_a_pure_check() {
        let store = RecordingStore {
            products: vec![product(1, "Mug")],
            ..Default::default()
        };
        let writes = store.writes.clone();
        let service = service(store);

        service.validate_exist_product_id(id(1)).await.unwrap();
        assert_eq!(
            service.validate_exist_product_id(id(2)).await.unwrap_err(),
            ProductError::NotFound(id(2))
        );
        assert!(writes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn begin_failure_surfaces_as_store_error() {
        let service = ProductService::new(Arc::new(FailingStore), CatalogPolicy::default());

        let err = service.get_all_products().await.unwrap_err();

        assert!(matches!(err, ProductError::Store(StoreError::Backend { operation: "begin", .. })));
    }
}
