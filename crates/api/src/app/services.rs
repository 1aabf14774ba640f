use std::sync::Arc;

use anyhow::Context;

use gift_infra::InMemoryProductStore;
use gift_products::{CatalogPolicy, ProductService};

use crate::config::AppConfig;

/// Open the configured store and wrap it in the product service.
pub async fn build_service(config: &AppConfig) -> anyhow::Result<Arc<ProductService>> {
    let store = gift_infra::connect(&config.database)
        .await
        .context("failed to open product store")?;

    tracing::info!(
        reserved_keyword = config.policy.reserved_keyword(),
        "product service ready"
    );

    Ok(Arc::new(ProductService::new(store, config.policy.clone())))
}

/// Service over a fresh in-memory store, for tests and local runs.
pub fn in_memory_service(policy: CatalogPolicy) -> Arc<ProductService> {
    Arc::new(ProductService::new(Arc::new(InMemoryProductStore::new()), policy))
}
