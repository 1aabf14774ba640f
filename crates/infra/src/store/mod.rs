//! Product store implementations.
//!
//! - `in_memory`: tests/dev, serialised transactions over a `BTreeMap`
//! - `sqlite`: embedded database
//! - `postgres`: production database

pub mod in_memory;
pub mod postgres;
pub mod sqlite;

mod sql;

use std::sync::Arc;

use thiserror::Error;

use gift_products::{ProductStore, StoreError};

use crate::config::{DatabaseConfig, StoreKind, UnsupportedUrl};

pub use in_memory::InMemoryProductStore;
pub use postgres::PostgresProductStore;
pub use sqlite::SqliteProductStore;

#[derive(Debug, Error)]
pub enum ConnectError {
    #[error(transparent)]
    UnsupportedUrl(#[from] UnsupportedUrl),

    #[error("failed to connect to {kind:?} store: {source}")]
    Connect {
        kind: StoreKind,
        #[source]
        source: sqlx::Error,
    },

    #[error("failed to prepare schema: {0}")]
    Migrate(#[from] StoreError),
}

/// Open the store selected by `config` and make sure its schema exists.
pub async fn connect(config: &DatabaseConfig) -> Result<Arc<dyn ProductStore>, ConnectError> {
    let kind = config.kind()?;
    let store: Arc<dyn ProductStore> = match kind {
        StoreKind::InMemory => Arc::new(InMemoryProductStore::new()),
        StoreKind::Sqlite => {
            let store = SqliteProductStore::connect(config)
                .await
                .map_err(|source| ConnectError::Connect { kind, source })?;
            store.migrate().await?;
            Arc::new(store)
        }
        StoreKind::Postgres => {
            let store = PostgresProductStore::connect(config)
                .await
                .map_err(|source| ConnectError::Connect { kind, source })?;
            store.migrate().await?;
            Arc::new(store)
        }
    };

    tracing::info!(store = ?kind, "product store ready");
    Ok(store)
}
