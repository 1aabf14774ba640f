//! Postgres-backed product store.
//!
//! ## Error Mapping
//!
//! | sqlx error | StoreError |
//! |------------|------------|
//! | unique violation (`23505`) on `products.name` | `DuplicateName` |
//! | any other database / pool / IO error | `Backend { operation, .. }` |
//! | row failing value-object rules | `Corrupt` |
//! | `UPDATE`/`DELETE` matching no row | `NotFound` |
//!
//! Every transaction is a real database transaction; dropping it without
//! commit rolls back on the server.

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::instrument;

use gift_core::Entity;
use gift_products::{
    NewProduct, Product, ProductId, ProductStore, ProductTransaction, StoreError, StoreResult,
};

use super::sql::{into_products, map_sqlx_error, ProductRow};
use crate::config::DatabaseConfig;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS products (
    id        BIGSERIAL     PRIMARY KEY,
    name      VARCHAR(255)  NOT NULL UNIQUE,
    price     BIGINT        NOT NULL CHECK (price >= 0),
    image_url VARCHAR(2083) NOT NULL
)
"#;

/// Postgres-backed product store.
///
/// Uses a sqlx connection pool, which is `Send + Sync` and cheap to clone.
#[derive(Debug, Clone)]
pub struct PostgresProductStore {
    pool: PgPool,
}

impl PostgresProductStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let url = config.url.as_deref().unwrap_or_default();
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Create the `products` table if it does not exist yet.
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::query(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("migrate", None, e))?;
        Ok(())
    }
}

#[async_trait]
impl ProductStore for PostgresProductStore {
    async fn begin(&self) -> StoreResult<Box<dyn ProductTransaction>> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", None, e))?;
        Ok(Box::new(PostgresTransaction { tx }))
    }
}

struct PostgresTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl ProductTransaction for PostgresTransaction {
    #[instrument(level = "debug", skip(self), fields(product_id = %id))]
    async fn find_by_id(&mut self, id: ProductId) -> StoreResult<Option<Product>> {
        let row = sqlx::query_as::<_, ProductRow>(
            "SELECT id, name, price, image_url FROM products WHERE id = $1",
        )
        .bind(id.get())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("find_by_id", None, e))?;

        row.map(Product::try_from).transpose()
    }

    #[instrument(level = "debug", skip(self))]
    async fn find_all(&mut self) -> StoreResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(
            "SELECT id, name, price, image_url FROM products ORDER BY id ASC",
        )
        .fetch_all(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("find_all", None, e))?;

        into_products(rows)
    }

    #[instrument(level = "debug", skip(self), fields(product_id = %id))]
    async fn exists_by_id(&mut self, id: ProductId) -> StoreResult<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM products WHERE id = $1)")
            .bind(id.get())
            .fetch_one(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("exists_by_id", None, e))
    }

    #[instrument(level = "debug", skip(self))]
    async fn exists_by_name(&mut self, name: &str) -> StoreResult<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM products WHERE name = $1)")
            .bind(name)
            .fetch_one(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("exists_by_name", None, e))
    }

    #[instrument(level = "debug", skip(self, product), fields(name = %product.name))]
    async fn insert(&mut self, product: NewProduct) -> StoreResult<Product> {
        let price = product.price.to_signed();

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO products (name, price, image_url) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(product.name.as_str())
        .bind(price)
        .bind(product.image_url.as_str())
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("insert", Some(product.name.as_str()), e))?;

        let id = ProductId::from_raw(id).map_err(|e| StoreError::Corrupt(e.to_string()))?;
        Ok(Product::from_new(id, product))
    }

    #[instrument(level = "debug", skip(self, product), fields(product_id = %product.id()))]
    async fn save(&mut self, product: Product) -> StoreResult<Product> {
        let price = product.price().to_signed();

        let result = sqlx::query(
            "UPDATE products SET name = $2, price = $3, image_url = $4 WHERE id = $1",
        )
        .bind(product.id().get())
        .bind(product.name().as_str())
        .bind(price)
        .bind(product.image_url().as_str())
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("save", Some(product.name().as_str()), e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(product.id()));
        }
        Ok(product)
    }

    #[instrument(level = "debug", skip(self), fields(product_id = %id))]
    async fn delete_by_id(&mut self, id: ProductId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id.get())
            .execute(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("delete_by_id", None, e))?;

        // A concurrent delete that committed first leaves nothing to match.
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", None, e))
    }

    async fn rollback(self: Box<Self>) -> StoreResult<()> {
        self.tx
            .rollback()
            .await
            .map_err(|e| map_sqlx_error("rollback", None, e))
    }
}
