//! SQLite-backed product store (embedded deployments and tests).
//!
//! Error mapping matches the Postgres store; the unique violation arrives as
//! `SQLITE_CONSTRAINT_UNIQUE` instead of `23505`.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::instrument;

use gift_core::Entity;
use gift_products::{
    NewProduct, Product, ProductId, ProductStore, ProductTransaction, StoreError, StoreResult,
};

use super::sql::{into_products, map_sqlx_error, ProductRow};
use crate::config::DatabaseConfig;

/// How long a write waits on a lock held by another process.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS products (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    name      TEXT    NOT NULL UNIQUE,
    price     INTEGER NOT NULL CHECK (price >= 0),
    image_url TEXT    NOT NULL
)
"#;

/// SQLite-backed product store.
#[derive(Debug, Clone)]
pub struct SqliteProductStore {
    pool: SqlitePool,
}

impl SqliteProductStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (and create if missing) the database at `config.url`.
    ///
    /// The pool holds exactly one connection, so transactions run one after
    /// another. SQLite allows a single writer, and two deferred transactions
    /// that both read before writing fail with `SQLITE_BUSY` instead of
    /// waiting. `config.max_connections` is ignored here.
    ///
    /// The connection is never recycled, which also keeps a `sqlite::memory:`
    /// database alive for the lifetime of the store.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let url = config.url.as_deref().unwrap_or("sqlite::memory:");
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .busy_timeout(BUSY_TIMEOUT);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
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
impl ProductStore for SqliteProductStore {
    async fn begin(&self) -> StoreResult<Box<dyn ProductTransaction>> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", None, e))?;
        Ok(Box::new(SqliteTransaction { tx }))
    }
}

struct SqliteTransaction {
    tx: Transaction<'static, Sqlite>,
}

#[async_trait]
impl ProductTransaction for SqliteTransaction {
    #[instrument(level = "debug", skip(self), fields(product_id = %id))]
    async fn find_by_id(&mut self, id: ProductId) -> StoreResult<Option<Product>> {
        let row = sqlx::query_as::<_, ProductRow>(
            "SELECT id, name, price, image_url FROM products WHERE id = ?1",
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
        let found: i64 =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM products WHERE id = ?1)")
                .bind(id.get())
                .fetch_one(&mut *self.tx)
                .await
                .map_err(|e| map_sqlx_error("exists_by_id", None, e))?;
        Ok(found != 0)
    }

    #[instrument(level = "debug", skip(self))]
    async fn exists_by_name(&mut self, name: &str) -> StoreResult<bool> {
        let found: i64 =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM products WHERE name = ?1)")
                .bind(name)
                .fetch_one(&mut *self.tx)
                .await
                .map_err(|e| map_sqlx_error("exists_by_name", None, e))?;
        Ok(found != 0)
    }

    #[instrument(level = "debug", skip(self, product), fields(name = %product.name))]
    async fn insert(&mut self, product: NewProduct) -> StoreResult<Product> {
        let price = product.price.to_signed();

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO products (name, price, image_url) VALUES (?1, ?2, ?3) RETURNING id",
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
            "UPDATE products SET name = ?1, price = ?2, image_url = ?3 WHERE id = ?4",
        )
        .bind(product.name().as_str())
        .bind(price)
        .bind(product.image_url().as_str())
        .bind(product.id().get())
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
        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id.get())
            .execute(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("delete_by_id", None, e))?;

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
