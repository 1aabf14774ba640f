//! Row mapping and error translation shared by the SQL stores.

use gift_products::{Product, StoreError};

/// Raw `products` row as both drivers return it.
#[derive(Debug, sqlx::FromRow)]
pub(super) struct ProductRow {
    pub id: i64,
    pub name: String,
    pub price: i64,
    pub image_url: String,
}

impl TryFrom<ProductRow> for Product {
    type Error = StoreError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let id = row.id;
        Product::from_parts(row.id, row.name, row.price, row.image_url)
            .map_err(|e| StoreError::Corrupt(format!("product {id}: {e}")))
    }
}

pub(super) fn into_products(rows: Vec<ProductRow>) -> Result<Vec<Product>, StoreError> {
    rows.into_iter().map(Product::try_from).collect()
}

/// Map a sqlx error to a `StoreError`.
///
/// Unique violations come from the `name` index (the only unique column
/// besides the primary key, which the store assigns itself).
pub(super) fn map_sqlx_error(operation: &'static str, name: Option<&str>, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            StoreError::DuplicateName(name.unwrap_or_default().to_string())
        }
        sqlx::Error::Database(db_err) => StoreError::backend(
            operation,
            format!("database error: {}", db_err.message()),
        ),
        sqlx::Error::PoolClosed => StoreError::backend(operation, "connection pool closed"),
        other => StoreError::backend(operation, other.to_string()),
    }
}
