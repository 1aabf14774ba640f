//! Infrastructure layer: product store implementations and database wiring.

pub mod config;
pub mod store;

pub use config::DatabaseConfig;
pub use store::{
    connect, InMemoryProductStore, PostgresProductStore, SqliteProductStore,
};
