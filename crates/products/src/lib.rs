//! Products domain module.
//!
//! This crate contains the catalog rules for products: the entity and its value
//! objects, the naming policy, the storage interface the service depends on, and
//! the service itself. Concrete stores live in `gift-infra`.

pub mod error;
pub mod policy;
pub mod product;
pub mod response;
pub mod service;
pub mod store;

pub use error::{ProductError, ProductResult};
pub use policy::{CatalogPolicy, DEFAULT_RESERVED_KEYWORD};
pub use product::{
    ImageUrl, NewProduct, Price, Product, ProductId, ProductName, ProductUpdate,
    MAX_IMAGE_URL_LEN, MAX_NAME_LEN, MAX_PRICE,
};
pub use response::ProductResponse;
pub use service::ProductService;
pub use store::{ProductStore, ProductTransaction, StoreError, StoreResult};
