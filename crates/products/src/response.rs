use serde::{Deserialize, Serialize};

use gift_core::Entity;

use crate::product::Product;

/// Flat projection of a product returned by every service read or write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: i64,
    pub name: String,
    pub price: u64,
    pub image_url: String,
}

impl From<&Product> for ProductResponse {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id().get(),
            name: product.name().as_str().to_string(),
            price: product.price().amount(),
            image_url: product.image_url().as_str().to_string(),
        }
    }
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self::from(&product)
    }
}
