use serde::Deserialize;

use gift_products::{ImageUrl, NewProduct, Price, ProductError, ProductId, ProductName, ProductUpdate};

// -------------------------
// Request DTOs
// -------------------------

/// Body of `POST /products`.
///
/// Every field is optional at the serde level so a missing one is reported as
/// a validation error rather than a generic body rejection.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub name: Option<String>,
    pub price: Option<i64>,
    pub image_url: Option<String>,
}

/// Body of `PUT /products`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub price: Option<i64>,
    pub image_url: Option<String>,
}

impl CreateProductRequest {
    pub fn into_new_product(self) -> Result<NewProduct, ProductError> {
        Ok(NewProduct {
            name: parse_name(self.name)?,
            price: parse_price(self.price)?,
            image_url: parse_image_url(self.image_url)?,
        })
    }
}

impl UpdateProductRequest {
    pub fn into_update(self) -> Result<ProductUpdate, ProductError> {
        let id = self.id.ok_or_else(|| missing("id"))?;
        Ok(ProductUpdate {
            id: ProductId::from_raw(id)?,
            name: parse_name(self.name)?,
            price: parse_price(self.price)?,
            image_url: parse_image_url(self.image_url)?,
        })
    }
}

/// Parse an id taken from the request path.
pub fn parse_product_id(raw: &str) -> Result<ProductId, ProductError> {
    raw.trim().parse::<ProductId>().map_err(ProductError::from)
}

fn parse_name(raw: Option<String>) -> Result<ProductName, ProductError> {
    Ok(ProductName::parse(raw.ok_or_else(|| missing("name"))?)?)
}

fn parse_price(raw: Option<i64>) -> Result<Price, ProductError> {
    Ok(Price::from_signed(raw.ok_or_else(|| missing("price"))?)?)
}

fn parse_image_url(raw: Option<String>) -> Result<ImageUrl, ProductError> {
    Ok(ImageUrl::parse(raw.ok_or_else(|| missing("imageUrl"))?)?)
}

fn missing(field: &str) -> ProductError {
    ProductError::MalformedInput(format!("{field} is required"))
}
