use serde::{Deserialize, Serialize};
use url::Url;

use gift_core::{DomainError, Entity, RecordId, ValueObject};

/// Column width of `products.name`.
pub const MAX_NAME_LEN: usize = 255;

/// Column width of `products.image_url` (the de-facto browser URL limit).
pub const MAX_IMAGE_URL_LEN: usize = 2083;

/// Product identifier, assigned by the store on insert.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub RecordId);

impl ProductId {
    pub fn new(id: RecordId) -> Self {
        Self(id)
    }

    /// Build from a raw store value.
    pub fn from_raw(value: i64) -> Result<Self, DomainError> {
        RecordId::new(value).map(Self)
    }

    pub fn get(&self) -> i64 {
        self.0.get()
    }
}

impl core::fmt::Display for ProductId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl core::str::FromStr for ProductId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<RecordId>().map(Self)
    }
}

/// Display name of a product. Never blank, at most [`MAX_NAME_LEN`] characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProductName(String);

impl ProductName {
    pub fn parse(raw: impl Into<String>) -> Result<Self, DomainError> {
        let raw = raw.into();
        let name = raw.trim();
        if name.is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(DomainError::validation(format!(
                "name must be at most {MAX_NAME_LEN} characters"
            )));
        }
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.0.contains(needle)
    }
}

impl ValueObject for ProductName {}

impl core::fmt::Display for ProductName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Largest price any store can hold (`BIGINT` upper bound).
pub const MAX_PRICE: u64 = i64::MAX as u64;

/// Price in the smallest currency unit, within `0..=MAX_PRICE`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price(u64);

impl Price {
    pub fn new(amount: u64) -> Result<Self, DomainError> {
        if amount > MAX_PRICE {
            return Err(DomainError::validation(format!(
                "price must be at most {MAX_PRICE}, got {amount}"
            )));
        }
        Ok(Self(amount))
    }

    /// Build from a signed amount as it arrives from JSON or SQL.
    pub fn from_signed(amount: i64) -> Result<Self, DomainError> {
        u64::try_from(amount)
            .map(Self)
            .map_err(|_| DomainError::validation(format!("price must be non-negative, got {amount}")))
    }

    pub fn amount(&self) -> u64 {
        self.0
    }

    /// Amount as stored in a `BIGINT` column.
    pub fn to_signed(&self) -> i64 {
        // Bounded by MAX_PRICE on construction.
        self.0 as i64
    }
}

impl ValueObject for Price {}

/// Absolute `http`/`https` URL of the product image.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageUrl(String);

impl ImageUrl {
    pub fn parse(raw: impl Into<String>) -> Result<Self, DomainError> {
        let raw = raw.into();
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(DomainError::validation("image url cannot be empty"));
        }
        if raw.chars().count() > MAX_IMAGE_URL_LEN {
            return Err(DomainError::validation(format!(
                "image url must be at most {MAX_IMAGE_URL_LEN} characters"
            )));
        }

        let parsed = Url::parse(raw)
            .map_err(|e| DomainError::validation(format!("malformed image url: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(DomainError::validation(format!(
                "image url scheme must be http or https, got {}",
                parsed.scheme()
            )));
        }
        if parsed.host_str().is_none_or(str::is_empty) {
            return Err(DomainError::validation("image url must have a host"));
        }

        // Keep the caller's spelling; `Url` would normalise it.
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ValueObject for ImageUrl {}

/// A product that has not been persisted yet (no identifier).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: ProductName,
    pub price: Price,
    pub image_url: ImageUrl,
}

/// Replacement values for an existing product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductUpdate {
    pub id: ProductId,
    pub name: ProductName,
    pub price: Price,
    pub image_url: ImageUrl,
}

/// Entity: Product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    id: ProductId,
    name: ProductName,
    price: Price,
    image_url: ImageUrl,
}

impl Product {
    /// Attach a store-assigned identifier to a new product.
    pub fn from_new(id: ProductId, new: NewProduct) -> Self {
        Self {
            id,
            name: new.name,
            price: new.price,
            image_url: new.image_url,
        }
    }

    /// Rehydrate a persisted product from raw column values.
    pub fn from_parts(
        id: i64,
        name: String,
        price: i64,
        image_url: String,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            id: ProductId::from_raw(id)?,
            name: ProductName::parse(name)?,
            price: Price::from_signed(price)?,
            image_url: ImageUrl::parse(image_url)?,
        })
    }

    pub fn name(&self) -> &ProductName {
        &self.name
    }

    pub fn price(&self) -> Price {
        self.price
    }

    pub fn image_url(&self) -> &ImageUrl {
        &self.image_url
    }

    /// Replace name, price and image URL in one step. The identifier never changes.
    pub fn update(&mut self, name: ProductName, price: Price, image_url: ImageUrl) {
        self.name = name;
        self.price = price;
        self.image_url = image_url;
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> Self::Id {
        self.id
    }
}
