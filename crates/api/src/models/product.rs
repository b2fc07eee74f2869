//! Product domain types.

use serde::{Deserialize, Serialize};

use storekeep_core::{Price, ProductId, StoreId};

use super::StoreWithOwner;

/// A product listed by a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Exact decimal price, serialized as a string.
    pub price: Price,
    /// Store that lists this product.
    pub store_id: StoreId,
}

/// A product with its store, and the store's owner, expanded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub store: StoreWithOwner,
}

/// Fields for inserting a product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub price: Price,
    pub store_id: StoreId,
}

/// Partial update of a product. `None` leaves the column unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub price: Option<Price>,
    pub store_id: Option<StoreId>,
}

impl ProductPatch {
    /// Apply the set fields to a product in place.
    pub fn apply(self, product: &mut Product) {
        if let Some(name) = self.name {
            product.name = name;
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(store_id) = self.store_id {
            product.store_id = store_id;
        }
    }
}
