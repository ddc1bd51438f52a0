//! Catalog products.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::link::ShopRef;
use crate::types::{Money, ProductId, ShopId};

/// A product listed by a shop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: Money,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub quantity_available: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(rename = "shopId", default, skip_serializing_if = "Option::is_none")]
    pub shop: Option<ShopRef>,
}

impl Product {
    /// Whether at least one unit can be added to a cart.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.quantity_available > 0
    }

    /// New stock level after adding `add` units.
    ///
    /// # Errors
    ///
    /// Returns [`StockError::InvalidQuantity`] unless `add` is positive, and
    /// [`StockError::Overflow`] if the new level does not fit.
    pub fn restock_quantity(&self, add: i64) -> Result<u32, StockError> {
        if add <= 0 {
            return Err(StockError::InvalidQuantity);
        }
        u32::try_from(add)
            .ok()
            .and_then(|add| self.quantity_available.checked_add(add))
            .ok_or(StockError::Overflow)
    }
}

/// Errors from stock adjustments.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StockError {
    #[error("Enter a valid quantity to add")]
    InvalidQuantity,
    #[error("Stock level is too large")]
    Overflow,
}

/// A new product, as submitted by a shopkeeper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub price: Money,
    pub category: String,
    pub quantity_available: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// A partial product update. Only `Some` fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity_available: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl ProductPatch {
    /// A patch that only sets the stock level.
    #[must_use]
    pub fn stock(quantity_available: u32) -> Self {
        Self {
            quantity_available: Some(quantity_available),
            ..Self::default()
        }
    }
}

/// Filters for the product listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(rename = "shopId", skip_serializing_if = "Option::is_none")]
    pub shop: Option<ShopId>,
}

impl ProductQuery {
    /// Every product of one shop.
    #[must_use]
    pub fn for_shop(shop: ShopId) -> Self {
        Self {
            shop: Some(shop),
            ..Self::default()
        }
    }
}
