//! Cart line items as returned by the cart endpoints.

use serde::{Deserialize, Serialize};

use super::link::ShopRef;
use crate::types::{Money, ProductId, ShopId};

/// The denormalized product snapshot embedded in a cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartProduct {
    #[serde(rename = "_id")]
    pub id: ProductId,
    #[serde(default)]
    pub name: String,
    /// Missing prices count as zero.
    #[serde(default)]
    pub price: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(rename = "shopId", default, skip_serializing_if = "Option::is_none")]
    pub shop: Option<ShopRef>,
}

/// One product and quantity in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineItem {
    /// `None` when the product was deleted after being added.
    #[serde(rename = "productId", default)]
    pub product: Option<CartProduct>,
    pub quantity: u32,
}

impl CartLineItem {
    /// The product id, if the product still exists.
    #[must_use]
    pub fn product_id(&self) -> Option<&ProductId> {
        self.product.as_ref().map(|product| &product.id)
    }

    /// Shop id and name when both are known.
    #[must_use]
    pub fn shop(&self) -> Option<(&ShopId, &str)> {
        self.product.as_ref()?.shop.as_ref()?.resolved()
    }

    /// Unit price, zero when unknown.
    #[must_use]
    pub fn unit_price(&self) -> Money {
        self.product
            .as_ref()
            .map_or(Money::ZERO, |product| product.price)
    }

    /// `quantity × price`.
    #[must_use]
    pub fn line_total(&self) -> Money {
        self.unit_price().times(self.quantity)
    }
}

/// The signed-in customer's cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    #[serde(default)]
    pub items: Vec<CartLineItem>,
}
