//! Orders.
//!
//! Checkout splits a cart into one order per shop. The backend owns status
//! transitions; an admin may only attach a delivery agent.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::link::{Ref, ShopRef, UserRef};
use crate::types::{Money, OrderId, OrderStatus, ProductId};

/// One product line frozen into an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    #[serde(rename = "productId", default, skip_serializing_if = "Option::is_none")]
    pub product: Option<Ref<ProductId>>,
    #[serde(default)]
    pub name: String,
    pub quantity: u32,
    #[serde(default)]
    pub price: Money,
}

/// An order placed with a single shop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: OrderId,
    #[serde(rename = "userId", default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<UserRef>,
    #[serde(rename = "shopId", default, skip_serializing_if = "Option::is_none")]
    pub shop: Option<ShopRef>,
    #[serde(rename = "deliveryAgentId", default, skip_serializing_if = "Option::is_none")]
    pub delivery_agent: Option<UserRef>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub total_amount: Money,
    pub status: OrderStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Whether an admin may attach a delivery agent right now.
    #[must_use]
    pub const fn is_assignable(&self) -> bool {
        matches!(self.status, OrderStatus::Processing) && self.delivery_agent.is_none()
    }

    /// Short human reference, e.g. `#a8b9c0d1`.
    #[must_use]
    pub fn display_ref(&self) -> String {
        format!("#{}", self.id.short())
    }

    /// Shop name for listings, falling back to a placeholder.
    #[must_use]
    pub fn shop_name(&self) -> &str {
        self.shop.as_ref().and_then(Ref::name).unwrap_or("Unknown shop")
    }

    /// Customer name for listings, falling back to a placeholder.
    #[must_use]
    pub fn customer_name(&self) -> &str {
        self.customer.as_ref().and_then(Ref::name).unwrap_or("Unknown customer")
    }

    /// Agent name, if one is attached and populated.
    #[must_use]
    pub fn agent_name(&self) -> Option<&str> {
        self.delivery_agent.as_ref().and_then(Ref::name)
    }
}
