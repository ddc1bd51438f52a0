//! Cart aggregation by shop.
//!
//! The backend stores one flat cart per customer, but checkout places one
//! order per shop. [`aggregate`] groups the flat line items into
//! [`ShopGroup`]s so the cart page and checkout agree on what will be
//! ordered.

use serde::Serialize;

use crate::models::CartLineItem;
use crate::types::{Money, ShopId};

/// The cart lines belonging to one shop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopGroup {
    pub shop_id: ShopId,
    pub shop_name: String,
    /// Lines in cart order.
    pub items: Vec<CartLineItem>,
    /// Sum of `quantity × price` over `items`.
    pub subtotal: Money,
}

/// Result of [`aggregate`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSummary {
    /// Groups ordered by the first appearance of their shop in the cart.
    pub groups: Vec<ShopGroup>,
    /// Sum of every group subtotal.
    pub grand_total: Money,
    /// Lines left out because their shop id or name could not be resolved.
    pub dropped: Vec<CartLineItem>,
}

impl CartSummary {
    /// Whether there is nothing that checkout could order.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// The group for `shop_id`, if present.
    #[must_use]
    pub fn group(&self, shop_id: &ShopId) -> Option<&ShopGroup> {
        self.groups.iter().find(|group| &group.shop_id == shop_id)
    }

    /// Total units across all included lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.groups
            .iter()
            .flat_map(|group| &group.items)
            .map(|item| u64::from(item.quantity))
            .sum()
    }
}

/// Group cart lines by shop.
///
/// Lines whose product is gone, or whose shop lacks an id or a non-empty
/// name, are excluded from every group and from the grand total and are
/// returned in [`CartSummary::dropped`] instead.
#[must_use]
pub fn aggregate(items: &[CartLineItem]) -> CartSummary {
    let mut summary = CartSummary::default();

    for item in items {
        let Some((shop_id, shop_name)) = item.shop() else {
            summary.dropped.push(item.clone());
            continue;
        };

        let line_total = item.line_total();
        if let Some(group) = summary
            .groups
            .iter_mut()
            .find(|group| &group.shop_id == shop_id)
        {
            group.items.push(item.clone());
            group.subtotal += line_total;
        } else {
            summary.groups.push(ShopGroup {
                shop_id: shop_id.clone(),
                shop_name: shop_name.to_owned(),
                items: vec![item.clone()],
                subtotal: line_total,
            });
        }
        summary.grand_total += line_total;
    }

    summary
}
