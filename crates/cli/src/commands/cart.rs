//! Cart and checkout commands.

use std::num::NonZeroU32;

use bazaryo_client::BazaryoClient;
use bazaryo_client::services::{ActionFailed, CartStore, CheckoutOrchestrator};
use bazaryo_core::{CartSummary, ProductId};

use super::CommandError;
use crate::context::Context;
use crate::output::table;

const LOAD_CART_FAILED: &str = "Failed to load cart.";
const UPDATE_CART_FAILED: &str = "Failed to update cart.";

fn render(summary: &CartSummary) -> Vec<String> {
    if summary.is_empty() {
        return vec!["Your cart is empty.".to_owned()];
    }

    let mut lines = Vec::new();
    for group in &summary.groups {
        lines.push(format!("{} ({})", group.shop_name, group.shop_id));
        let rows = group
            .items
            .iter()
            .map(|item| {
                vec![
                    item.product_id().map(ToString::to_string).unwrap_or_default(),
                    item.product
                        .as_ref()
                        .map(|product| product.name.clone())
                        .unwrap_or_default(),
                    item.quantity.to_string(),
                    item.unit_price().to_string(),
                    item.line_total().to_string(),
                ]
            })
            .collect();
        lines.extend(
            table(&["PRODUCT", "NAME", "QTY", "PRICE", "TOTAL"], rows)
                .into_iter()
                .map(|line| format!("  {line}")),
        );
        lines.push(format!("  Subtotal: {}", group.subtotal));
        lines.push(String::new());
    }
    if !summary.dropped.is_empty() {
        lines.push(format!(
            "{} item(s) with unknown shop left out",
            summary.dropped.len()
        ));
    }
    lines.push(format!(
        "{} unit(s) from {} shop(s), grand total {}",
        summary.item_count(),
        summary.groups.len(),
        summary.grand_total
    ));
    lines
}

async fn loaded(ctx: &Context) -> Result<CartStore<BazaryoClient>, CommandError> {
    let cart = CartStore::new(ctx.client.clone());
    cart.refresh()
        .await
        .map_err(|e| ActionFailed::new(e, LOAD_CART_FAILED))?;
    Ok(cart)
}

pub async fn show(ctx: &Context) -> Result<(), CommandError> {
    let summary = loaded(ctx).await?.summary();
    ctx.out.emit(&summary, || render(&summary))
}

pub async fn add(ctx: &Context, product: &str, quantity: u32) -> Result<(), CommandError> {
    let quantity = NonZeroU32::new(quantity)
        .ok_or_else(|| CommandError::Invalid("Quantity must be at least 1".to_owned()))?;

    let summary = CartStore::new(ctx.client.clone())
        .add(&ProductId::new(product), quantity)
        .await
        .map_err(|e| ActionFailed::new(e, UPDATE_CART_FAILED))?;
    ctx.out.emit(&summary, || render(&summary))
}

pub async fn set(ctx: &Context, product: &str, quantity: u32) -> Result<(), CommandError> {
    let summary = CartStore::new(ctx.client.clone())
        .set_quantity(&ProductId::new(product), quantity)
        .await
        .map_err(|e| ActionFailed::new(e, UPDATE_CART_FAILED))?;
    ctx.out.emit(&summary, || render(&summary))
}

pub async fn remove(ctx: &Context, product: &str) -> Result<(), CommandError> {
    let summary = CartStore::new(ctx.client.clone())
        .remove(&ProductId::new(product))
        .await
        .map_err(|e| ActionFailed::new(e, UPDATE_CART_FAILED))?;
    ctx.out.emit(&summary, || render(&summary))
}

pub async fn checkout(ctx: &Context) -> Result<(), CommandError> {
    let cart = loaded(ctx).await?;
    let outcome = CheckoutOrchestrator::new(ctx.client.clone(), cart)
        .checkout()
        .await?;

    ctx.out.emit(&outcome.orders, || {
        let mut lines = vec!["All orders placed successfully!".to_owned()];
        lines.extend(outcome.orders.iter().map(|order| {
            format!(
                "  {}  {}  {}",
                order.display_ref(),
                order.shop_name(),
                order.total_amount
            )
        }));
        lines.push(format!("Next: {}", outcome.route));
        lines
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use bazaryo_core::{CartLineItem, CartProduct, Money, Ref, RefSummary, ShopId, aggregate};

    use super::*;

    fn line(product: &str, shop: Option<(&str, &str)>, rupees: i64, quantity: u32) -> CartLineItem {
        CartLineItem {
            product: Some(CartProduct {
                id: ProductId::new(product),
                name: product.to_string(),
                price: Money::from_rupees(rupees),
                image_url: None,
                shop: shop.map(|(id, name)| {
                    Ref::Populated(RefSummary {
                        id: Some(ShopId::new(id)),
                        name: Some(name.to_string()),
                    })
                }),
            }),
            quantity,
        }
    }

    #[test]
    fn test_render_groups_and_totals() {
        let summary = aggregate(&[
            line("X", Some(("A", "Fresh Market")), 50, 2),
            line("Z", Some(("B", "Spice Hub")), 10, 3),
            line("Q", None, 99, 1),
        ]);

        let lines = render(&summary);

        assert_eq!(lines.first().unwrap(), "Fresh Market (A)");
        assert!(lines.contains(&"  Subtotal: ₹100.00".to_string()));
        assert!(lines.contains(&"1 item(s) with unknown shop left out".to_string()));
        assert_eq!(
            lines.last().unwrap(),
            "5 unit(s) from 2 shop(s), grand total ₹130.00"
        );
    }

    #[test]
    fn test_render_empty_cart() {
        assert_eq!(render(&CartSummary::default()), vec!["Your cart is empty."]);
    }
}
