//! Catalogue browsing and shopkeeper inventory commands.

use bazaryo_client::BazaryoClient;
use bazaryo_client::api::ProductApi;
use bazaryo_client::services::{ActionFailed, Inventory};
use bazaryo_core::{Money, Product, ProductDraft, ProductId, ProductQuery, ShopId};
use clap::Args;

use super::CommandError;
use crate::context::Context;
use crate::output::table;

const FETCH_PRODUCTS_FAILED: &str = "Failed to fetch products.";

#[derive(Args)]
pub struct ListArgs {
    /// Free-text search
    #[arg(short, long)]
    search: Option<String>,

    #[arg(short, long)]
    category: Option<String>,

    /// Only products of this shop
    #[arg(long)]
    shop: Option<String>,
}

impl From<ListArgs> for ProductQuery {
    fn from(args: ListArgs) -> Self {
        Self {
            search: args.search,
            category: args.category,
            shop: args.shop.map(ShopId::new),
        }
    }
}

#[derive(Args)]
pub struct CreateArgs {
    #[arg(short, long)]
    name: String,

    #[arg(short, long, default_value = "")]
    description: String,

    /// Price in rupees, e.g. `49.50`
    #[arg(short, long)]
    price: Money,

    #[arg(short, long)]
    category: String,

    /// Opening stock
    #[arg(short, long, default_value_t = 0)]
    quantity: u32,

    #[arg(long)]
    image_url: Option<String>,
}

impl From<CreateArgs> for ProductDraft {
    fn from(args: CreateArgs) -> Self {
        Self {
            name: args.name,
            description: args.description,
            price: args.price,
            category: args.category,
            quantity_available: args.quantity,
            image_url: args.image_url,
        }
    }
}

fn render(products: &[Product]) -> Vec<String> {
    if products.is_empty() {
        return vec!["No products found.".to_owned()];
    }
    let rows = products
        .iter()
        .map(|product| {
            vec![
                product.id.to_string(),
                product.name.clone(),
                product.category.clone(),
                product.price.to_string(),
                if product.in_stock() {
                    product.quantity_available.to_string()
                } else {
                    "out of stock".to_owned()
                },
            ]
        })
        .collect();
    table(&["PRODUCT", "NAME", "CATEGORY", "PRICE", "STOCK"], rows)
}

async fn inventory(ctx: &Context) -> Result<Inventory<BazaryoClient>, CommandError> {
    let user = ctx.current_user().await?;
    Ok(Inventory::new(ctx.client.clone(), &user))
}

pub async fn list(ctx: &Context, args: ListArgs) -> Result<(), CommandError> {
    let products = ctx
        .client
        .list_products(&args.into())
        .await
        .map_err(|e| ActionFailed::new(e, FETCH_PRODUCTS_FAILED))?;
    ctx.out.emit(&products, || render(&products))
}

pub async fn mine(ctx: &Context) -> Result<(), CommandError> {
    let products = inventory(ctx).await?.load().await?;
    ctx.out.emit(&products, || render(&products))
}

pub async fn create(ctx: &Context, args: CreateArgs) -> Result<(), CommandError> {
    let inventory = inventory(ctx).await?;
    let product = inventory.create(&args.into()).await?;
    ctx.out.notice("Product created successfully.")?;
    ctx.out.emit(&product, || render(std::slice::from_ref(&product)))
}

pub async fn add_stock(ctx: &Context, product: &str, amount: i64) -> Result<(), CommandError> {
    let inventory = inventory(ctx).await?;
    inventory.load().await?;
    let product = inventory.add_stock(&ProductId::new(product), amount).await?;
    ctx.out.notice("Stock updated")?;
    ctx.out.emit(&product, || render(std::slice::from_ref(&product)))
}

pub async fn delete(ctx: &Context, product: &str) -> Result<(), CommandError> {
    inventory(ctx)
        .await?
        .delete(&ProductId::new(product))
        .await?;
    ctx.out.notice("Product deleted successfully.")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_args_become_query() {
        let query: ProductQuery = ListArgs {
            search: None,
            category: Some("Fruit".to_string()),
            shop: Some("A".to_string()),
        }
        .into();
        assert_eq!(query.shop, Some(ShopId::new("A")));
        assert_eq!(query.category.as_deref(), Some("Fruit"));
    }

    #[test]
    fn test_create_args_become_draft() {
        let draft: ProductDraft = CreateArgs {
            name: "Alphonso".to_string(),
            description: String::new(),
            price: Money::from_paise(4950),
            category: "Fruit".to_string(),
            quantity: 12,
            image_url: None,
        }
        .into();
        assert_eq!(draft.quantity_available, 12);
        assert_eq!(draft.price, Money::from_paise(4950));
    }
}
