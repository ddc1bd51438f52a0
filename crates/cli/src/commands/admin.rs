//! Admin dashboard and moderation commands.

use bazaryo_client::services::{Moderation, load_dashboard};
use bazaryo_core::dashboard::{DashboardView, ShopTally};
use bazaryo_core::{Shop, ShopId, User, UserId};

use super::CommandError;
use crate::context::Context;
use crate::output::table;

const BAR_WIDTH: u64 = 30;

fn bar(count: u64, max: u64) -> String {
    if max == 0 {
        return String::new();
    }
    let width = count.saturating_mul(BAR_WIDTH) / max;
    "#".repeat(usize::try_from(width).unwrap_or(0))
}

fn render_dashboard(view: &DashboardView) -> Vec<String> {
    let headline = &view.headline;
    let mut lines = vec![
        format!("Users:   {}", headline.users),
        format!("Shops:   {}", headline.shops),
        format!("Orders:  {}", headline.orders),
        format!("Revenue: {}", headline.revenue),
        String::new(),
        "Orders by status".to_owned(),
    ];

    let max = view
        .orders_by_status
        .iter()
        .map(|point| point.count)
        .max()
        .unwrap_or(0);
    lines.extend(table(
        &["STATUS", "COUNT", ""],
        view.orders_by_status
            .iter()
            .map(|point| vec![point.label.clone(), point.count.to_string(), bar(point.count, max)])
            .collect(),
    ));

    lines.push(String::new());
    lines.push("Users by role".to_owned());
    lines.extend(table(
        &["ROLE", "COUNT", "SHARE"],
        view.users_by_role
            .iter()
            .map(|point| {
                vec![
                    point.label.clone(),
                    point.count.to_string(),
                    format!("{}%", point.percent),
                ]
            })
            .collect(),
    ));
    lines
}

fn render_shops(shops: &[Shop], tally: ShopTally) -> Vec<String> {
    let rows = shops
        .iter()
        .map(|shop| {
            vec![
                shop.id.to_string(),
                shop.name.clone(),
                shop.category.clone(),
                shop.pincode.clone(),
                if shop.is_verified { "verified" } else { "pending" }.to_owned(),
            ]
        })
        .collect();
    let mut lines = table(&["SHOP", "NAME", "CATEGORY", "PINCODE", "STATUS"], rows);
    lines.push(format!(
        "{} shops, {} verified, {} pending",
        tally.total, tally.verified, tally.unverified
    ));
    lines
}

fn render_users(users: &[User]) -> Vec<String> {
    let rows = users
        .iter()
        .map(|user| {
            vec![
                user.id.to_string(),
                user.name.clone(),
                user.email.to_string(),
                user.role.label(),
            ]
        })
        .collect();
    table(&["USER", "NAME", "EMAIL", "ROLE"], rows)
}

pub async fn stats(ctx: &Context) -> Result<(), CommandError> {
    let view = load_dashboard(&ctx.client).await?;
    ctx.out.emit(&view, || render_dashboard(&view))
}

pub async fn shops(ctx: &Context) -> Result<(), CommandError> {
    let moderation = Moderation::new(ctx.client.clone());
    let shops = moderation.refresh_shops().await?;
    let tally = moderation.shop_tally();
    ctx.out.emit(&shops, || render_shops(&shops, tally))
}

pub async fn verify(ctx: &Context, shop: &str) -> Result<(), CommandError> {
    let moderation = Moderation::new(ctx.client.clone());
    moderation.refresh_shops().await?;
    let shop = moderation.toggle_verification(&ShopId::new(shop)).await?;
    ctx.out.notice("Shop verification status updated.")?;
    let tally = moderation.shop_tally();
    ctx.out.emit(&shop, || render_shops(std::slice::from_ref(&shop), tally))
}

pub async fn users(ctx: &Context) -> Result<(), CommandError> {
    let users = Moderation::new(ctx.client.clone()).refresh_users().await?;
    ctx.out.emit(&users, || render_users(&users))
}

pub async fn delete_user(ctx: &Context, user: &str) -> Result<(), CommandError> {
    Moderation::new(ctx.client.clone())
        .delete_user(&UserId::new(user))
        .await?;
    ctx.out.notice("User deleted successfully.")
}
