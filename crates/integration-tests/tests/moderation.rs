//! Admin dashboard, shop verification and user removal.
//!
//! Run with: cargo test -p bazaryo-integration-tests --test moderation

use bazaryo_client::BazaryoClient;
use bazaryo_client::services::{Moderation, ModerationError, load_dashboard};
use bazaryo_core::{OrderStatus, ShopId, UserRole};
use bazaryo_integration_tests::FakeBackend;

async fn admin_client(backend: &FakeBackend) -> BazaryoClient {
    let admin = backend.seed_user("Admin", "admin@example.com", "secret1", UserRole::Admin);
    backend.client_for(&admin).await
}

#[tokio::test]
async fn test_dashboard_counts_match_store() {
    let backend = FakeBackend::start().await;
    let client = admin_client(&backend).await;
    let keeper = backend.seed_user("Ravi", "ravi@example.com", "secret1", UserRole::Shopkeeper);
    let shop = backend.seed_shop(&keeper, "Fresh Market");
    let customer = backend.seed_user("Asha", "asha@example.com", "secret1", UserRole::Customer);
    backend.seed_order(&customer, &shop, OrderStatus::Delivered);
    backend.seed_order(&customer, &shop, OrderStatus::Delivered);
    backend.seed_order(&customer, &shop, OrderStatus::Processing);

    let view = load_dashboard(&client).await.expect("load dashboard");

    assert_eq!(view.headline.users, 3);
    assert_eq!(view.headline.shops, 1);
    assert_eq!(view.headline.orders, 3);
    assert_eq!(view.headline.revenue, "₹200.00");

    let delivered = view
        .orders_by_status
        .iter()
        .find(|point| point.key == OrderStatus::Delivered.as_str())
        .expect("delivered bar");
    assert_eq!(delivered.count, 2);

    let percents: u64 = view.users_by_role.iter().map(|point| point.percent).sum();
    assert!((99..=101).contains(&percents));
}

#[tokio::test]
async fn test_dashboard_requires_admin() {
    let backend = FakeBackend::start().await;
    let customer = backend.seed_user("Asha", "asha@example.com", "secret1", UserRole::Customer);
    let client = backend.client_for(&customer).await;

    let error = load_dashboard(&client).await.expect_err("customers have no dashboard");

    assert_eq!(error.message, "Not authorized as admin");
}

#[tokio::test]
async fn test_toggle_verification_round_trips() {
    let backend = FakeBackend::start().await;
    let client = admin_client(&backend).await;
    let keeper = backend.seed_user("Ravi", "ravi@example.com", "secret1", UserRole::Shopkeeper);
    let shop = backend.seed_shop(&keeper, "Fresh Market");
    let moderation = Moderation::new(client);
    moderation.refresh_shops().await.expect("load shops");

    let updated = moderation.toggle_verification(&shop.id).await.expect("unverify");
    assert!(!updated.is_verified);
    assert_eq!(moderation.shop_tally().unverified, 1);

    let updated = moderation.toggle_verification(&shop.id).await.expect("verify");
    assert!(updated.is_verified);
    assert_eq!(moderation.shop_tally().verified, 1);
    assert_eq!(backend.hits("shops.update"), 2);
}

#[tokio::test]
async fn test_unlisted_shop_cannot_be_toggled() {
    let backend = FakeBackend::start().await;
    let moderation = Moderation::new(admin_client(&backend).await);
    moderation.refresh_shops().await.expect("load shops");

    let result = moderation
        .toggle_verification(&ShopId::new("000000000000000000000000"))
        .await;

    assert!(matches!(result, Err(ModerationError::UnknownShop(_))));
    assert_eq!(backend.hits("shops.update"), 0);
}

#[tokio::test]
async fn test_delete_user_refreshes_list() {
    let backend = FakeBackend::start().await;
    let moderation = Moderation::new(admin_client(&backend).await);
    let customer = backend.seed_user("Asha", "asha@example.com", "secret1", UserRole::Customer);
    assert_eq!(moderation.refresh_users().await.expect("load users").len(), 2);

    moderation.delete_user(&customer.id).await.expect("delete user");

    let remaining: Vec<UserRole> = moderation.users().into_iter().map(|user| user.role).collect();
    assert_eq!(remaining, vec![UserRole::Admin]);
}
