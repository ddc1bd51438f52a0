//! Catalog caching and shopkeeper inventory.
//!
//! Run with: cargo test -p bazaryo-integration-tests --test catalog

use bazaryo_client::api::{ProductApi, ShopApi};
use bazaryo_client::services::{Inventory, InventoryError};
use bazaryo_core::{Money, ProductDraft, ProductQuery, StockError, UserRole};
use bazaryo_integration_tests::FakeBackend;

fn draft(name: &str, stock: u32) -> ProductDraft {
    ProductDraft {
        name: name.to_string(),
        description: "Fresh from the farm".to_string(),
        price: Money::from_paise(4950),
        category: "Fruit".to_string(),
        quantity_available: stock,
        image_url: None,
    }
}

#[tokio::test]
async fn test_shop_listing_is_cached() {
    let backend = FakeBackend::start().await;
    let keeper = backend.seed_user("Ravi", "ravi@example.com", "secret1", UserRole::Shopkeeper);
    backend.seed_shop(&keeper, "Fresh Market");
    let client = backend.client();

    let first = client.list_shops().await.expect("list shops");
    let second = client.list_shops().await.expect("list shops again");

    assert_eq!(first, second);
    assert_eq!(backend.hits("shops.list"), 1);
}

#[tokio::test]
async fn test_search_results_are_not_cached() {
    let backend = FakeBackend::start().await;
    let keeper = backend.seed_user("Ravi", "ravi@example.com", "secret1", UserRole::Shopkeeper);
    let shop = backend.seed_shop(&keeper, "Fresh Market");
    backend.seed_product(&shop, "Alphonso Mango", Money::from_rupees(50), 10);
    backend.seed_product(&shop, "Basmati Rice", Money::from_rupees(120), 5);
    let client = backend.client();

    let query = ProductQuery {
        search: Some("mango".to_string()),
        ..ProductQuery::default()
    };
    let found = client.list_products(&query).await.expect("search");
    client.list_products(&query).await.expect("search again");

    assert_eq!(found.len(), 1);
    assert_eq!(backend.hits("products.list"), 2);

    let all = client.list_products(&ProductQuery::default()).await.expect("list");
    client.list_products(&ProductQuery::default()).await.expect("list again");
    assert_eq!(all.len(), 2);
    assert_eq!(backend.hits("products.list"), 3);
}

#[tokio::test]
async fn test_inventory_create_invalidates_catalog() {
    let backend = FakeBackend::start().await;
    let keeper = backend.seed_user("Ravi", "ravi@example.com", "secret1", UserRole::Shopkeeper);
    let shop = backend.seed_shop(&keeper, "Fresh Market");
    let keeper = backend.store().users.iter().find(|u| u.id == keeper.id).cloned().expect("keeper");
    let client = backend.client_for(&keeper).await;
    let inventory = Inventory::new(client.clone(), &keeper);

    assert!(inventory.load().await.expect("load").is_empty());
    client
        .list_products(&ProductQuery::for_shop(shop.id.clone()))
        .await
        .expect("warm cache");

    let product = inventory.create(&draft("Alphonso Mango", 12)).await.expect("create");

    assert_eq!(inventory.products(), vec![product.clone()]);
    let listed = client
        .list_products(&ProductQuery::for_shop(shop.id))
        .await
        .expect("list after create");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed.first().map(|p| &p.id), Some(&product.id));
}

#[tokio::test]
async fn test_add_stock_raises_quantity() {
    let backend = FakeBackend::start().await;
    let keeper = backend.seed_user("Ravi", "ravi@example.com", "secret1", UserRole::Shopkeeper);
    let shop = backend.seed_shop(&keeper, "Fresh Market");
    let mango = backend.seed_product(&shop, "Alphonso Mango", Money::from_rupees(50), 10);
    let keeper = backend.store().users.iter().find(|u| u.id == keeper.id).cloned().expect("keeper");
    let inventory = Inventory::new(backend.client_for(&keeper).await, &keeper);
    inventory.load().await.expect("load");

    let updated = inventory.add_stock(&mango.id, 5).await.expect("add stock");
    assert_eq!(updated.quantity_available, 15);

    let refused = inventory.add_stock(&mango.id, 0).await;
    assert!(matches!(refused, Err(InventoryError::Stock(StockError::InvalidQuantity))));
    assert_eq!(backend.hits("products.update"), 1);
}

#[tokio::test]
async fn test_delete_removes_product_from_inventory() {
    let backend = FakeBackend::start().await;
    let keeper = backend.seed_user("Ravi", "ravi@example.com", "secret1", UserRole::Shopkeeper);
    let shop = backend.seed_shop(&keeper, "Fresh Market");
    let mango = backend.seed_product(&shop, "Alphonso Mango", Money::from_rupees(50), 10);
    backend.seed_product(&shop, "Basmati Rice", Money::from_rupees(120), 5);
    let keeper = backend.store().users.iter().find(|u| u.id == keeper.id).cloned().expect("keeper");
    let inventory = Inventory::new(backend.client_for(&keeper).await, &keeper);
    inventory.load().await.expect("load");

    inventory.delete(&mango.id).await.expect("delete");

    let names: Vec<String> = inventory.products().into_iter().map(|p| p.name).collect();
    assert_eq!(names, vec!["Basmati Rice".to_string()]);
}

#[tokio::test]
async fn test_unlinked_shopkeeper_makes_no_request() {
    let backend = FakeBackend::start().await;
    let keeper = backend.seed_user("Ravi", "ravi@example.com", "secret1", UserRole::Shopkeeper);
    let inventory = Inventory::new(backend.client_for(&keeper).await, &keeper);

    let result = inventory.load().await;

    assert!(matches!(result, Err(InventoryError::NoLinkedShop)));
    assert_eq!(backend.hits("shops.get"), 0);
}
