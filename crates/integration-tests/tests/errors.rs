//! How backend failures surface through the client.
//!
//! Run with: cargo test -p bazaryo-integration-tests --test errors

use bazaryo_client::ApiError;
use bazaryo_client::api::{CartApi, OrderApi, ShopApi, UserApi};
use bazaryo_core::{ShopId, UserRole};
use bazaryo_integration_tests::{FakeBackend, Failure};

#[tokio::test]
async fn test_protected_call_without_token_stays_local() {
    let backend = FakeBackend::start().await;

    let result = backend.client().get_cart().await;

    assert!(matches!(result, Err(ApiError::NoToken)));
    assert_eq!(backend.hits("cart.get"), 0);
}

#[tokio::test]
async fn test_rejected_token_is_unauthorized() {
    let backend = FakeBackend::start().await;
    let client = backend.client();
    client.set_token("token-stale".to_string().into()).await;

    let error = client.current_user().await.expect_err("token is unknown");

    assert!(error.is_auth());
    assert_eq!(error.server_message(), Some("Not authorized, token failed"));
}

#[tokio::test]
async fn test_missing_shop_is_not_found() {
    let backend = FakeBackend::start().await;

    let error = backend
        .client()
        .get_shop(&ShopId::new("000000000000000000000000"))
        .await
        .expect_err("shop does not exist");

    assert!(matches!(error, ApiError::NotFound(Some(ref message)) if message == "Shop not found"));
}

#[tokio::test]
async fn test_wrong_role_is_rejected_with_message() {
    let backend = FakeBackend::start().await;
    let customer = backend.seed_user("Asha", "asha@example.com", "secret1", UserRole::Customer);
    let client = backend.client_for(&customer).await;

    let error = client.all_orders().await.expect_err("customers cannot list all orders");

    assert!(matches!(error, ApiError::Rejected { status: 403, .. }));
    assert_eq!(error.user_message("fallback"), "Not authorized as admin");
}

#[tokio::test]
async fn test_rate_limit_reads_retry_after() {
    let backend = FakeBackend::start().await;
    backend.fail("shops.list", Failure::rate_limited(7));

    let error = backend.client().list_shops().await.expect_err("rate limited");

    assert!(matches!(error, ApiError::RateLimited(7)));
}

#[tokio::test]
async fn test_error_without_message_uses_fallback() {
    let backend = FakeBackend::start().await;
    let customer = backend.seed_user("Asha", "asha@example.com", "secret1", UserRole::Customer);
    let client = backend.client_for(&customer).await;
    backend.fail("orders.mine", Failure::new(502, None));

    let error = client.my_orders().await.expect_err("gateway error");

    assert!(matches!(error, ApiError::Rejected { status: 502, message: None }));
    assert_eq!(error.user_message("Failed to fetch orders."), "Failed to fetch orders.");
}
