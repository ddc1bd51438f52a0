//! Typed wrappers over the backend endpoints.
//!
//! Each trait groups the endpoints one screen family needs. Workflows in
//! [`crate::services`] are generic over these traits, so they run against
//! [`BazaryoClient`](crate::BazaryoClient) in production and against
//! in-memory fakes in tests.

mod admin;
mod auth;
mod cart;
mod orders;
mod products;
mod shops;
mod users;

use std::future::Future;

use bazaryo_core::forms::{LoginRequest, ProfileUpdate, RegistrationRequest};
use bazaryo_core::{
    Cart, DashboardStats, Order, OrderId, Product, ProductDraft, ProductId, ProductPatch,
    ProductQuery, Shop, ShopId, ShopPatch, User, UserFilter, UserId,
};

use crate::error::ApiError;

/// `/auth/*`. A successful login or registration stores the returned token
/// in the client.
pub trait AuthApi: Send + Sync {
    fn login(&self, request: &LoginRequest)
    -> impl Future<Output = Result<User, ApiError>> + Send;

    fn register(
        &self,
        request: &RegistrationRequest,
    ) -> impl Future<Output = Result<User, ApiError>> + Send;

    /// Forget the stored token. Never touches the network.
    fn logout(&self) -> impl Future<Output = ()> + Send;
}

/// `/users/*`.
pub trait UserApi: Send + Sync {
    fn current_user(&self) -> impl Future<Output = Result<User, ApiError>> + Send;

    fn update_profile(
        &self,
        update: &ProfileUpdate,
    ) -> impl Future<Output = Result<User, ApiError>> + Send;

    fn list_users(
        &self,
        filter: &UserFilter,
    ) -> impl Future<Output = Result<Vec<User>, ApiError>> + Send;

    fn delete_user(&self, id: &UserId) -> impl Future<Output = Result<(), ApiError>> + Send;
}

/// `/shops/*`. Reads are cached; updates invalidate the catalog cache.
pub trait ShopApi: Send + Sync {
    fn list_shops(&self) -> impl Future<Output = Result<Vec<Shop>, ApiError>> + Send;

    /// A shop with its products populated.
    fn get_shop(&self, id: &ShopId) -> impl Future<Output = Result<Shop, ApiError>> + Send;

    fn update_shop(
        &self,
        id: &ShopId,
        patch: &ShopPatch,
    ) -> impl Future<Output = Result<Shop, ApiError>> + Send;
}

/// `/products/*`. Listings are cached; mutations invalidate the catalog
/// cache.
pub trait ProductApi: Send + Sync {
    fn list_products(
        &self,
        query: &ProductQuery,
    ) -> impl Future<Output = Result<Vec<Product>, ApiError>> + Send;

    fn create_product(
        &self,
        draft: &ProductDraft,
    ) -> impl Future<Output = Result<Product, ApiError>> + Send;

    fn update_product(
        &self,
        id: &ProductId,
        patch: &ProductPatch,
    ) -> impl Future<Output = Result<Product, ApiError>> + Send;

    fn delete_product(&self, id: &ProductId) -> impl Future<Output = Result<(), ApiError>> + Send;
}

/// `/cart/*`. Every mutation returns the cart as the backend now stores it.
pub trait CartApi: Send + Sync {
    fn get_cart(&self) -> impl Future<Output = Result<Cart, ApiError>> + Send;

    fn add_to_cart(
        &self,
        product: &ProductId,
        quantity: u32,
    ) -> impl Future<Output = Result<Cart, ApiError>> + Send;

    fn update_cart_item(
        &self,
        product: &ProductId,
        quantity: u32,
    ) -> impl Future<Output = Result<Cart, ApiError>> + Send;

    fn remove_from_cart(
        &self,
        product: &ProductId,
    ) -> impl Future<Output = Result<Cart, ApiError>> + Send;
}

/// `/orders/*`.
pub trait OrderApi: Send + Sync {
    /// Turn the server-side cart into one order per shop.
    fn create_orders_from_cart(&self) -> impl Future<Output = Result<Vec<Order>, ApiError>> + Send;

    fn my_orders(&self) -> impl Future<Output = Result<Vec<Order>, ApiError>> + Send;

    /// Every order (admin).
    fn all_orders(&self) -> impl Future<Output = Result<Vec<Order>, ApiError>> + Send;

    fn assign_agent(
        &self,
        order: &OrderId,
        agent: &UserId,
    ) -> impl Future<Output = Result<Order, ApiError>> + Send;
}

/// `/admin/*`.
pub trait AdminApi: Send + Sync {
    fn dashboard_stats(&self) -> impl Future<Output = Result<DashboardStats, ApiError>> + Send;
}
