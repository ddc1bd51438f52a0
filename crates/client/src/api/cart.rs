use bazaryo_core::{Cart, ProductId};
use reqwest::Method;
use serde::Serialize;
use tracing::instrument;

use super::CartApi;
use crate::client::{Auth, BazaryoClient};
use crate::error::ApiError;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AddToCart<'a> {
    product_id: &'a ProductId,
    quantity: u32,
}

#[derive(Serialize)]
struct SetQuantity {
    quantity: u32,
}

impl CartApi for BazaryoClient {
    #[instrument(skip(self))]
    async fn get_cart(&self) -> Result<Cart, ApiError> {
        let request = self.request(Method::GET, &["cart"], Auth::Required).await?;
        self.send(request).await
    }

    #[instrument(skip(self, product), fields(product_id = %product))]
    async fn add_to_cart(&self, product: &ProductId, quantity: u32) -> Result<Cart, ApiError> {
        let request = self
            .request(Method::POST, &["cart"], Auth::Required)
            .await?
            .json(&AddToCart {
                product_id: product,
                quantity,
            });
        self.send(request).await
    }

    #[instrument(skip(self, product), fields(product_id = %product))]
    async fn update_cart_item(&self, product: &ProductId, quantity: u32) -> Result<Cart, ApiError> {
        let request = self
            .request(Method::PUT, &["cart", product.as_str()], Auth::Required)
            .await?
            .json(&SetQuantity { quantity });
        self.send(request).await
    }

    #[instrument(skip(self, product), fields(product_id = %product))]
    async fn remove_from_cart(&self, product: &ProductId) -> Result<Cart, ApiError> {
        let request = self
            .request(Method::DELETE, &["cart", product.as_str()], Auth::Required)
            .await?;
        self.send(request).await
    }
}
