use bazaryo_core::{Product, ProductDraft, ProductId, ProductPatch, ProductQuery};
use reqwest::Method;
use tracing::instrument;

use super::ProductApi;
use crate::cache::{CacheKey, CacheValue};
use crate::client::{Auth, BazaryoClient};
use crate::error::ApiError;

impl ProductApi for BazaryoClient {
    /// Search results are never cached.
    #[instrument(skip(self))]
    async fn list_products(&self, query: &ProductQuery) -> Result<Vec<Product>, ApiError> {
        let cacheable = query.search.is_none();
        let key = CacheKey::Products(query.clone());

        if cacheable && let Some(CacheValue::Products(products)) = self.cached(&key).await {
            return Ok(products);
        }

        let request = self
            .request(Method::GET, &["products"], Auth::Optional)
            .await?
            .query(query);
        let products: Vec<Product> = self.send(request).await?;

        if cacheable {
            self.cache(key, CacheValue::Products(products.clone()))
                .await;
        }
        Ok(products)
    }

    #[instrument(skip(self, draft), fields(name = %draft.name))]
    async fn create_product(&self, draft: &ProductDraft) -> Result<Product, ApiError> {
        let request = self
            .request(Method::POST, &["products"], Auth::Required)
            .await?
            .json(draft);
        let product = self.send(request).await?;

        self.invalidate_catalog().await;
        Ok(product)
    }

    #[instrument(skip(self, patch), fields(product_id = %id))]
    async fn update_product(
        &self,
        id: &ProductId,
        patch: &ProductPatch,
    ) -> Result<Product, ApiError> {
        let request = self
            .request(Method::PUT, &["products", id.as_str()], Auth::Required)
            .await?
            .json(patch);
        let product = self.send(request).await?;

        self.invalidate_catalog().await;
        Ok(product)
    }

    #[instrument(skip(self, id), fields(product_id = %id))]
    async fn delete_product(&self, id: &ProductId) -> Result<(), ApiError> {
        let request = self
            .request(Method::DELETE, &["products", id.as_str()], Auth::Required)
            .await?;
        self.send_empty(request).await?;

        self.invalidate_catalog().await;
        Ok(())
    }
}
