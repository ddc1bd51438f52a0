use bazaryo_core::{Shop, ShopId, ShopPatch};
use reqwest::Method;
use tracing::instrument;

use super::ShopApi;
use crate::cache::{CacheKey, CacheValue};
use crate::client::{Auth, BazaryoClient};
use crate::error::ApiError;

impl ShopApi for BazaryoClient {
    #[instrument(skip(self))]
    async fn list_shops(&self) -> Result<Vec<Shop>, ApiError> {
        if let Some(CacheValue::Shops(shops)) = self.cached(&CacheKey::Shops).await {
            return Ok(shops);
        }

        let request = self.request(Method::GET, &["shops"], Auth::Optional).await?;
        let shops: Vec<Shop> = self.send(request).await?;

        self.cache(CacheKey::Shops, CacheValue::Shops(shops.clone()))
            .await;
        Ok(shops)
    }

    #[instrument(skip(self, id), fields(shop_id = %id))]
    async fn get_shop(&self, id: &ShopId) -> Result<Shop, ApiError> {
        let key = CacheKey::Shop(id.clone());
        if let Some(CacheValue::Shop(shop)) = self.cached(&key).await {
            return Ok(*shop);
        }

        let request = self
            .request(Method::GET, &["shops", id.as_str()], Auth::Optional)
            .await?;
        let shop: Shop = self.send(request).await?;

        self.cache(key, CacheValue::Shop(Box::new(shop.clone())))
            .await;
        Ok(shop)
    }

    #[instrument(skip(self, patch), fields(shop_id = %id))]
    async fn update_shop(&self, id: &ShopId, patch: &ShopPatch) -> Result<Shop, ApiError> {
        let request = self
            .request(Method::PUT, &["shops", id.as_str()], Auth::Required)
            .await?
            .json(patch);
        let shop = self.send(request).await?;

        self.invalidate_catalog().await;
        Ok(shop)
    }
}
