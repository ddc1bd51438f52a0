//! Shopkeeper product management.

use std::sync::Arc;

use bazaryo_core::{Product, ProductDraft, ProductId, ProductPatch, ShopId, StockError, User};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{info, instrument, warn};

use super::ActionFailed;
use crate::api::{ProductApi, ShopApi};

const FETCH_PRODUCTS_FAILED: &str = "Failed to fetch products.";
const SAVE_PRODUCT_FAILED: &str = "Operation failed.";
const DELETE_PRODUCT_FAILED: &str = "Failed to delete product.";
const UPDATE_STOCK_FAILED: &str = "Failed to update stock";

#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("Your user account is not linked to a shop. Please contact support.")]
    NoLinkedShop,

    #[error(transparent)]
    Stock(#[from] StockError),

    #[error("Product {0} is not in this shop.")]
    UnknownProduct(ProductId),

    #[error(transparent)]
    Failed(#[from] ActionFailed),
}

impl InventoryError {
    #[must_use]
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

/// The signed-in shopkeeper's products. Clones share state.
pub struct Inventory<A> {
    api: A,
    shop: Option<ShopId>,
    products: Arc<watch::Sender<Vec<Product>>>,
}

impl<A: Clone> Clone for Inventory<A> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            shop: self.shop.clone(),
            products: Arc::clone(&self.products),
        }
    }
}

impl<A: ShopApi + ProductApi> Inventory<A> {
    /// Inventory for the shop `shopkeeper` owns.
    #[must_use]
    pub fn new(api: A, shopkeeper: &User) -> Self {
        let (products, _) = watch::channel(Vec::new());
        Self {
            api,
            shop: shopkeeper.shop.clone(),
            products: Arc::new(products),
        }
    }

    #[must_use]
    pub const fn shop(&self) -> Option<&ShopId> {
        self.shop.as_ref()
    }

    #[must_use]
    pub fn products(&self) -> Vec<Product> {
        self.products.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Vec<Product>> {
        self.products.subscribe()
    }

    /// Fetch the shop's products.
    ///
    /// # Errors
    ///
    /// [`InventoryError::NoLinkedShop`] without a network call when the user
    /// owns no shop; otherwise the backend's message or
    /// "Failed to fetch products.".
    #[instrument(skip(self))]
    pub async fn load(&self) -> Result<Vec<Product>, InventoryError> {
        let shop = self.shop.as_ref().ok_or(InventoryError::NoLinkedShop)?;
        let shop = self
            .api
            .get_shop(shop)
            .await
            .map_err(|e| ActionFailed::new(e, FETCH_PRODUCTS_FAILED))?;
        self.products.send_replace(shop.products.clone());
        Ok(shop.products)
    }

    /// # Errors
    ///
    /// The backend's message or "Operation failed.".
    #[instrument(skip(self, draft), fields(name = %draft.name))]
    pub async fn create(&self, draft: &ProductDraft) -> Result<Product, InventoryError> {
        self.linked_shop()?;
        let product = self
            .api
            .create_product(draft)
            .await
            .map_err(|e| ActionFailed::new(e, SAVE_PRODUCT_FAILED))?;
        info!(product_id = %product.id, "Created product");
        self.reload_after_change().await;
        Ok(product)
    }

    /// # Errors
    ///
    /// The backend's message or "Operation failed.".
    #[instrument(skip(self, id, patch), fields(product_id = %id))]
    pub async fn update(
        &self,
        id: &ProductId,
        patch: &ProductPatch,
    ) -> Result<Product, InventoryError> {
        self.linked_shop()?;
        let product = self
            .api
            .update_product(id, patch)
            .await
            .map_err(|e| ActionFailed::new(e, SAVE_PRODUCT_FAILED))?;
        self.reload_after_change().await;
        Ok(product)
    }

    /// # Errors
    ///
    /// The backend's message or "Failed to delete product.".
    #[instrument(skip(self, id), fields(product_id = %id))]
    pub async fn delete(&self, id: &ProductId) -> Result<(), InventoryError> {
        self.linked_shop()?;
        self.api
            .delete_product(id)
            .await
            .map_err(|e| ActionFailed::new(e, DELETE_PRODUCT_FAILED))?;
        info!("Deleted product");
        self.reload_after_change().await;
        Ok(())
    }

    /// Add `amount` units to a loaded product's stock.
    ///
    /// # Errors
    ///
    /// - [`InventoryError::Stock`] unless `amount` is positive.
    /// - [`InventoryError::UnknownProduct`] if the product is not loaded.
    /// - [`InventoryError::Failed`] with the backend's message or
    ///   "Failed to update stock".
    #[instrument(skip(self, id), fields(product_id = %id))]
    pub async fn add_stock(&self, id: &ProductId, amount: i64) -> Result<Product, InventoryError> {
        let quantity = {
            let products = self.products.borrow();
            let product = products
                .iter()
                .find(|product| &product.id == id)
                .ok_or_else(|| InventoryError::UnknownProduct(id.clone()))?;
            product.restock_quantity(amount)?
        };

        let product = self
            .api
            .update_product(id, &ProductPatch::stock(quantity))
            .await
            .map_err(|e| ActionFailed::new(e, UPDATE_STOCK_FAILED))?;
        info!(quantity, "Updated stock");
        self.reload_after_change().await;
        Ok(product)
    }

    async fn reload_after_change(&self) {
        if let Err(e) = self.load().await {
            warn!(error = %e, "Product list reload failed after a successful change");
        }
    }

    fn linked_shop(&self) -> Result<&ShopId, InventoryError> {
        self.shop.as_ref().ok_or(InventoryError::NoLinkedShop)
    }
}
