//! Admin moderation of shops and users, and the dashboard.

use std::sync::Arc;

use bazaryo_core::dashboard::{DashboardView, ShopTally};
use bazaryo_core::{Shop, ShopId, ShopPatch, User, UserFilter, UserId};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{info, instrument, warn};

use super::ActionFailed;
use crate::api::{AdminApi, ShopApi, UserApi};

const FETCH_SHOPS_FAILED: &str = "Failed to fetch shops.";
const UPDATE_SHOP_FAILED: &str = "Failed to update shop status.";
const FETCH_USERS_FAILED: &str = "Failed to fetch users.";
const DELETE_USER_FAILED: &str = "Failed to delete user.";
const LOAD_DASHBOARD_FAILED: &str = "Failed to load dashboard data.";

#[derive(Debug, Error)]
pub enum ModerationError {
    #[error("Shop {0} is not in the list.")]
    UnknownShop(ShopId),

    #[error(transparent)]
    Failed(#[from] ActionFailed),
}

impl ModerationError {
    #[must_use]
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

/// The admin's shop and user tables. Clones share state.
pub struct Moderation<A> {
    api: A,
    shops: Arc<watch::Sender<Vec<Shop>>>,
    users: Arc<watch::Sender<Vec<User>>>,
}

impl<A: Clone> Clone for Moderation<A> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            shops: Arc::clone(&self.shops),
            users: Arc::clone(&self.users),
        }
    }
}

impl<A: ShopApi + UserApi> Moderation<A> {
    #[must_use]
    pub fn new(api: A) -> Self {
        let (shops, _) = watch::channel(Vec::new());
        let (users, _) = watch::channel(Vec::new());
        Self {
            api,
            shops: Arc::new(shops),
            users: Arc::new(users),
        }
    }

    #[must_use]
    pub fn shops(&self) -> Vec<Shop> {
        self.shops.borrow().clone()
    }

    #[must_use]
    pub fn users(&self) -> Vec<User> {
        self.users.borrow().clone()
    }

    #[must_use]
    pub fn shop_tally(&self) -> ShopTally {
        ShopTally::from_shops(&self.shops.borrow())
    }

    #[must_use]
    pub fn subscribe_shops(&self) -> watch::Receiver<Vec<Shop>> {
        self.shops.subscribe()
    }

    #[must_use]
    pub fn subscribe_users(&self) -> watch::Receiver<Vec<User>> {
        self.users.subscribe()
    }

    /// # Errors
    ///
    /// The backend's message or "Failed to fetch shops.".
    #[instrument(skip(self))]
    pub async fn refresh_shops(&self) -> Result<Vec<Shop>, ActionFailed> {
        let shops = self
            .api
            .list_shops()
            .await
            .map_err(|e| ActionFailed::new(e, FETCH_SHOPS_FAILED))?;
        self.shops.send_replace(shops.clone());
        Ok(shops)
    }

    /// # Errors
    ///
    /// The backend's message or "Failed to fetch users.".
    #[instrument(skip(self))]
    pub async fn refresh_users(&self) -> Result<Vec<User>, ActionFailed> {
        let users = self
            .api
            .list_users(&UserFilter::default())
            .await
            .map_err(|e| ActionFailed::new(e, FETCH_USERS_FAILED))?;
        self.users.send_replace(users.clone());
        Ok(users)
    }

    /// Flip a listed shop's verification flag, then re-fetch the shops.
    ///
    /// # Errors
    ///
    /// [`ModerationError::UnknownShop`] if the shop is not listed, otherwise
    /// the backend's message or "Failed to update shop status.".
    #[instrument(skip(self, id), fields(shop_id = %id))]
    pub async fn toggle_verification(&self, id: &ShopId) -> Result<Shop, ModerationError> {
        let verified = self
            .shops
            .borrow()
            .iter()
            .find(|shop| &shop.id == id)
            .map(|shop| shop.is_verified)
            .ok_or_else(|| ModerationError::UnknownShop(id.clone()))?;

        let shop = self
            .api
            .update_shop(id, &ShopPatch::verification(!verified))
            .await
            .map_err(|e| ActionFailed::new(e, UPDATE_SHOP_FAILED))?;
        info!(is_verified = shop.is_verified, "Updated shop verification");
        if let Err(e) = self.refresh_shops().await {
            warn!(error = %e, "Shop list reload failed after verification change");
        }
        Ok(shop)
    }

    /// Delete a user, then re-fetch the users.
    ///
    /// # Errors
    ///
    /// The backend's message or "Failed to delete user.".
    #[instrument(skip(self, id), fields(user_id = %id))]
    pub async fn delete_user(&self, id: &UserId) -> Result<(), ActionFailed> {
        self.api
            .delete_user(id)
            .await
            .map_err(|e| ActionFailed::new(e, DELETE_USER_FAILED))?;
        info!("Deleted user");
        if let Err(e) = self.refresh_users().await {
            warn!(error = %e, "User list reload failed after deletion");
        }
        Ok(())
    }
}

/// Fetch the admin stats and shape them for the dashboard.
///
/// # Errors
///
/// The backend's message or "Failed to load dashboard data.".
#[instrument(skip(api))]
pub async fn load_dashboard<A: AdminApi>(api: &A) -> Result<DashboardView, ActionFailed> {
    let stats = api
        .dashboard_stats()
        .await
        .map_err(|e| ActionFailed::new(e, LOAD_DASHBOARD_FAILED))?;
    Ok(DashboardView::from_stats(&stats))
}
