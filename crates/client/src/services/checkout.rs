//! Checkout: turn the cart into one order per shop.

use std::sync::Arc;

use bazaryo_core::{Order, Route};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use super::ActionFailed;
use super::cart::CartStore;
use crate::api::{CartApi, OrderApi};

const PLACE_ORDERS_FAILED: &str = "Failed to place orders.";

#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Nothing in the cart belongs to a resolvable shop.
    #[error("Your cart is empty.")]
    EmptyCart,

    /// Another checkout on this orchestrator has not finished yet.
    #[error("Checkout is already in progress.")]
    InProgress,

    #[error(transparent)]
    Failed(#[from] ActionFailed),
}

impl CheckoutError {
    /// The message to show the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

/// A placed checkout.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutOutcome {
    /// Where to navigate next.
    pub route: Route,
    /// The orders the backend created, one per shop.
    pub orders: Vec<Order>,
}

/// Places the whole cart as orders.
///
/// At most one checkout runs at a time per orchestrator (and its clones).
pub struct CheckoutOrchestrator<A> {
    api: A,
    cart: CartStore<A>,
    in_flight: Arc<Mutex<()>>,
}

impl<A: Clone> Clone for CheckoutOrchestrator<A> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            cart: self.cart.clone(),
            in_flight: Arc::clone(&self.in_flight),
        }
    }
}

impl<A: CartApi + OrderApi> CheckoutOrchestrator<A> {
    #[must_use]
    pub fn new(api: A, cart: CartStore<A>) -> Self {
        Self {
            api,
            cart,
            in_flight: Arc::new(Mutex::new(())),
        }
    }

    /// The cart this orchestrator checks out.
    #[must_use]
    pub const fn cart(&self) -> &CartStore<A> {
        &self.cart
    }

    /// Place one order per shop group in the cart.
    ///
    /// On success the local cart is emptied and re-synced from the backend.
    /// On failure the cart is left untouched, so calling again retries.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::InProgress`] while another checkout runs.
    /// - [`CheckoutError::EmptyCart`] without calling the backend.
    /// - [`CheckoutError::Failed`] with the backend's message or
    ///   "Failed to place orders.".
    #[instrument(skip(self))]
    pub async fn checkout(&self) -> Result<CheckoutOutcome, CheckoutError> {
        let Ok(_guard) = self.in_flight.try_lock() else {
            return Err(CheckoutError::InProgress);
        };

        let summary = self.cart.summary();
        if summary.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let orders = self
            .api
            .create_orders_from_cart()
            .await
            .map_err(|e| ActionFailed::new(e, PLACE_ORDERS_FAILED))?;

        info!(
            orders = orders.len(),
            shops = summary.groups.len(),
            total = %summary.grand_total,
            "Placed orders from cart"
        );

        self.cart.clear();
        if let Err(e) = self.cart.refresh().await {
            warn!(error = %e, "Could not re-sync cart after checkout");
        }

        Ok(CheckoutOutcome {
            route: Route::MyOrders,
            orders,
        })
    }
}
