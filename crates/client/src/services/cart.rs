//! The customer's cart.
//!
//! [`CartStore`] is the single owner of the cart on the client. Every change
//! replaces the snapshot in a `watch` channel, and the shop grouping is
//! recomputed with it so subscribers never see items and totals that
//! disagree.

use std::num::NonZeroU32;
use std::sync::Arc;

use bazaryo_core::{Cart, CartLineItem, CartSummary, ProductId, aggregate};
use tokio::sync::watch;
use tracing::{instrument, warn};

use crate::api::CartApi;
use crate::error::ApiError;

/// The cart as last seen, with its shop grouping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartSnapshot {
    /// Lines in cart order, including any that could not be grouped.
    pub items: Vec<CartLineItem>,
    pub summary: CartSummary,
}

impl CartSnapshot {
    fn from_cart(cart: Cart) -> Self {
        let summary = aggregate(&cart.items);
        Self {
            items: cart.items,
            summary,
        }
    }
}

/// Shared handle to the cart. Clones share state.
pub struct CartStore<A> {
    api: A,
    snapshot: Arc<watch::Sender<CartSnapshot>>,
}

impl<A: Clone> Clone for CartStore<A> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            snapshot: Arc::clone(&self.snapshot),
        }
    }
}

impl<A: CartApi> CartStore<A> {
    /// An empty store. Call [`refresh`](Self::refresh) to load the cart.
    #[must_use]
    pub fn new(api: A) -> Self {
        let (snapshot, _) = watch::channel(CartSnapshot::default());
        Self {
            api,
            snapshot: Arc::new(snapshot),
        }
    }

    /// Receive every future snapshot.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CartSnapshot> {
        self.snapshot.subscribe()
    }

    /// The current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> CartSnapshot {
        self.snapshot.borrow().clone()
    }

    /// The current shop grouping.
    #[must_use]
    pub fn summary(&self) -> CartSummary {
        self.snapshot.borrow().summary.clone()
    }

    /// Whether there is nothing checkout could order.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshot.borrow().summary.is_empty()
    }

    /// Reload the cart from the backend.
    ///
    /// # Errors
    ///
    /// Returns the API error; the snapshot is left unchanged.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<CartSummary, ApiError> {
        let cart = self.api.get_cart().await?;
        Ok(self.apply(cart))
    }

    /// Add `quantity` units of a product.
    ///
    /// # Errors
    ///
    /// Returns the API error; the snapshot is left unchanged.
    #[instrument(skip(self, product), fields(product_id = %product))]
    pub async fn add(
        &self,
        product: &ProductId,
        quantity: NonZeroU32,
    ) -> Result<CartSummary, ApiError> {
        let cart = self.api.add_to_cart(product, quantity.get()).await?;
        Ok(self.apply(cart))
    }

    /// Set the quantity of a line. Zero removes it.
    ///
    /// # Errors
    ///
    /// Returns the API error; the snapshot is left unchanged.
    #[instrument(skip(self, product), fields(product_id = %product))]
    pub async fn set_quantity(
        &self,
        product: &ProductId,
        quantity: u32,
    ) -> Result<CartSummary, ApiError> {
        let cart = if quantity == 0 {
            self.api.remove_from_cart(product).await?
        } else {
            self.api.update_cart_item(product, quantity).await?
        };
        Ok(self.apply(cart))
    }

    /// Remove a line.
    ///
    /// # Errors
    ///
    /// Returns the API error; the snapshot is left unchanged.
    #[instrument(skip(self, product), fields(product_id = %product))]
    pub async fn remove(&self, product: &ProductId) -> Result<CartSummary, ApiError> {
        let cart = self.api.remove_from_cart(product).await?;
        Ok(self.apply(cart))
    }

    /// Empty the local cart without contacting the backend.
    pub fn clear(&self) {
        self.snapshot.send_replace(CartSnapshot::default());
    }

    fn apply(&self, cart: Cart) -> CartSummary {
        let snapshot = CartSnapshot::from_cart(cart);
        for item in &snapshot.summary.dropped {
            warn!(
                product_id = ?item.product_id(),
                "Cart item has no resolvable shop, leaving it out of the shop groups"
            );
        }
        let summary = snapshot.summary.clone();
        self.snapshot.send_replace(snapshot);
        summary
    }
}
