//! Order lists for the customer and admin screens.

use std::sync::Arc;

use bazaryo_core::Order;
use bazaryo_core::dashboard::OrderTally;
use tokio::sync::watch;
use tracing::{debug, instrument};

use super::ActionFailed;
use crate::api::OrderApi;

const FETCH_ORDERS_FAILED: &str = "Failed to fetch orders.";

/// Which orders a board lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderScope {
    /// Every order (admin).
    All,
    /// The signed-in customer's orders.
    Mine,
}

/// The last fetched order list. Clones share state.
pub struct OrderBoard<A> {
    api: A,
    scope: OrderScope,
    orders: Arc<watch::Sender<Vec<Order>>>,
}

impl<A: Clone> Clone for OrderBoard<A> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            scope: self.scope,
            orders: Arc::clone(&self.orders),
        }
    }
}

impl<A: OrderApi> OrderBoard<A> {
    #[must_use]
    pub fn new(api: A, scope: OrderScope) -> Self {
        let (orders, _) = watch::channel(Vec::new());
        Self {
            api,
            scope,
            orders: Arc::new(orders),
        }
    }

    #[must_use]
    pub fn admin(api: A) -> Self {
        Self::new(api, OrderScope::All)
    }

    #[must_use]
    pub fn customer(api: A) -> Self {
        Self::new(api, OrderScope::Mine)
    }

    #[must_use]
    pub const fn scope(&self) -> OrderScope {
        self.scope
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Vec<Order>> {
        self.orders.subscribe()
    }

    #[must_use]
    pub fn orders(&self) -> Vec<Order> {
        self.orders.borrow().clone()
    }

    #[must_use]
    pub fn tally(&self) -> OrderTally {
        OrderTally::from_orders(&self.orders.borrow())
    }

    /// Orders an admin may attach a delivery agent to.
    #[must_use]
    pub fn assignable(&self) -> Vec<Order> {
        self.orders
            .borrow()
            .iter()
            .filter(|order| order.is_assignable())
            .cloned()
            .collect()
    }

    /// Re-fetch the full list. The previous list is kept on failure.
    ///
    /// # Errors
    ///
    /// Returns the backend's message or "Failed to fetch orders.".
    #[instrument(skip(self), fields(scope = ?self.scope))]
    pub async fn refresh(&self) -> Result<Vec<Order>, ActionFailed> {
        let orders = match self.scope {
            OrderScope::All => self.api.all_orders().await,
            OrderScope::Mine => self.api.my_orders().await,
        }
        .map_err(|e| ActionFailed::new(e, FETCH_ORDERS_FAILED))?;

        debug!(count = orders.len(), "Fetched orders");
        self.orders.send_replace(orders.clone());
        Ok(orders)
    }
}
