use bazaryo_core::{Order, OrderId, UserId};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use super::OrderApi;
use crate::client::{Auth, BazaryoClient};
use crate::error::ApiError;

/// `POST /orders/from-cart` answers with the created orders, either bare or
/// wrapped alongside a message.
#[derive(Deserialize)]
#[serde(untagged)]
enum CreatedOrders {
    List(Vec<Order>),
    Wrapped { orders: Vec<Order> },
}

impl From<CreatedOrders> for Vec<Order> {
    fn from(created: CreatedOrders) -> Self {
        match created {
            CreatedOrders::List(orders) | CreatedOrders::Wrapped { orders } => orders,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AssignAgent<'a> {
    agent_id: &'a UserId,
}

impl OrderApi for BazaryoClient {
    #[instrument(skip(self))]
    async fn create_orders_from_cart(&self) -> Result<Vec<Order>, ApiError> {
        let request = self
            .request(Method::POST, &["orders", "from-cart"], Auth::Required)
            .await?;
        let created: CreatedOrders = self.send(request).await?;
        let orders = Vec::from(created);

        info!(count = orders.len(), "Orders created from cart");
        Ok(orders)
    }

    #[instrument(skip(self))]
    async fn my_orders(&self) -> Result<Vec<Order>, ApiError> {
        let request = self
            .request(Method::GET, &["orders", "my-orders"], Auth::Required)
            .await?;
        self.send(request).await
    }

    #[instrument(skip(self))]
    async fn all_orders(&self) -> Result<Vec<Order>, ApiError> {
        let request = self.request(Method::GET, &["orders"], Auth::Required).await?;
        self.send(request).await
    }

    #[instrument(skip(self, order, agent), fields(order_id = %order, agent_id = %agent))]
    async fn assign_agent(&self, order: &OrderId, agent: &UserId) -> Result<Order, ApiError> {
        let request = self
            .request(
                Method::PUT,
                &["orders", order.as_str(), "assign"],
                Auth::Required,
            )
            .await?
            .json(&AssignAgent { agent_id: agent });
        self.send(request).await
    }
}
