//! Order listing and delivery agent assignment.

use bazaryo_client::services::{AgentAssignment, OrderBoard};
use bazaryo_client::services::assignment::NO_AGENTS_AVAILABLE;
use bazaryo_core::{Order, OrderId, User, UserId};

use super::CommandError;
use crate::context::Context;
use crate::output::table;

fn render(orders: &[Order]) -> Vec<String> {
    if orders.is_empty() {
        return vec!["No orders yet.".to_owned()];
    }
    let rows = orders
        .iter()
        .map(|order| {
            vec![
                order.id.to_string(),
                order.customer_name().to_owned(),
                order.shop_name().to_owned(),
                order.total_amount.to_string(),
                order.status.label(),
                order.agent_name().unwrap_or("-").to_owned(),
            ]
        })
        .collect();
    table(&["ORDER", "CUSTOMER", "SHOP", "TOTAL", "STATUS", "AGENT"], rows)
}

fn render_agents(agents: &[User]) -> Vec<String> {
    if agents.is_empty() {
        return vec![NO_AGENTS_AVAILABLE.to_owned()];
    }
    let rows = agents
        .iter()
        .map(|agent| vec![agent.id.to_string(), agent.name.clone(), agent.email.to_string()])
        .collect();
    table(&["AGENT", "NAME", "EMAIL"], rows)
}

pub async fn mine(ctx: &Context) -> Result<(), CommandError> {
    let orders = OrderBoard::customer(ctx.client.clone()).refresh().await?;
    ctx.out.emit(&orders, || render(&orders))
}

pub async fn list(ctx: &Context, assignable_only: bool) -> Result<(), CommandError> {
    let board = OrderBoard::admin(ctx.client.clone());
    board.refresh().await?;

    let orders = if assignable_only {
        board.assignable()
    } else {
        board.orders()
    };
    let tally = board.tally();
    ctx.out.emit(&orders, || {
        let mut lines = render(&orders);
        lines.push(format!(
            "{} orders, {} processing, {} delivered",
            tally.total, tally.processing, tally.delivered
        ));
        lines
    })
}

/// Without `agent`, list who could take the order. With it, assign.
pub async fn assign(ctx: &Context, order: &str, agent: Option<&str>) -> Result<(), CommandError> {
    let board = OrderBoard::admin(ctx.client.clone());
    let order_id = OrderId::new(order);
    let order = board
        .refresh()
        .await?
        .into_iter()
        .find(|candidate| candidate.id == order_id)
        .ok_or_else(|| CommandError::Invalid(format!("Order {order_id} not found")))?;

    let workflow = AgentAssignment::new(ctx.client.clone(), board);
    let agents = workflow.open(&order).await?;

    let Some(agent) = agent else {
        return ctx.out.emit(&agents, || render_agents(&agents));
    };

    let updated = workflow.assign(&UserId::new(agent)).await?;
    ctx.out.notice("Agent assigned successfully!")?;
    ctx.out.emit(&updated, || render(std::slice::from_ref(&updated)))
}
