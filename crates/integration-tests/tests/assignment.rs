//! Assigning delivery agents to processing orders.
//!
//! Run with: cargo test -p bazaryo-integration-tests --test assignment

use bazaryo_client::BazaryoClient;
use bazaryo_client::services::{AgentAssignment, AssignmentError, AssignmentState, OrderBoard};
use bazaryo_core::{Order, OrderStatus, User, UserId, UserRole};
use bazaryo_integration_tests::{FakeBackend, Failure};

struct Desk {
    backend: FakeBackend,
    workflow: AgentAssignment<BazaryoClient>,
    processing: Order,
    pending: Order,
    agent: User,
}

async fn desk() -> Desk {
    let backend = FakeBackend::start().await;
    let admin = backend.seed_user("Admin", "admin@example.com", "secret1", UserRole::Admin);
    let keeper = backend.seed_user("Ravi", "ravi@example.com", "secret1", UserRole::Shopkeeper);
    let shop = backend.seed_shop(&keeper, "Fresh Market");
    let customer = backend.seed_user("Asha", "asha@example.com", "secret1", UserRole::Customer);
    let agent = backend.seed_user(
        "Vikram",
        "vikram@example.com",
        "secret1",
        UserRole::DeliveryAgent,
    );
    backend.seed_user("Kiran", "kiran@example.com", "secret1", UserRole::DeliveryAgent);

    let processing = backend.seed_order(&customer, &shop, OrderStatus::Processing);
    let pending = backend.seed_order(&customer, &shop, OrderStatus::PendingApproval);

    let client = backend.client_for(&admin).await;
    let board = OrderBoard::admin(client.clone());
    board.refresh().await.expect("load orders");
    let workflow = AgentAssignment::new(client, board);

    Desk {
        backend,
        workflow,
        processing,
        pending,
        agent,
    }
}

#[tokio::test]
async fn test_board_lists_only_processing_orders_as_assignable() {
    let desk = desk().await;
    let board = desk.workflow.board();

    assert_eq!(board.orders().len(), 2);
    let assignable: Vec<_> = board.assignable().into_iter().map(|order| order.id).collect();
    assert_eq!(assignable, vec![desk.processing.id.clone()]);
    assert_eq!(board.tally().processing, 1);
}

#[tokio::test]
async fn test_open_loads_available_agents() {
    let desk = desk().await;

    let agents = desk.workflow.open(&desk.processing).await.expect("open dialog");

    assert_eq!(agents.len(), 2);
    assert!(matches!(
        desk.workflow.state(),
        AssignmentState::AgentsLoaded { ref order, .. } if order.id == desk.processing.id
    ));
}

#[tokio::test]
async fn test_assign_updates_order_and_board() {
    let desk = desk().await;
    desk.workflow.open(&desk.processing).await.expect("open dialog");

    let updated = desk.workflow.assign(&desk.agent.id).await.expect("assign agent");

    assert_eq!(updated.status, OrderStatus::OutForDelivery);
    assert_eq!(updated.agent_name(), Some("Vikram"));
    assert!(matches!(desk.workflow.state(), AssignmentState::Assigned { .. }));

    let board = desk.workflow.board();
    assert!(board.assignable().is_empty());
    let refreshed = board
        .orders()
        .into_iter()
        .find(|order| order.id == desk.processing.id)
        .expect("order still listed");
    assert_eq!(refreshed.status, OrderStatus::OutForDelivery);

    let store = desk.backend.store();
    let agent = store
        .users
        .iter()
        .find(|user| user.id == desk.agent.id)
        .expect("agent exists");
    assert_eq!(agent.is_available, Some(false));
}

#[tokio::test]
async fn test_busy_agent_is_not_offered_again() {
    let desk = desk().await;
    desk.workflow.open(&desk.processing).await.expect("open dialog");
    desk.workflow.assign(&desk.agent.id).await.expect("assign agent");

    let customer = desk
        .backend
        .seed_user("Nila", "nila@example.com", "secret1", UserRole::Customer);
    let shop = desk.backend.store().shops.first().cloned().expect("seeded shop");
    let next = desk.backend.seed_order(&customer, &shop, OrderStatus::Processing);

    let agents = desk.workflow.open(&next).await.expect("open dialog");

    assert_eq!(agents.len(), 1);
    assert!(agents.iter().all(|agent| agent.id != desk.agent.id));
}

#[tokio::test]
async fn test_pending_order_cannot_be_opened() {
    let desk = desk().await;

    let result = desk.workflow.open(&desk.pending).await;

    assert!(matches!(result, Err(AssignmentError::NotAssignable)));
    assert_eq!(desk.backend.hits("users.list"), 0);
}

#[tokio::test]
async fn test_agent_outside_list_is_refused() {
    let desk = desk().await;
    desk.workflow.open(&desk.processing).await.expect("open dialog");

    let result = desk.workflow.assign(&UserId::new("ffffffffffffffffffffffff")).await;

    assert!(matches!(result, Err(AssignmentError::UnknownAgent)));
    assert_eq!(desk.backend.hits("orders.assign"), 0);
}

#[tokio::test]
async fn test_failed_assignment_keeps_agents_for_retry() {
    let desk = desk().await;
    desk.workflow.open(&desk.processing).await.expect("open dialog");
    desk.backend.fail(
        "orders.assign",
        Failure::new(400, Some("Delivery agent is not available")),
    );

    let error = desk
        .workflow
        .assign(&desk.agent.id)
        .await
        .expect_err("assignment should fail");

    assert_eq!(error.user_message(), "Delivery agent is not available");
    let state = desk.workflow.state();
    assert_eq!(state.notice(), Some("Delivery agent is not available"));
    assert_eq!(state.agents().len(), 2);

    desk.backend.recover("orders.assign");
    desk.workflow.assign(&desk.agent.id).await.expect("retry assign");
    assert!(matches!(desk.workflow.state(), AssignmentState::Assigned { .. }));
}

#[tokio::test]
async fn test_agent_list_failure_returns_to_idle() {
    let desk = desk().await;
    desk.backend.fail("users.list", Failure::new(500, None));

    let error = desk
        .workflow
        .open(&desk.processing)
        .await
        .expect_err("open should fail");

    assert!(matches!(error, AssignmentError::AgentsUnavailable(_)));
    assert_eq!(desk.workflow.state(), AssignmentState::Idle);
}
