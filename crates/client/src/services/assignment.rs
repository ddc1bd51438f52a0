//! Admin workflow for attaching a delivery agent to an order.
//!
//! ```text
//! Idle ─open─▶ AgentsLoading ─▶ AgentsLoaded ─assign─▶ Assigning ─▶ Assigned
//!                   │                 ▲                    │
//!                   ▼                 └──── AssignFailed ◀─┘
//!                  Idle (fetch failed)
//! ```
//!
//! `close` returns to `Idle` from anywhere. Every `open` and `close` starts
//! a new generation; an agent list or assignment result that arrives for an
//! older generation is not applied to the state.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use bazaryo_core::{Order, OrderId, User, UserFilter, UserId};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use super::ActionFailed;
use super::orders::OrderBoard;
use crate::api::{OrderApi, UserApi};

const FETCH_AGENTS_FAILED: &str = "Could not fetch available agents.";
const ASSIGN_FAILED: &str = "Failed to assign agent.";

/// Shown when the agent list loaded but is empty.
pub const NO_AGENTS_AVAILABLE: &str = "No delivery agents are currently available.";

#[derive(Debug, Clone, Default, PartialEq)]
pub enum AssignmentState {
    #[default]
    Idle,
    AgentsLoading {
        order: Order,
    },
    /// `agents` may be empty; that is a normal state, not an error.
    AgentsLoaded {
        order: Order,
        agents: Vec<User>,
    },
    Assigning {
        order: Order,
        agents: Vec<User>,
        agent: UserId,
    },
    Assigned {
        order: OrderId,
        agent: UserId,
    },
    /// The agent list is kept so the operator can retry or pick another.
    AssignFailed {
        order: Order,
        agents: Vec<User>,
        message: String,
    },
}

impl AssignmentState {
    /// The order the dialog is open for.
    #[must_use]
    pub const fn order(&self) -> Option<&Order> {
        match self {
            Self::AgentsLoading { order }
            | Self::AgentsLoaded { order, .. }
            | Self::Assigning { order, .. }
            | Self::AssignFailed { order, .. } => Some(order),
            Self::Idle | Self::Assigned { .. } => None,
        }
    }

    /// Agents the operator can pick from.
    #[must_use]
    pub fn agents(&self) -> &[User] {
        match self {
            Self::AgentsLoaded { agents, .. }
            | Self::Assigning { agents, .. }
            | Self::AssignFailed { agents, .. } => agents,
            _ => &[],
        }
    }

    /// A line of text to show inside the dialog, if any.
    #[must_use]
    pub fn notice(&self) -> Option<&str> {
        match self {
            Self::AgentsLoaded { agents, .. } if agents.is_empty() => Some(NO_AGENTS_AVAILABLE),
            Self::AssignFailed { message, .. } => Some(message),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum AssignmentError {
    #[error("Only processing orders without an agent can be assigned.")]
    NotAssignable,

    #[error(transparent)]
    AgentsUnavailable(ActionFailed),

    /// `assign` was called before an agent list was loaded.
    #[error("Open an order and load its agents first.")]
    NotReady,

    #[error("An assignment is already in progress.")]
    InProgress,

    #[error("That agent is not in the available list.")]
    UnknownAgent,

    #[error(transparent)]
    AssignFailed(ActionFailed),

    /// The dialog was closed or reopened before the response arrived.
    #[error("The assignment dialog was closed.")]
    Superseded,
}

impl AssignmentError {
    #[must_use]
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

/// The assign-agent dialog. Clones share state.
pub struct AgentAssignment<A> {
    api: A,
    board: OrderBoard<A>,
    state: Arc<watch::Sender<AssignmentState>>,
    generation: Arc<AtomicU64>,
}

impl<A: Clone> Clone for AgentAssignment<A> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            board: self.board.clone(),
            state: Arc::clone(&self.state),
            generation: Arc::clone(&self.generation),
        }
    }
}

impl<A: UserApi + OrderApi> AgentAssignment<A> {
    /// `board` is re-fetched after every successful assignment.
    #[must_use]
    pub fn new(api: A, board: OrderBoard<A>) -> Self {
        let (state, _) = watch::channel(AssignmentState::Idle);
        Self {
            api,
            board,
            state: Arc::new(state),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    #[must_use]
    pub fn state(&self) -> AssignmentState {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AssignmentState> {
        self.state.subscribe()
    }

    #[must_use]
    pub const fn board(&self) -> &OrderBoard<A> {
        &self.board
    }

    /// Open the dialog for `order` and load the available agents.
    ///
    /// # Errors
    ///
    /// - [`AssignmentError::NotAssignable`] unless the order is processing
    ///   and has no agent.
    /// - [`AssignmentError::InProgress`] while an assignment is running.
    /// - [`AssignmentError::AgentsUnavailable`] when the list could not be
    ///   fetched; the dialog returns to `Idle`.
    /// - [`AssignmentError::Superseded`] when the dialog was closed or
    ///   reopened before the list arrived.
    #[instrument(skip(self, order), fields(order_id = %order.id))]
    pub async fn open(&self, order: &Order) -> Result<Vec<User>, AssignmentError> {
        if !order.is_assignable() {
            return Err(AssignmentError::NotAssignable);
        }

        let mut started = None;
        self.state.send_if_modified(|state| {
            if matches!(state, AssignmentState::Assigning { .. }) {
                return false;
            }
            started = Some(self.next_generation());
            *state = AssignmentState::AgentsLoading {
                order: order.clone(),
            };
            true
        });
        let generation = started.ok_or(AssignmentError::InProgress)?;

        let result = self.api.list_users(&UserFilter::available_agents()).await;

        let applied = self.apply_if_current(generation, |state| {
            *state = match &result {
                Ok(agents) => AssignmentState::AgentsLoaded {
                    order: order.clone(),
                    agents: agents.clone(),
                },
                Err(_) => AssignmentState::Idle,
            };
        });
        if !applied {
            debug!(generation, "Discarding stale agent list");
            return Err(AssignmentError::Superseded);
        }

        let agents = result.map_err(|e| {
            warn!(error = %e, "Failed to fetch delivery agents");
            AssignmentError::AgentsUnavailable(ActionFailed::new(e, FETCH_AGENTS_FAILED))
        })?;
        debug!(count = agents.len(), "Loaded delivery agents");
        Ok(agents)
    }

    /// Assign `agent` to the open order.
    ///
    /// On success the dialog moves to `Assigned` and the order board is
    /// re-fetched. On failure it moves to `AssignFailed` and keeps the agent
    /// list.
    ///
    /// # Errors
    ///
    /// - [`AssignmentError::NotReady`] unless agents are loaded.
    /// - [`AssignmentError::InProgress`] while another assignment runs.
    /// - [`AssignmentError::UnknownAgent`] if `agent` is not in the list.
    /// - [`AssignmentError::AssignFailed`] with the backend's message or
    ///   "Failed to assign agent.".
    #[instrument(skip(self, agent), fields(agent_id = %agent))]
    pub async fn assign(&self, agent: &UserId) -> Result<Order, AssignmentError> {
        let mut outcome = Err(AssignmentError::NotReady);
        self.state.send_if_modified(|state| {
            let (order, agents) = match state {
                AssignmentState::AgentsLoaded { order, agents }
                | AssignmentState::AssignFailed { order, agents, .. } => (order, agents),
                AssignmentState::Assigning { .. } => {
                    outcome = Err(AssignmentError::InProgress);
                    return false;
                }
                _ => return false,
            };
            if !agents.iter().any(|candidate| &candidate.id == agent) {
                outcome = Err(AssignmentError::UnknownAgent);
                return false;
            }
            let (order, agents) = (order.clone(), std::mem::take(agents));
            outcome = Ok((order.id.clone(), self.generation.load(Ordering::SeqCst)));
            *state = AssignmentState::Assigning {
                order,
                agents,
                agent: agent.clone(),
            };
            true
        });
        let (order_id, generation) = outcome?;

        match self.api.assign_agent(&order_id, agent).await {
            Ok(updated) => {
                info!(order_id = %order_id, "Assigned delivery agent");
                self.apply_if_current(generation, |state| {
                    *state = AssignmentState::Assigned {
                        order: order_id.clone(),
                        agent: agent.clone(),
                    };
                });
                if let Err(e) = self.board.refresh().await {
                    warn!(error = %e.source, "Could not refresh orders after assignment");
                }
                Ok(updated)
            }
            Err(e) => {
                let failed = ActionFailed::new(e, ASSIGN_FAILED);
                warn!(error = %failed.source, "Failed to assign delivery agent");
                self.apply_if_current(generation, |state| {
                    if let AssignmentState::Assigning { order, agents, .. } = state {
                        *state = AssignmentState::AssignFailed {
                            order: order.clone(),
                            agents: std::mem::take(agents),
                            message: failed.message.clone(),
                        };
                    }
                });
                Err(AssignmentError::AssignFailed(failed))
            }
        }
    }

    /// Close the dialog. Responses still in flight are discarded.
    pub fn close(&self) {
        self.state.send_modify(|state| {
            self.next_generation();
            *state = AssignmentState::Idle;
        });
    }

    /// Only called inside a `watch` closure, which serializes it with
    /// [`apply_if_current`](Self::apply_if_current).
    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn apply_if_current(&self, generation: u64, apply: impl FnOnce(&mut AssignmentState)) -> bool {
        let mut applied = false;
        self.state.send_if_modified(|state| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            apply(state);
            applied = true;
            true
        });
        applied
    }
}
