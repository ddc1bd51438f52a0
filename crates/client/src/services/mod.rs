//! Client-side workflows.
//!
//! Each workflow owns its state explicitly and publishes it through a
//! `tokio::sync::watch` channel, so any number of views can subscribe and
//! always see the latest value. Workflows are cheap to clone; clones share
//! state. Failed backend calls leave the state as it was before the action
//! and carry a message fit to show the user.

pub mod assignment;
pub mod cart;
pub mod checkout;
pub mod inventory;
pub mod moderation;
pub mod orders;
pub mod session;

#[cfg(test)]
pub(crate) mod fake;

use thiserror::Error;

use crate::error::ApiError;

pub use assignment::{AgentAssignment, AssignmentError, AssignmentState};
pub use cart::{CartSnapshot, CartStore};
pub use checkout::{CheckoutError, CheckoutOrchestrator, CheckoutOutcome};
pub use inventory::{Inventory, InventoryError};
pub use moderation::{Moderation, ModerationError, load_dashboard};
pub use orders::{OrderBoard, OrderScope};
pub use session::{Session, SessionError, SignedIn};

/// A backend call that failed, with the message to show the user.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ActionFailed {
    /// The backend's message, or the action's fallback.
    pub message: String,
    #[source]
    pub source: ApiError,
}

impl ActionFailed {
    /// Wrap `source`, preferring the backend's message over `fallback`.
    #[must_use]
    pub fn new(source: ApiError, fallback: &str) -> Self {
        Self {
            message: source.user_message(fallback),
            source,
        }
    }
}
