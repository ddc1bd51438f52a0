//! Command implementations, one module per command group.

pub mod account;
pub mod admin;
pub mod cart;
pub mod orders;
pub mod products;

use bazaryo_client::services::{
    ActionFailed, AssignmentError, CheckoutError, InventoryError, ModerationError, SessionError,
};
use bazaryo_client::{ApiError, ConfigError};
use thiserror::Error;

/// Errors that end a command. Displayed as the user-facing message.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Action(#[from] ActionFailed),

    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    #[error(transparent)]
    Assignment(#[from] AssignmentError),

    #[error(transparent)]
    Inventory(#[from] InventoryError),

    #[error(transparent)]
    Moderation(#[from] ModerationError),

    #[error(transparent)]
    Session(#[from] SessionError),

    /// Arguments that are well-formed but not usable.
    #[error("{0}")]
    Invalid(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON output error: {0}")]
    Json(#[from] serde_json::Error),
}
