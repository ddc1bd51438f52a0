//! Bazaryo Client - REST access and client-side workflows.
//!
//! [`BazaryoClient`] wraps every backend endpoint behind the traits in
//! [`api`]. The workflows in [`services`] are generic over those traits and
//! own the client-side state: the cart, checkout, delivery agent assignment,
//! inventory and moderation screens, and the signed-in session.
//!
//! # Example
//!
//! ```rust,no_run
//! use bazaryo_client::{BazaryoClient, ClientConfig};
//! use bazaryo_client::services::{CartStore, CheckoutOrchestrator};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = BazaryoClient::new(&ClientConfig::from_env()?)?;
//! let cart = CartStore::new(client.clone());
//! cart.refresh().await?;
//!
//! let checkout = CheckoutOrchestrator::new(client, cart);
//! let outcome = checkout.checkout().await?;
//! println!("placed {} orders, go to {}", outcome.orders.len(), outcome.route);
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod services;

pub use client::BazaryoClient;
pub use config::{ClientConfig, ConfigError};
pub use error::ApiError;
