//! Bazaryo Core - Shared types and pure storefront logic.
//!
//! This crate provides the types and transforms used across all Bazaryo
//! components:
//! - `client` - Typed REST client and client-side workflows
//! - `cli` - Command-line front end
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no logging. Anything here can be recomputed on every cart change
//! or render tick without side effects.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, money, emails, statuses and routes
//! - [`models`] - Backend DTOs (products, shops, users, orders, cart, stats)
//! - [`cart`] - Cart aggregation by shop
//! - [`forms`] - Registration, login and profile form models
//! - [`dashboard`] - Chart-ready reshaping of admin stats and list tallies

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod dashboard;
pub mod forms;
pub mod models;
pub mod types;

pub use cart::{CartSummary, ShopGroup, aggregate};
pub use models::*;
pub use types::*;
