//! Backend DTOs.
//!
//! Field names follow the backend's camelCase JSON with Mongo-style `_id`
//! identifiers. Referenced documents arrive either populated (an object with
//! at least `_id` and `name`) or as a bare id; [`Ref`] models both.

pub mod cart;
pub mod link;
pub mod order;
pub mod product;
pub mod shop;
pub mod stats;
pub mod user;

pub use cart::{Cart, CartLineItem, CartProduct};
pub use link::{Ref, RefSummary, ShopRef, UserRef};
pub use order::{Order, OrderItem};
pub use product::{ProductDraft, Product, ProductPatch, ProductQuery, StockError};
pub use shop::{Shop, ShopPatch};
pub use stats::DashboardStats;
pub use user::{Address, GeoPoint, User, UserFilter};
