//! Status and role enums.
//!
//! Order status transitions are owned by the backend; the client only reads
//! the current value and derives display and eligibility from it.

use serde::{Deserialize, Serialize};

use super::route::Route;

/// Order lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Placed by the customer, waiting for the shopkeeper.
    PendingApproval,
    /// Accepted by the shop and being prepared.
    Processing,
    /// Handed to a delivery agent.
    OutForDelivery,
    Delivered,
    Rejected,
    Cancelled,
}

impl OrderStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 6] = [
        Self::PendingApproval,
        Self::Processing,
        Self::OutForDelivery,
        Self::Delivered,
        Self::Rejected,
        Self::Cancelled,
    ];

    /// Wire representation (`PENDING_APPROVAL`, ...).
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PendingApproval => "PENDING_APPROVAL",
            Self::Processing => "PROCESSING",
            Self::OutForDelivery => "OUT_FOR_DELIVERY",
            Self::Delivered => "DELIVERED",
            Self::Rejected => "REJECTED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Badge text, e.g. `OUT FOR DELIVERY`.
    #[must_use]
    pub fn label(&self) -> String {
        self.as_str().replace('_', " ")
    }

    /// Whether the order has reached a state it can no longer leave.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Rejected | Self::Cancelled)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("invalid order status: {s}"))
    }
}

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Browses shops and places orders.
    Customer,
    /// Owns one shop and manages its inventory.
    Shopkeeper,
    /// Delivers orders assigned by an admin.
    DeliveryAgent,
    /// Moderates users, shops and orders.
    Admin,
}

impl UserRole {
    /// Every role, in the order the admin screens list them.
    pub const ALL: [Self; 4] = [
        Self::Customer,
        Self::Shopkeeper,
        Self::DeliveryAgent,
        Self::Admin,
    ];

    /// Wire representation (`delivery_agent`, ...).
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Shopkeeper => "shopkeeper",
            Self::DeliveryAgent => "delivery_agent",
            Self::Admin => "admin",
        }
    }

    /// Badge text used in the user table, e.g. `DELIVERY AGENT`.
    #[must_use]
    pub fn label(&self) -> String {
        self.as_str().replace('_', " ").to_uppercase()
    }

    /// Where a freshly logged-in user of this role lands.
    #[must_use]
    pub const fn landing_route(&self) -> Route {
        match self {
            Self::Admin => Route::AdminDashboard,
            Self::Shopkeeper => Route::ShopkeeperDashboard,
            Self::DeliveryAgent => Route::DeliveryDashboard,
            Self::Customer => Route::Home,
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Self::Customer),
            "shopkeeper" => Ok(Self::Shopkeeper),
            "delivery_agent" => Ok(Self::DeliveryAgent),
            "admin" => Ok(Self::Admin),
            _ => Err(format!("invalid user role: {s}")),
        }
    }
}
