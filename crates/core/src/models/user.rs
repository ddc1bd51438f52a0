//! User accounts and addresses.

use serde::{Deserialize, Serialize};

use crate::types::{Email, ShopId, UserId, UserRole};

/// A user account as returned by `/users` and `/users/me`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub role: UserRole,
    /// The owned shop, for shopkeepers.
    #[serde(rename = "shopId", default, skip_serializing_if = "Option::is_none")]
    pub shop: Option<ShopId>,
    /// Availability, for delivery agents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_available: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
}

/// A postal address with an optional map location.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub pincode: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
}

/// A GeoJSON point. Coordinates are `[longitude, latitude]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    #[serde(rename = "type", default = "GeoPoint::kind")]
    kind: GeoKind,
    pub coordinates: [f64; 2],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
enum GeoKind {
    Point,
}

impl GeoPoint {
    #[must_use]
    pub const fn new(lng: f64, lat: f64) -> Self {
        Self {
            kind: GeoKind::Point,
            coordinates: [lng, lat],
        }
    }

    const fn kind() -> GeoKind {
        GeoKind::Point
    }

    #[must_use]
    pub const fn lng(&self) -> f64 {
        self.coordinates[0]
    }

    #[must_use]
    pub const fn lat(&self) -> f64 {
        self.coordinates[1]
    }
}

/// Query filters for `GET /users`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_available: Option<bool>,
}

impl UserFilter {
    /// Delivery agents currently marked available.
    #[must_use]
    pub const fn available_agents() -> Self {
        Self {
            role: Some(UserRole::DeliveryAgent),
            is_available: Some(true),
        }
    }
}
