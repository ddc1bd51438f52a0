//! Shops and their moderation fields.

use serde::{Deserialize, Serialize};

use super::link::UserRef;
use super::product::Product;
use crate::types::ShopId;

/// A shop owned by one shopkeeper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shop {
    #[serde(rename = "_id")]
    pub id: ShopId,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub pincode: String,
    /// Set by an admin; unverified shops are hidden from customers.
    #[serde(default)]
    pub is_verified: bool,
    #[serde(rename = "ownerId", default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<UserRef>,
    /// Populated only by the shop detail endpoint.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub products: Vec<Product>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
}

/// A partial shop update. Only `Some` fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_verified: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
}

impl ShopPatch {
    /// A patch that only changes the verification flag.
    #[must_use]
    pub fn verification(is_verified: bool) -> Self {
        Self {
            is_verified: Some(is_verified),
            ..Self::default()
        }
    }
}
