//! References to other documents.

use serde::{Deserialize, Serialize};

use crate::types::{ShopId, UserId};

/// A populated reference: whatever subset of the target the backend included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(deserialize = "I: Deserialize<'de>"))]
pub struct RefSummary<I> {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<I>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// A reference that is either populated or a bare id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Ref<I> {
    Populated(RefSummary<I>),
    Id(I),
}

/// Reference to a shop.
pub type ShopRef = Ref<ShopId>;

/// Reference to a user (customer, shopkeeper or delivery agent).
pub type UserRef = Ref<UserId>;

impl<I> Ref<I> {
    /// The referenced id, if known.
    #[must_use]
    pub const fn id(&self) -> Option<&I> {
        match self {
            Self::Populated(summary) => summary.id.as_ref(),
            Self::Id(id) => Some(id),
        }
    }

    /// The referenced document's name, if it was populated.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Populated(summary) => summary.name.as_deref(),
            Self::Id(_) => None,
        }
    }

    /// Id and non-empty name, or `None` when the reference is unresolved.
    #[must_use]
    pub fn resolved(&self) -> Option<(&I, &str)> {
        let name = self.name().filter(|name| !name.is_empty())?;
        Some((self.id()?, name))
    }
}

impl<I> From<I> for Ref<I> {
    fn from(id: I) -> Self {
        Self::Id(id)
    }
}
