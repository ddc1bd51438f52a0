//! Admin dashboard statistics.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::Money;

/// Raw `/admin/stats` payload.
///
/// `order_stats` is keyed by status (plus an optional `total`) and
/// `users_by_role` by role. Unknown keys are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    #[serde(default)]
    pub total_users: u64,
    #[serde(default)]
    pub total_shops: u64,
    #[serde(default)]
    pub total_revenue: Money,
    #[serde(default)]
    pub order_stats: BTreeMap<String, u64>,
    #[serde(default)]
    pub users_by_role: BTreeMap<String, u64>,
}

impl DashboardStats {
    /// Key under which the backend reports the overall order count.
    pub const TOTAL_KEY: &'static str = "total";

    /// Overall order count: the `total` entry, or the sum of the per-status
    /// counts when the backend omits it.
    #[must_use]
    pub fn order_total(&self) -> u64 {
        self.order_stats.get(Self::TOTAL_KEY).copied().unwrap_or_else(|| {
            self.order_stats
                .values()
                .fold(0_u64, |acc, count| acc.saturating_add(*count))
        })
    }
}
