//! Chart-ready reshaping of admin statistics, plus list tallies.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::{DashboardStats, Order, Shop};
use crate::types::{OrderStatus, UserRole};

/// Turn a wire key into a chart label.
///
/// Underscores become spaces and the first letter of every word is
/// upper-cased; all other characters are left as they are, so
/// `OUT_FOR_DELIVERY` stays `OUT FOR DELIVERY` and `delivery_agent` becomes
/// `Delivery Agent`.
#[must_use]
pub fn humanize_key(key: &str) -> String {
    let mut label = String::with_capacity(key.len());
    let mut at_word_start = true;
    for ch in key.chars() {
        let ch = if ch == '_' { ' ' } else { ch };
        if at_word_start && ch.is_alphanumeric() {
            label.extend(ch.to_uppercase());
        } else {
            label.push(ch);
        }
        at_word_start = !ch.is_alphanumeric();
    }
    label
}

/// One bar of the order status chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartPoint {
    pub key: String,
    pub label: String,
    pub count: u64,
}

/// One slice of the users-by-role chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SharePoint {
    pub key: String,
    pub label: String,
    pub count: u64,
    /// Share of all users, rounded to a whole percent.
    pub percent: u64,
}

/// The four headline cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Headline {
    pub users: u64,
    pub shops: u64,
    pub orders: u64,
    /// Revenue formatted for display (`₹1234.00`).
    pub revenue: String,
}

/// Everything the admin dashboard renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub headline: Headline,
    pub orders_by_status: Vec<ChartPoint>,
    pub users_by_role: Vec<SharePoint>,
}

impl DashboardView {
    #[must_use]
    pub fn from_stats(stats: &DashboardStats) -> Self {
        let status_order: Vec<&str> = OrderStatus::ALL.iter().map(OrderStatus::as_str).collect();
        let role_order: Vec<&str> = UserRole::ALL.iter().map(UserRole::as_str).collect();

        let orders_by_status = canonical_entries(&stats.order_stats, &status_order)
            .into_iter()
            .filter(|(key, _)| *key != DashboardStats::TOTAL_KEY)
            .map(|(key, count)| ChartPoint {
                key: key.to_owned(),
                label: humanize_key(key),
                count,
            })
            .collect();

        let role_entries = canonical_entries(&stats.users_by_role, &role_order);
        let user_total = role_entries
            .iter()
            .fold(0_u64, |acc, (_, count)| acc.saturating_add(*count));
        let users_by_role = role_entries
            .into_iter()
            .map(|(key, count)| SharePoint {
                key: key.to_owned(),
                label: humanize_key(key),
                count,
                percent: rounded_percent(count, user_total),
            })
            .collect();

        Self {
            headline: Headline {
                users: stats.total_users,
                shops: stats.total_shops,
                orders: stats.order_total(),
                revenue: stats.total_revenue.to_string(),
            },
            orders_by_status,
            users_by_role,
        }
    }
}

/// Entries whose keys appear in `canonical` first, in that order, then every
/// other key in sorted order.
fn canonical_entries<'a>(
    map: &'a BTreeMap<String, u64>,
    canonical: &[&str],
) -> Vec<(&'a str, u64)> {
    let known = canonical
        .iter()
        .filter_map(|key| map.get_key_value(*key))
        .map(|(key, count)| (key.as_str(), *count));
    let unknown = map
        .iter()
        .filter(|(key, _)| !canonical.iter().any(|known| *known == key.as_str()))
        .map(|(key, count)| (key.as_str(), *count));
    known.chain(unknown).collect()
}

fn rounded_percent(part: u64, whole: u64) -> u64 {
    if whole == 0 {
        return 0;
    }
    let (part, whole) = (u128::from(part), u128::from(whole));
    let percent = (part * 200 + whole) / (whole * 2);
    u64::try_from(percent).unwrap_or(u64::MAX)
}

/// Order counts shown above the admin order table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderTally {
    pub delivered: usize,
    pub processing: usize,
    pub total: usize,
}

impl OrderTally {
    #[must_use]
    pub fn from_orders(orders: &[Order]) -> Self {
        let count = |status| orders.iter().filter(|order| order.status == status).count();
        Self {
            delivered: count(OrderStatus::Delivered),
            processing: count(OrderStatus::Processing),
            total: orders.len(),
        }
    }
}

/// Shop counts shown above the admin shop table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopTally {
    pub verified: usize,
    pub unverified: usize,
    pub total: usize,
}

impl ShopTally {
    #[must_use]
    pub fn from_shops(shops: &[Shop]) -> Self {
        let verified = shops.iter().filter(|shop| shop.is_verified).count();
        Self {
            verified,
            unverified: shops.len() - verified,
            total: shops.len(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{Money, OrderId, ShopId};

    #[test]
    fn test_humanize_key() {
        assert_eq!(humanize_key("OUT_FOR_DELIVERY"), "OUT FOR DELIVERY");
        assert_eq!(humanize_key("delivery_agent"), "Delivery Agent");
        assert_eq!(humanize_key("pending"), "Pending");
        assert_eq!(humanize_key("customer"), "Customer");
        assert_eq!(humanize_key(""), "");
    }

    fn stats() -> DashboardStats {
        serde_json::from_value(serde_json::json!({
            "totalUsers": 10,
            "totalShops": 3,
            "totalRevenue": 1234.5,
            "orderStats": {
                "total": 12,
                "DELIVERED": 5,
                "PROCESSING": 4,
                "PENDING_APPROVAL": 2,
                "ON_HOLD": 1
            },
            "usersByRole": {
                "customer": 6,
                "delivery_agent": 1,
                "shopkeeper": 3
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_order_chart_skips_total_and_uses_canonical_order() {
        let view = DashboardView::from_stats(&stats());

        let labels: Vec<&str> = view
            .orders_by_status
            .iter()
            .map(|point| point.label.as_str())
            .collect();
        assert_eq!(labels, ["PENDING APPROVAL", "PROCESSING", "DELIVERED", "ON HOLD"]);
        assert_eq!(view.orders_by_status[2].count, 5);
    }

    #[test]
    fn test_user_chart_shares() {
        let view = DashboardView::from_stats(&stats());

        let slices: Vec<(&str, u64)> = view
            .users_by_role
            .iter()
            .map(|point| (point.label.as_str(), point.percent))
            .collect();
        assert_eq!(
            slices,
            [("Customer", 60), ("Shopkeeper", 30), ("Delivery Agent", 10)]
        );
    }

    #[test]
    fn test_headline() {
        let view = DashboardView::from_stats(&stats());
        assert_eq!(
            view.headline,
            Headline {
                users: 10,
                shops: 3,
                orders: 12,
                revenue: "₹1234.50".to_string(),
            }
        );
    }

    #[test]
    fn test_empty_stats() {
        let view = DashboardView::from_stats(&DashboardStats::default());
        assert!(view.orders_by_status.is_empty());
        assert!(view.users_by_role.is_empty());
        assert_eq!(view.headline.revenue, Money::ZERO.to_string());
    }

    #[test]
    fn test_rounded_percent() {
        assert_eq!(rounded_percent(1, 3), 33);
        assert_eq!(rounded_percent(2, 3), 67);
        assert_eq!(rounded_percent(5, 0), 0);
    }

    fn order(id: &str, status: OrderStatus) -> Order {
        Order {
            id: OrderId::new(id),
            customer: None,
            shop: None,
            delivery_agent: None,
            items: Vec::new(),
            total_amount: Money::ZERO,
            status,
            created_at: None,
        }
    }

    #[test]
    fn test_order_tally() {
        let orders = [
            order("1", OrderStatus::Delivered),
            order("2", OrderStatus::Processing),
            order("3", OrderStatus::Processing),
            order("4", OrderStatus::Cancelled),
        ];
        assert_eq!(
            OrderTally::from_orders(&orders),
            OrderTally {
                delivered: 1,
                processing: 2,
                total: 4,
            }
        );
    }

    #[test]
    fn test_shop_tally() {
        let shop = |id: &str, is_verified| Shop {
            id: ShopId::new(id),
            name: id.to_string(),
            category: String::new(),
            pincode: String::new(),
            is_verified,
            owner: None,
            products: Vec::new(),
            logo_url: None,
        };
        let shops = [shop("a", true), shop("b", false), shop("c", false)];
        assert_eq!(
            ShopTally::from_shops(&shops),
            ShopTally {
                verified: 1,
                unverified: 2,
                total: 3,
            }
        );
    }
}
