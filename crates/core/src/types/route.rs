//! Navigation targets produced by workflows.
//!
//! Workflows never navigate themselves; they return a [`Route`] and the
//! front end decides how to get there.

use serde::{Deserialize, Serialize};

/// A place in the storefront a workflow wants the user to go next.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Route {
    Home,
    Login,
    Profile,
    Products,
    MyOrders,
    AdminDashboard,
    ShopkeeperDashboard,
    DeliveryDashboard,
    /// Any other path, typically the page the user was bounced from.
    Path(String),
}

impl Route {
    /// The URL path for this route.
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::Home => "/",
            Self::Login => "/login",
            Self::Profile => "/profile",
            Self::Products => "/products",
            Self::MyOrders => "/my-orders",
            Self::AdminDashboard => "/admin/dashboard",
            Self::ShopkeeperDashboard => "/shopkeeper/dashboard",
            Self::DeliveryDashboard => "/delivery/dashboard",
            Self::Path(path) => path,
        }
    }

    /// Parse a URL path, mapping known pages to their variant.
    #[must_use]
    pub fn from_path(path: &str) -> Self {
        [
            Self::Home,
            Self::Login,
            Self::Profile,
            Self::Products,
            Self::MyOrders,
            Self::AdminDashboard,
            Self::ShopkeeperDashboard,
            Self::DeliveryDashboard,
        ]
        .into_iter()
        .find(|route| route.path() == path)
        .unwrap_or_else(|| Self::Path(path.to_owned()))
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}
