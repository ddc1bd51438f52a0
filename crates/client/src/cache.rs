//! Cache types for catalog responses.

use bazaryo_core::{Product, ProductQuery, Shop, ShopId};

/// Cache key for shops and product listings.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Shops,
    Shop(ShopId),
    Products(ProductQuery),
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Shops(Vec<Shop>),
    Shop(Box<Shop>),
    Products(Vec<Product>),
}
