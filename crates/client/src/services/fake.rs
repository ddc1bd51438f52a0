//! In-memory implementation of the API traits for workflow tests.

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use bazaryo_core::forms::{LoginRequest, ProfileUpdate, RegistrationRequest};
use bazaryo_core::{
    Cart, CartLineItem, CartProduct, DashboardStats, Email, Order, OrderId, OrderStatus, Product,
    ProductDraft, ProductId, ProductPatch, ProductQuery, Ref, RefSummary, Shop, ShopId, ShopPatch,
    User, UserFilter, UserId, UserRole, aggregate,
};
use tokio::sync::oneshot;

use crate::api::{AdminApi, AuthApi, CartApi, OrderApi, ProductApi, ShopApi, UserApi};
use crate::error::ApiError;

#[derive(Default)]
pub(crate) struct State {
    pub cart: Cart,
    pub orders: Vec<Order>,
    pub users: Vec<User>,
    pub shops: Vec<Shop>,
    pub stats: DashboardStats,
    pub me: Option<User>,
    /// Every call, by trait method name, in order.
    pub calls: Vec<&'static str>,
    /// Methods that fail with the given status and message.
    pub failures: HashMap<&'static str, (u16, Option<String>)>,
    next_id: u32,
}

impl State {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}{:08}", self.next_id)
    }

    fn product(&self, id: &ProductId) -> Option<(&Shop, &Product)> {
        self.shops.iter().find_map(|shop| {
            shop.products
                .iter()
                .find(|product| &product.id == id)
                .map(|product| (shop, product))
        })
    }

    fn product_mut(&mut self, id: &ProductId) -> Option<&mut Product> {
        self.shops
            .iter_mut()
            .flat_map(|shop| shop.products.iter_mut())
            .find(|product| &product.id == id)
    }
}

/// Shared in-memory backend. Clones share state.
#[derive(Clone, Default)]
pub(crate) struct InMemoryApi {
    state: Arc<Mutex<State>>,
    agents_gate: Arc<Mutex<Option<oneshot::Receiver<()>>>>,
}

impl InMemoryApi {
    pub fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn fail(&self, method: &'static str, status: u16, message: Option<&str>) {
        self.state()
            .failures
            .insert(method, (status, message.map(str::to_string)));
    }

    pub fn succeed(&self, method: &'static str) {
        self.state().failures.remove(method);
    }

    pub fn calls(&self, method: &str) -> usize {
        self.state().calls.iter().filter(|call| **call == method).count()
    }

    /// Hold the next `list_users` call until the returned sender fires.
    pub fn gate_agents(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.agents_gate.lock().unwrap() = Some(rx);
        tx
    }

    fn call(&self, method: &'static str) -> Result<MutexGuard<'_, State>, ApiError> {
        let mut state = self.state();
        state.calls.push(method);
        if let Some((status, message)) = state.failures.get(method).cloned() {
            return Err(ApiError::Rejected { status, message });
        }
        Ok(state)
    }

    fn add_line(state: &mut State, id: &ProductId, quantity: u32) -> Result<(), ApiError> {
        if let Some(line) = state
            .cart
            .items
            .iter_mut()
            .find(|line| line.product_id() == Some(id))
        {
            line.quantity += quantity;
            return Ok(());
        }
        let (shop, product) = state.product(id).ok_or(ApiError::NotFound(None))?;
        let line = CartLineItem {
            product: Some(cart_product(shop, product)),
            quantity,
        };
        state.cart.items.push(line);
        Ok(())
    }
}

// =============================================================================
// Fixtures
// =============================================================================

pub(crate) fn shop(id: &str, name: &str, products: Vec<Product>) -> Shop {
    Shop {
        id: ShopId::new(id),
        name: name.to_string(),
        category: "Grocery".to_string(),
        pincode: "110016".to_string(),
        is_verified: true,
        owner: None,
        products,
        logo_url: None,
    }
}

pub(crate) fn product(id: &str, shop: &str, rupees: i64, quantity_available: u32) -> Product {
    Product {
        id: ProductId::new(id),
        name: id.to_string(),
        description: String::new(),
        price: bazaryo_core::Money::from_rupees(rupees),
        category: "Fruit".to_string(),
        quantity_available,
        image_url: None,
        shop: Some(Ref::Id(ShopId::new(shop))),
    }
}

pub(crate) fn cart_product(shop: &Shop, product: &Product) -> CartProduct {
    CartProduct {
        id: product.id.clone(),
        name: product.name.clone(),
        price: product.price,
        image_url: None,
        shop: Some(Ref::Populated(RefSummary {
            id: Some(shop.id.clone()),
            name: Some(shop.name.clone()),
        })),
    }
}

pub(crate) fn user(id: &str, role: UserRole) -> User {
    User {
        id: UserId::new(id),
        name: format!("User {id}"),
        email: Email::parse(&format!("{id}@bazaryo.in")).unwrap(),
        role,
        shop: None,
        is_available: (role == UserRole::DeliveryAgent).then_some(true),
        address: None,
    }
}

pub(crate) fn order(id: &str, status: OrderStatus) -> Order {
    Order {
        id: OrderId::new(id),
        customer: None,
        shop: None,
        delivery_agent: None,
        items: Vec::new(),
        total_amount: bazaryo_core::Money::ZERO,
        status,
        created_at: None,
    }
}

// =============================================================================
// Trait implementations
// =============================================================================

impl AuthApi for InMemoryApi {
    async fn login(&self, request: &LoginRequest) -> Result<User, ApiError> {
        let mut state = self.call("login")?;
        let user = state
            .users
            .iter()
            .find(|user| user.email == request.email)
            .cloned()
            .ok_or_else(|| ApiError::Unauthorized(Some("Invalid email or password".to_string())))?;
        state.me = Some(user.clone());
        Ok(user)
    }

    async fn register(&self, request: &RegistrationRequest) -> Result<User, ApiError> {
        let mut state = self.call("register")?;
        let id = state.next_id("u");
        let user = User {
            id: UserId::new(id),
            name: request.name.clone(),
            email: request.email.clone(),
            role: request.role,
            shop: None,
            is_available: None,
            address: None,
        };
        state.users.push(user.clone());
        state.me = Some(user.clone());
        Ok(user)
    }

    async fn logout(&self) {
        self.state().me = None;
    }
}

impl UserApi for InMemoryApi {
    async fn current_user(&self) -> Result<User, ApiError> {
        let state = self.call("current_user")?;
        state.me.clone().ok_or(ApiError::NoToken)
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> Result<User, ApiError> {
        let mut state = self.call("update_profile")?;
        let me = state.me.as_mut().ok_or(ApiError::NoToken)?;
        me.name.clone_from(&update.name);
        me.address = Some(update.address.clone());
        Ok(me.clone())
    }

    async fn list_users(&self, filter: &UserFilter) -> Result<Vec<User>, ApiError> {
        let gate = self.agents_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        let state = self.call("list_users")?;
        Ok(state
            .users
            .iter()
            .filter(|user| filter.role.is_none_or(|role| user.role == role))
            .filter(|user| {
                filter
                    .is_available
                    .is_none_or(|available| user.is_available == Some(available))
            })
            .cloned()
            .collect())
    }

    async fn delete_user(&self, id: &UserId) -> Result<(), ApiError> {
        let mut state = self.call("delete_user")?;
        let before = state.users.len();
        state.users.retain(|user| &user.id != id);
        if state.users.len() == before {
            return Err(ApiError::NotFound(Some("User not found".to_string())));
        }
        Ok(())
    }
}

impl ShopApi for InMemoryApi {
    async fn list_shops(&self) -> Result<Vec<Shop>, ApiError> {
        let state = self.call("list_shops")?;
        Ok(state.shops.clone())
    }

    async fn get_shop(&self, id: &ShopId) -> Result<Shop, ApiError> {
        let state = self.call("get_shop")?;
        state
            .shops
            .iter()
            .find(|shop| &shop.id == id)
            .cloned()
            .ok_or(ApiError::NotFound(Some("Shop not found".to_string())))
    }

    async fn update_shop(&self, id: &ShopId, patch: &ShopPatch) -> Result<Shop, ApiError> {
        let mut state = self.call("update_shop")?;
        let shop = state
            .shops
            .iter_mut()
            .find(|shop| &shop.id == id)
            .ok_or(ApiError::NotFound(None))?;
        if let Some(is_verified) = patch.is_verified {
            shop.is_verified = is_verified;
        }
        if let Some(name) = &patch.name {
            shop.name.clone_from(name);
        }
        Ok(shop.clone())
    }
}

impl ProductApi for InMemoryApi {
    async fn list_products(&self, query: &ProductQuery) -> Result<Vec<Product>, ApiError> {
        let state = self.call("list_products")?;
        Ok(state
            .shops
            .iter()
            .filter(|shop| query.shop.as_ref().is_none_or(|id| &shop.id == id))
            .flat_map(|shop| shop.products.clone())
            .collect())
    }

    async fn create_product(&self, draft: &ProductDraft) -> Result<Product, ApiError> {
        let mut state = self.call("create_product")?;
        let id = state.next_id("p");
        let me_shop = state.me.as_ref().and_then(|me| me.shop.clone());
        let shop_id = me_shop.ok_or(ApiError::Rejected {
            status: 403,
            message: Some("Not a shopkeeper".to_string()),
        })?;
        let product = Product {
            id: ProductId::new(id),
            name: draft.name.clone(),
            description: draft.description.clone(),
            price: draft.price,
            category: draft.category.clone(),
            quantity_available: draft.quantity_available,
            image_url: draft.image_url.clone(),
            shop: Some(Ref::Id(shop_id.clone())),
        };
        let shop = state
            .shops
            .iter_mut()
            .find(|shop| shop.id == shop_id)
            .ok_or(ApiError::NotFound(None))?;
        shop.products.push(product.clone());
        Ok(product)
    }

    async fn update_product(
        &self,
        id: &ProductId,
        patch: &ProductPatch,
    ) -> Result<Product, ApiError> {
        let mut state = self.call("update_product")?;
        let product = state.product_mut(id).ok_or(ApiError::NotFound(None))?;
        if let Some(quantity) = patch.quantity_available {
            product.quantity_available = quantity;
        }
        if let Some(price) = patch.price {
            product.price = price;
        }
        if let Some(name) = &patch.name {
            product.name.clone_from(name);
        }
        Ok(product.clone())
    }

    async fn delete_product(&self, id: &ProductId) -> Result<(), ApiError> {
        let mut state = self.call("delete_product")?;
        for shop in &mut state.shops {
            shop.products.retain(|product| &product.id != id);
        }
        Ok(())
    }
}

impl CartApi for InMemoryApi {
    async fn get_cart(&self) -> Result<Cart, ApiError> {
        let state = self.call("get_cart")?;
        Ok(state.cart.clone())
    }

    async fn add_to_cart(&self, product: &ProductId, quantity: u32) -> Result<Cart, ApiError> {
        let mut state = self.call("add_to_cart")?;
        Self::add_line(&mut state, product, quantity)?;
        Ok(state.cart.clone())
    }

    async fn update_cart_item(&self, product: &ProductId, quantity: u32) -> Result<Cart, ApiError> {
        let mut state = self.call("update_cart_item")?;
        let line = state
            .cart
            .items
            .iter_mut()
            .find(|line| line.product_id() == Some(product))
            .ok_or(ApiError::NotFound(Some("Item not in cart".to_string())))?;
        line.quantity = quantity;
        Ok(state.cart.clone())
    }

    async fn remove_from_cart(&self, product: &ProductId) -> Result<Cart, ApiError> {
        let mut state = self.call("remove_from_cart")?;
        state
            .cart
            .items
            .retain(|line| line.product_id() != Some(product));
        Ok(state.cart.clone())
    }
}

impl OrderApi for InMemoryApi {
    async fn create_orders_from_cart(&self) -> Result<Vec<Order>, ApiError> {
        let mut state = self.call("create_orders_from_cart")?;
        let summary = aggregate(&state.cart.items);
        if summary.is_empty() {
            return Err(ApiError::Rejected {
                status: 400,
                message: Some("Cart is empty".to_string()),
            });
        }

        let mut created = Vec::new();
        for group in summary.groups {
            let id = state.next_id("o");
            let mut placed = order(&id, OrderStatus::PendingApproval);
            placed.shop = Some(Ref::Populated(RefSummary {
                id: Some(group.shop_id),
                name: Some(group.shop_name),
            }));
            placed.total_amount = group.subtotal;
            created.push(placed);
        }
        state.orders.extend(created.iter().cloned());
        state.cart.items.clear();
        Ok(created)
    }

    async fn my_orders(&self) -> Result<Vec<Order>, ApiError> {
        let state = self.call("my_orders")?;
        Ok(state.orders.clone())
    }

    async fn all_orders(&self) -> Result<Vec<Order>, ApiError> {
        let state = self.call("all_orders")?;
        Ok(state.orders.clone())
    }

    async fn assign_agent(&self, order: &OrderId, agent: &UserId) -> Result<Order, ApiError> {
        let mut state = self.call("assign_agent")?;
        let order = state
            .orders
            .iter_mut()
            .find(|candidate| &candidate.id == order)
            .ok_or(ApiError::NotFound(Some("Order not found".to_string())))?;
        order.delivery_agent = Some(Ref::Id(agent.clone()));
        order.status = OrderStatus::OutForDelivery;
        Ok(order.clone())
    }
}

impl AdminApi for InMemoryApi {
    async fn dashboard_stats(&self) -> Result<DashboardStats, ApiError> {
        let state = self.call("dashboard_stats")?;
        Ok(state.stats.clone())
    }
}
