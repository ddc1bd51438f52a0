//! Integration tests for Bazaryo.
//!
//! The tests in `tests/` drive [`bazaryo_client::BazaryoClient`] over real
//! HTTP against [`FakeBackend`], an in-process `axum` server that speaks the
//! backend's REST dialect: `_id` keys, populated references, bearer tokens
//! and `{ "message": ... }` error bodies.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p bazaryo-integration-tests
//! ```
//!
//! No database or network access is needed; every test starts its own
//! backend on an ephemeral port.
//!
//! # Failure injection
//!
//! Every route has a key such as `orders.from_cart`. [`FakeBackend::fail`]
//! makes that route answer with the given status until
//! [`FakeBackend::recover`] is called, and [`FakeBackend::hits`] counts the
//! requests the route received.

use std::collections::{BTreeMap, HashMap};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::extract::{Path, Query, State};
use axum::http::header::{AUTHORIZATION, RETRY_AFTER};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use bazaryo_client::{BazaryoClient, ClientConfig};
use bazaryo_core::{
    Address, Cart, CartLineItem, CartProduct, DashboardStats, Email, Money, Order, OrderId,
    OrderItem, OrderStatus, Product, ProductDraft, ProductId, ProductPatch, ProductQuery, Ref,
    RefSummary, Shop, ShopId, ShopPatch, ShopRef, User, UserId, UserRef, UserRole, aggregate,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::task::JoinHandle;

type Shared = Arc<Mutex<Store>>;
type Reply<T> = Result<Json<T>, Failure>;

// ============================================================================
// Failures
// ============================================================================

/// An error response with a `{ "message": ... }` body.
#[derive(Debug, Clone)]
pub struct Failure {
    status: StatusCode,
    message: Option<String>,
    retry_after: Option<u64>,
}

impl Failure {
    /// A failure with `status` and an optional message.
    #[must_use]
    pub fn new(status: u16, message: Option<&str>) -> Self {
        Self {
            status: StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            message: message.map(str::to_owned),
            retry_after: None,
        }
    }

    /// A 429 with a `Retry-After` header.
    #[must_use]
    pub const fn rate_limited(retry_after: u64) -> Self {
        Self {
            status: StatusCode::TOO_MANY_REQUESTS,
            message: None,
            retry_after: Some(retry_after),
        }
    }

    fn bad_request(message: &str) -> Self {
        Self::new(400, Some(message))
    }

    fn unauthorized(message: &str) -> Self {
        Self::new(401, Some(message))
    }

    fn forbidden(message: &str) -> Self {
        Self::new(403, Some(message))
    }

    fn not_found(message: &str) -> Self {
        Self::new(404, Some(message))
    }
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        let body = self
            .message
            .map_or_else(|| json!({}), |message| json!({ "message": message }));
        let mut response = (self.status, Json(body)).into_response();
        if let Some(seconds) = self.retry_after {
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(seconds));
        }
        response
    }
}

// ============================================================================
// Store
// ============================================================================

/// Everything the fake backend knows.
#[derive(Default)]
pub struct Store {
    pub users: Vec<User>,
    passwords: HashMap<UserId, String>,
    tokens: HashMap<String, UserId>,
    /// Shops without their products; see [`Store::products`].
    pub shops: Vec<Shop>,
    pub products: Vec<Product>,
    pub carts: HashMap<UserId, Vec<(ProductId, u32)>>,
    pub orders: Vec<Order>,
    hits: HashMap<String, usize>,
    failures: HashMap<String, Failure>,
    next_id: u64,
}

impl Store {
    /// A 24 hex digit id, like the backend's object ids.
    fn next_id(&mut self) -> String {
        self.next_id += 1;
        format!("{:024x}", self.next_id)
    }

    /// Count a request to `route` and answer with its injected failure.
    fn enter(&mut self, route: &str) -> Result<(), Failure> {
        *self.hits.entry(route.to_owned()).or_default() += 1;
        self.failures.get(route).cloned().map_or(Ok(()), Err)
    }

    fn authed(&self, headers: &HeaderMap) -> Result<User, Failure> {
        let token = headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(|| Failure::unauthorized("Not authorized, no token"))?;
        let id = self
            .tokens
            .get(token)
            .ok_or_else(|| Failure::unauthorized("Not authorized, token failed"))?;
        self.user(id)
            .cloned()
            .ok_or_else(|| Failure::unauthorized("User not found"))
    }

    fn authed_as(&self, headers: &HeaderMap, role: UserRole) -> Result<User, Failure> {
        let user = self.authed(headers)?;
        if user.role == role {
            Ok(user)
        } else {
            Err(Failure::forbidden(&format!("Not authorized as {role}")))
        }
    }

    fn user(&self, id: &UserId) -> Option<&User> {
        self.users.iter().find(|user| &user.id == id)
    }

    fn issue_token(&mut self, user: &UserId) -> String {
        let token = format!("token-{}", self.next_id());
        self.tokens.insert(token.clone(), user.clone());
        token
    }

    fn shop_ref(&self, id: &ShopId) -> ShopRef {
        Ref::Populated(RefSummary {
            id: Some(id.clone()),
            name: self
                .shops
                .iter()
                .find(|shop| &shop.id == id)
                .map(|shop| shop.name.clone()),
        })
    }

    fn user_ref(&self, id: &UserId) -> UserRef {
        Ref::Populated(RefSummary {
            id: Some(id.clone()),
            name: self.user(id).map(|user| user.name.clone()),
        })
    }

    /// A product as listings return it, with its shop populated.
    fn populated(&self, product: &Product) -> Product {
        let mut product = product.clone();
        product.shop = product
            .shop
            .as_ref()
            .and_then(Ref::id)
            .map(|shop| self.shop_ref(shop));
        product
    }

    fn cart_of(&self, user: &UserId) -> Cart {
        let items = self
            .carts
            .get(user)
            .into_iter()
            .flatten()
            .map(|(id, quantity)| CartLineItem {
                product: self
                    .products
                    .iter()
                    .find(|product| &product.id == id)
                    .map(|product| CartProduct {
                        id: product.id.clone(),
                        name: product.name.clone(),
                        price: product.price,
                        image_url: product.image_url.clone(),
                        shop: self.populated(product).shop,
                    }),
                quantity: *quantity,
            })
            .collect();
        Cart { items }
    }

    fn product_mut(&mut self, id: &ProductId) -> Result<&mut Product, Failure> {
        self.products
            .iter_mut()
            .find(|product| &product.id == id)
            .ok_or_else(|| Failure::not_found("Product not found"))
    }

    /// The product, if `keeper` owns the shop it belongs to.
    fn owned_product_mut(
        &mut self,
        keeper: &User,
        id: &ProductId,
    ) -> Result<&mut Product, Failure> {
        let product = self.product_mut(id)?;
        let owner_shop = product.shop.as_ref().and_then(Ref::id);
        if keeper.shop.is_some() && owner_shop == keeper.shop.as_ref() {
            Ok(product)
        } else {
            Err(Failure::forbidden("Not your product"))
        }
    }

    fn stats(&self) -> DashboardStats {
        let mut order_stats = BTreeMap::new();
        for order in &self.orders {
            *order_stats.entry(order.status.as_str().to_owned()).or_insert(0) += 1;
        }
        order_stats.insert(DashboardStats::TOTAL_KEY.to_owned(), self.orders.len() as u64);

        let mut users_by_role = BTreeMap::new();
        for user in &self.users {
            *users_by_role.entry(user.role.as_str().to_owned()).or_insert(0) += 1;
        }

        DashboardStats {
            total_users: self.users.len() as u64,
            total_shops: self.shops.len() as u64,
            total_revenue: self
                .orders
                .iter()
                .filter(|order| order.status == OrderStatus::Delivered)
                .map(|order| order.total_amount)
                .sum(),
            order_stats,
            users_by_role,
        }
    }
}

// ============================================================================
// Server
// ============================================================================

/// An in-process backend bound to an ephemeral local port.
pub struct FakeBackend {
    addr: SocketAddr,
    store: Shared,
    server: JoinHandle<()>,
}

impl FakeBackend {
    /// Bind and start serving.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn start() -> Self {
        let store = Shared::default();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake backend");
        let addr = listener.local_addr().expect("Fake backend has no address");

        let app = router(Arc::clone(&store));
        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Self {
            addr,
            store,
            server,
        }
    }

    /// The API base URL, e.g. `http://127.0.0.1:40123/api`.
    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    /// A client with no token.
    ///
    /// # Panics
    ///
    /// Panics if the client cannot be built.
    #[must_use]
    pub fn client(&self) -> BazaryoClient {
        let config = ClientConfig::new(&self.url()).expect("Invalid fake backend URL");
        BazaryoClient::new(&config).expect("Failed to build client")
    }

    /// A client already carrying `user`'s token.
    pub async fn client_for(&self, user: &User) -> BazaryoClient {
        let token = self.store().issue_token(&user.id);
        let client = self.client();
        client.set_token(token.into()).await;
        client
    }

    /// Direct access to the backend's data.
    ///
    /// # Panics
    ///
    /// Panics if a handler panicked while holding the lock.
    pub fn store(&self) -> MutexGuard<'_, Store> {
        self.store.lock().expect("Fake backend store poisoned")
    }

    /// Answer every request to `route` with `failure`.
    pub fn fail(&self, route: &str, failure: Failure) {
        self.store().failures.insert(route.to_owned(), failure);
    }

    /// Stop failing `route`.
    pub fn recover(&self, route: &str) {
        self.store().failures.remove(route);
    }

    /// Requests `route` has received.
    #[must_use]
    pub fn hits(&self, route: &str) -> usize {
        self.store().hits.get(route).copied().unwrap_or(0)
    }

    // ------------------------------------------------------------------------
    // Seeding
    // ------------------------------------------------------------------------

    /// # Panics
    ///
    /// Panics if `email` is not a valid address.
    pub fn seed_user(&self, name: &str, email: &str, password: &str, role: UserRole) -> User {
        let mut store = self.store();
        let user = User {
            id: UserId::new(store.next_id()),
            name: name.to_owned(),
            email: Email::parse(email).expect("Invalid seed email"),
            role,
            shop: None,
            is_available: (role == UserRole::DeliveryAgent).then_some(true),
            address: None,
        };
        store.passwords.insert(user.id.clone(), password.to_owned());
        store.users.push(user.clone());
        user
    }

    /// A verified shop owned by `owner`, linked back from the owner's account.
    pub fn seed_shop(&self, owner: &User, name: &str) -> Shop {
        let mut store = self.store();
        let shop = Shop {
            id: ShopId::new(store.next_id()),
            name: name.to_owned(),
            category: "Grocery".to_owned(),
            pincode: "110016".to_owned(),
            is_verified: true,
            owner: Some(Ref::Id(owner.id.clone())),
            products: Vec::new(),
            logo_url: None,
        };
        if let Some(user) = store.users.iter_mut().find(|user| user.id == owner.id) {
            user.shop = Some(shop.id.clone());
        }
        store.shops.push(shop.clone());
        shop
    }

    pub fn seed_product(&self, shop: &Shop, name: &str, price: Money, stock: u32) -> Product {
        let mut store = self.store();
        let product = Product {
            id: ProductId::new(store.next_id()),
            name: name.to_owned(),
            description: String::new(),
            price,
            category: "Fruit".to_owned(),
            quantity_available: stock,
            image_url: None,
            shop: Some(Ref::Id(shop.id.clone())),
        };
        store.products.push(product.clone());
        product
    }

    pub fn seed_order(&self, customer: &User, shop: &Shop, status: OrderStatus) -> Order {
        let mut store = self.store();
        let order = Order {
            id: OrderId::new(store.next_id()),
            customer: Some(store.user_ref(&customer.id)),
            shop: Some(store.shop_ref(&shop.id)),
            delivery_agent: None,
            items: Vec::new(),
            total_amount: Money::from_rupees(100),
            status,
            created_at: None,
        };
        store.orders.push(order.clone());
        order
    }
}

impl Drop for FakeBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

fn router(store: Shared) -> Router {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/register", post(register))
        .route("/api/users/me", get(me).put(update_me))
        .route("/api/users", get(list_users))
        .route("/api/users/{id}", axum::routing::delete(delete_user))
        .route("/api/shops", get(list_shops))
        .route("/api/shops/{id}", get(get_shop).put(update_shop))
        .route("/api/products", get(list_products).post(create_product))
        .route(
            "/api/products/{id}",
            put(update_product).delete(delete_product),
        )
        .route("/api/cart", get(get_cart).post(add_to_cart))
        .route("/api/cart/{id}", put(update_cart_item).delete(remove_from_cart))
        .route("/api/orders", get(all_orders))
        .route("/api/orders/from-cart", post(orders_from_cart))
        .route("/api/orders/my-orders", get(my_orders))
        .route("/api/orders/{id}/assign", put(assign_agent))
        .route("/api/admin/stats", get(admin_stats))
        .with_state(store)
}

fn lock(store: &Shared) -> MutexGuard<'_, Store> {
    store.lock().expect("Fake backend store poisoned")
}

// ============================================================================
// Auth and users
// ============================================================================

#[derive(Deserialize)]
struct LoginBody {
    email: String,
    password: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterBody {
    name: String,
    email: String,
    password: String,
    role: UserRole,
    shop_name: Option<String>,
    shop_category: Option<String>,
    pincode: Option<String>,
}

#[derive(Deserialize)]
struct ProfileBody {
    name: String,
    address: Address,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserQuery {
    role: Option<UserRole>,
    is_available: Option<bool>,
}

async fn login(State(store): State<Shared>, Json(body): Json<LoginBody>) -> Reply<Value> {
    let mut store = lock(&store);
    store.enter("auth.login")?;
    let user = store
        .users
        .iter()
        .find(|user| user.email.as_str() == body.email)
        .filter(|user| store.passwords.get(&user.id) == Some(&body.password))
        .cloned()
        .ok_or_else(|| Failure::unauthorized("Invalid email or password"))?;
    let token = store.issue_token(&user.id);
    Ok(Json(json!({ "token": token, "user": user })))
}

async fn register(State(store): State<Shared>, Json(body): Json<RegisterBody>) -> Reply<Value> {
    let mut store = lock(&store);
    store.enter("auth.register")?;
    let email = Email::parse(&body.email).map_err(|_| Failure::bad_request("Invalid email"))?;
    if store.users.iter().any(|user| user.email == email) {
        return Err(Failure::bad_request("User already exists"));
    }

    let mut user = User {
        id: UserId::new(store.next_id()),
        name: body.name,
        email,
        role: body.role,
        shop: None,
        is_available: (body.role == UserRole::DeliveryAgent).then_some(true),
        address: None,
    };
    if body.role == UserRole::Shopkeeper {
        let (Some(name), Some(category), Some(pincode)) =
            (body.shop_name, body.shop_category, body.pincode)
        else {
            return Err(Failure::bad_request("Shop details are required"));
        };
        let shop = Shop {
            id: ShopId::new(store.next_id()),
            name,
            category,
            pincode,
            is_verified: false,
            owner: Some(Ref::Id(user.id.clone())),
            products: Vec::new(),
            logo_url: None,
        };
        user.shop = Some(shop.id.clone());
        store.shops.push(shop);
    }

    store.passwords.insert(user.id.clone(), body.password);
    store.users.push(user.clone());
    let token = store.issue_token(&user.id);
    Ok(Json(json!({ "token": token, "user": user })))
}

async fn me(State(store): State<Shared>, headers: HeaderMap) -> Reply<User> {
    let mut store = lock(&store);
    store.enter("users.me")?;
    store.authed(&headers).map(Json)
}

async fn update_me(
    State(store): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<ProfileBody>,
) -> Reply<User> {
    let mut store = lock(&store);
    store.enter("users.update_me")?;
    let id = store.authed(&headers)?.id;
    let user = store
        .users
        .iter_mut()
        .find(|user| user.id == id)
        .ok_or_else(|| Failure::not_found("User not found"))?;
    user.name = body.name;
    user.address = Some(body.address);
    Ok(Json(user.clone()))
}

async fn list_users(
    State(store): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<UserQuery>,
) -> Reply<Vec<User>> {
    let mut store = lock(&store);
    store.enter("users.list")?;
    store.authed_as(&headers, UserRole::Admin)?;
    let users = store
        .users
        .iter()
        .filter(|user| query.role.is_none_or(|role| user.role == role))
        .filter(|user| {
            query
                .is_available
                .is_none_or(|available| user.is_available == Some(available))
        })
        .cloned()
        .collect();
    Ok(Json(users))
}

async fn delete_user(
    State(store): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<UserId>,
) -> Reply<Value> {
    let mut store = lock(&store);
    store.enter("users.delete")?;
    store.authed_as(&headers, UserRole::Admin)?;
    let before = store.users.len();
    store.users.retain(|user| user.id != id);
    if store.users.len() == before {
        return Err(Failure::not_found("User not found"));
    }
    Ok(Json(json!({ "message": "User removed" })))
}

// ============================================================================
// Shops and products
// ============================================================================

async fn list_shops(State(store): State<Shared>) -> Reply<Vec<Shop>> {
    let mut store = lock(&store);
    store.enter("shops.list")?;
    Ok(Json(store.shops.clone()))
}

async fn get_shop(State(store): State<Shared>, Path(id): Path<ShopId>) -> Reply<Shop> {
    let mut store = lock(&store);
    store.enter("shops.get")?;
    let mut shop = store
        .shops
        .iter()
        .find(|shop| shop.id == id)
        .cloned()
        .ok_or_else(|| Failure::not_found("Shop not found"))?;
    shop.products = store
        .products
        .iter()
        .filter(|product| product.shop.as_ref().and_then(Ref::id) == Some(&id))
        .cloned()
        .collect();
    Ok(Json(shop))
}

async fn update_shop(
    State(store): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<ShopId>,
    Json(patch): Json<ShopPatch>,
) -> Reply<Shop> {
    let mut store = lock(&store);
    store.enter("shops.update")?;
    store.authed_as(&headers, UserRole::Admin)?;
    let shop = store
        .shops
        .iter_mut()
        .find(|shop| shop.id == id)
        .ok_or_else(|| Failure::not_found("Shop not found"))?;
    if let Some(is_verified) = patch.is_verified {
        shop.is_verified = is_verified;
    }
    if let Some(name) = patch.name {
        shop.name = name;
    }
    if let Some(category) = patch.category {
        shop.category = category;
    }
    Ok(Json(shop.clone()))
}

async fn list_products(
    State(store): State<Shared>,
    Query(query): Query<ProductQuery>,
) -> Reply<Vec<Product>> {
    let mut store = lock(&store);
    store.enter("products.list")?;
    let search = query.search.as_deref().map(str::to_lowercase);
    let products = store
        .products
        .iter()
        .filter(|product| {
            search
                .as_deref()
                .is_none_or(|search| product.name.to_lowercase().contains(search))
        })
        .filter(|product| {
            query
                .category
                .as_deref()
                .is_none_or(|category| product.category == category)
        })
        .filter(|product| {
            query
                .shop
                .as_ref()
                .is_none_or(|shop| product.shop.as_ref().and_then(Ref::id) == Some(shop))
        })
        .map(|product| store.populated(product))
        .collect();
    Ok(Json(products))
}

async fn create_product(
    State(store): State<Shared>,
    headers: HeaderMap,
    Json(draft): Json<ProductDraft>,
) -> Reply<Product> {
    let mut store = lock(&store);
    store.enter("products.create")?;
    let keeper = store.authed_as(&headers, UserRole::Shopkeeper)?;
    let shop = keeper
        .shop
        .ok_or_else(|| Failure::bad_request("No shop linked to this account"))?;
    let product = Product {
        id: ProductId::new(store.next_id()),
        name: draft.name,
        description: draft.description,
        price: draft.price,
        category: draft.category,
        quantity_available: draft.quantity_available,
        image_url: draft.image_url,
        shop: Some(Ref::Id(shop)),
    };
    store.products.push(product.clone());
    Ok(Json(product))
}

async fn update_product(
    State(store): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<ProductId>,
    Json(patch): Json<ProductPatch>,
) -> Reply<Product> {
    let mut store = lock(&store);
    store.enter("products.update")?;
    let keeper = store.authed_as(&headers, UserRole::Shopkeeper)?;
    let product = store.owned_product_mut(&keeper, &id)?;
    if let Some(name) = patch.name {
        product.name = name;
    }
    if let Some(description) = patch.description {
        product.description = description;
    }
    if let Some(price) = patch.price {
        product.price = price;
    }
    if let Some(category) = patch.category {
        product.category = category;
    }
    if let Some(quantity) = patch.quantity_available {
        product.quantity_available = quantity;
    }
    Ok(Json(product.clone()))
}

async fn delete_product(
    State(store): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<ProductId>,
) -> Reply<Value> {
    let mut store = lock(&store);
    store.enter("products.delete")?;
    let keeper = store.authed_as(&headers, UserRole::Shopkeeper)?;
    store.owned_product_mut(&keeper, &id)?;
    store.products.retain(|product| product.id != id);
    Ok(Json(json!({ "message": "Product removed" })))
}

// ============================================================================
// Cart
// ============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddBody {
    product_id: ProductId,
    quantity: u32,
}

#[derive(Deserialize)]
struct QuantityBody {
    quantity: u32,
}

async fn get_cart(State(store): State<Shared>, headers: HeaderMap) -> Reply<Cart> {
    let mut store = lock(&store);
    store.enter("cart.get")?;
    let user = store.authed(&headers)?;
    Ok(Json(store.cart_of(&user.id)))
}

fn check_stock(store: &Store, id: &ProductId, quantity: u32) -> Result<(), Failure> {
    let product = store
        .products
        .iter()
        .find(|product| &product.id == id)
        .ok_or_else(|| Failure::not_found("Product not found"))?;
    if quantity > product.quantity_available {
        return Err(Failure::bad_request(&format!(
            "Only {} left in stock",
            product.quantity_available
        )));
    }
    Ok(())
}

async fn add_to_cart(
    State(store): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<AddBody>,
) -> Reply<Cart> {
    let mut store = lock(&store);
    store.enter("cart.add")?;
    let user = store.authed(&headers)?;
    let current = store
        .carts
        .get(&user.id)
        .and_then(|lines| lines.iter().find(|(id, _)| *id == body.product_id))
        .map_or(0, |(_, quantity)| *quantity);
    check_stock(&store, &body.product_id, current + body.quantity)?;

    let lines = store.carts.entry(user.id.clone()).or_default();
    match lines.iter_mut().find(|(id, _)| *id == body.product_id) {
        Some((_, quantity)) => *quantity += body.quantity,
        None => lines.push((body.product_id, body.quantity)),
    }
    Ok(Json(store.cart_of(&user.id)))
}

async fn update_cart_item(
    State(store): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<ProductId>,
    Json(body): Json<QuantityBody>,
) -> Reply<Cart> {
    let mut store = lock(&store);
    store.enter("cart.update")?;
    let user = store.authed(&headers)?;
    check_stock(&store, &id, body.quantity)?;
    let line = store
        .carts
        .get_mut(&user.id)
        .and_then(|lines| lines.iter_mut().find(|(line, _)| *line == id))
        .ok_or_else(|| Failure::not_found("Item not in cart"))?;
    line.1 = body.quantity;
    Ok(Json(store.cart_of(&user.id)))
}

async fn remove_from_cart(
    State(store): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<ProductId>,
) -> Reply<Cart> {
    let mut store = lock(&store);
    store.enter("cart.remove")?;
    let user = store.authed(&headers)?;
    if let Some(lines) = store.carts.get_mut(&user.id) {
        lines.retain(|(line, _)| *line != id);
    }
    Ok(Json(store.cart_of(&user.id)))
}

// ============================================================================
// Orders and stats
// ============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssignBody {
    agent_id: UserId,
}

async fn orders_from_cart(State(store): State<Shared>, headers: HeaderMap) -> Reply<Value> {
    let mut store = lock(&store);
    store.enter("orders.from_cart")?;
    let user = store.authed(&headers)?;
    let summary = aggregate(&store.cart_of(&user.id).items);
    if summary.is_empty() {
        return Err(Failure::bad_request("Cart is empty"));
    }

    let lines: Vec<(ProductId, u32)> = summary
        .groups
        .iter()
        .flat_map(|group| &group.items)
        .filter_map(|item| Some((item.product_id()?.clone(), item.quantity)))
        .collect();
    for (id, quantity) in &lines {
        check_stock(&store, id, *quantity)?;
    }
    for (id, quantity) in &lines {
        store.product_mut(id)?.quantity_available -= quantity;
    }

    let mut created = Vec::new();
    for group in summary.groups {
        let order = Order {
            id: OrderId::new(store.next_id()),
            customer: Some(store.user_ref(&user.id)),
            shop: Some(store.shop_ref(&group.shop_id)),
            delivery_agent: None,
            items: group
                .items
                .iter()
                .map(|item| OrderItem {
                    product: item.product_id().cloned().map(Ref::Id),
                    name: item
                        .product
                        .as_ref()
                        .map(|product| product.name.clone())
                        .unwrap_or_default(),
                    quantity: item.quantity,
                    price: item.unit_price(),
                })
                .collect(),
            total_amount: group.subtotal,
            status: OrderStatus::PendingApproval,
            created_at: None,
        };
        created.push(order);
    }
    store.orders.extend(created.iter().cloned());
    store.carts.remove(&user.id);

    Ok(Json(json!({ "message": "Orders placed successfully", "orders": created })))
}

async fn my_orders(State(store): State<Shared>, headers: HeaderMap) -> Reply<Vec<Order>> {
    let mut store = lock(&store);
    store.enter("orders.mine")?;
    let user = store.authed(&headers)?;
    let orders = store
        .orders
        .iter()
        .filter(|order| order.customer.as_ref().and_then(Ref::id) == Some(&user.id))
        .cloned()
        .collect();
    Ok(Json(orders))
}

async fn all_orders(State(store): State<Shared>, headers: HeaderMap) -> Reply<Vec<Order>> {
    let mut store = lock(&store);
    store.enter("orders.all")?;
    store.authed_as(&headers, UserRole::Admin)?;
    Ok(Json(store.orders.clone()))
}

async fn assign_agent(
    State(store): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<OrderId>,
    Json(body): Json<AssignBody>,
) -> Reply<Order> {
    let mut store = lock(&store);
    store.enter("orders.assign")?;
    store.authed_as(&headers, UserRole::Admin)?;

    let agent = store
        .user(&body.agent_id)
        .filter(|user| user.role == UserRole::DeliveryAgent)
        .cloned()
        .ok_or_else(|| Failure::not_found("Delivery agent not found"))?;
    if agent.is_available != Some(true) {
        return Err(Failure::bad_request("Delivery agent is not available"));
    }
    let agent_ref = store.user_ref(&agent.id);

    let order = store
        .orders
        .iter_mut()
        .find(|order| order.id == id)
        .ok_or_else(|| Failure::not_found("Order not found"))?;
    if !order.is_assignable() {
        return Err(Failure::bad_request("Order is not ready for assignment"));
    }
    order.delivery_agent = Some(agent_ref);
    order.status = OrderStatus::OutForDelivery;
    let order = order.clone();

    if let Some(agent) = store.users.iter_mut().find(|user| user.id == agent.id) {
        agent.is_available = Some(false);
    }
    Ok(Json(order))
}

async fn admin_stats(State(store): State<Shared>, headers: HeaderMap) -> Reply<DashboardStats> {
    let mut store = lock(&store);
    store.enter("admin.stats")?;
    store.authed_as(&headers, UserRole::Admin)?;
    Ok(Json(store.stats()))
}
