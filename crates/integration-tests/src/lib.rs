//! Integration tests for Tryla.
//!
//! [`MockBackend`] serves the REST endpoints the client talks to from an
//! in-process axum server on a random port. It records every request so tests
//! can assert on exactly what was sent, and it can revoke tokens or slow reads
//! down on demand.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p tryla-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::missing_panics_doc, clippy::expect_used)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, Request, State},
    http::{HeaderMap, Method, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, patch, post, put},
};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tryla_client::{ApiClient, ClientConfig, RecordingSink, SessionHandle};

pub const ADMIN_EMAIL: &str = "admin@tryla.in";
pub const SHOPPER_EMAIL: &str = "asha@tryla.in";
pub const PASSWORD: &str = "correct-horse";

const ADMIN_TOKEN: &str = "admin-token";
const SHOPPER_TOKEN: &str = "shopper-token";

/// One request as the backend saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub authorization: Option<String>,
}

#[derive(Default)]
struct Data {
    products: Vec<Value>,
    categories: Vec<Value>,
    cart: Vec<Value>,
    orders: Vec<Value>,
    requests: Vec<RecordedRequest>,
    revoked: Vec<&'static str>,
    read_delay: Duration,
    order_delay: Duration,
    next_id: u64,
}

impl Data {
    fn seeded() -> Self {
        Self {
            categories: vec![
                json!({"_id": "c1", "name": "Kurtas", "description": "Everyday cotton"}),
                json!({"_id": "c2", "name": "Sarees"}),
            ],
            products: vec![
                json!({
                    "_id": "p1", "title": "Cotton Kurta", "description": "Hand block printed",
                    "price": 129_900, "stock": 5, "category": "c1", "sizes": ["S", "M", "L"],
                    "featured": true
                }),
                json!({
                    "_id": "p2", "title": "Linen Kurta", "description": "Breathable linen",
                    "price": 189_900, "stock": 0, "category": "c1", "sizes": ["M"]
                }),
                json!({
                    "_id": "p3", "title": "Silk Saree", "description": "Banarasi weave",
                    "price": 749_900, "stock": 2, "category": {"_id": "c2", "name": "Sarees"},
                    "sizes": ["Free"], "featured": true
                }),
            ],
            orders: vec![json!({
                "_id": "o1", "status": "Pending", "totalAmount": 129_900,
                "items": [{"product": "p1", "title": "Cotton Kurta", "quantity": 1, "size": "M", "price": 129_900}],
                "paymentMethod": "cod",
                "createdAt": "2026-10-01T09:30:00Z"
            })],
            ..Self::default()
        }
    }

    fn new_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-new-{}", self.next_id)
    }
}

/// In-process stand-in for the Tryla REST backend.
#[derive(Clone)]
pub struct MockBackend {
    addr: SocketAddr,
    data: Arc<Mutex<Data>>,
}

impl MockBackend {
    /// Start a backend with two categories, three products and one order.
    pub async fn start() -> Self {
        let data = Arc::new(Mutex::new(Data::seeded()));
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock backend");
        let addr = listener.local_addr().expect("Failed to read local address");

        let backend = Self { addr, data };
        let app = backend.router();
        tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("Mock backend stopped");
        });
        backend
    }

    /// Base URL to point a client at.
    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// A client for this backend with the given session, reporting to `sink`.
    #[must_use]
    pub fn client(&self, session: SessionHandle, sink: Arc<RecordingSink>) -> ApiClient {
        let config = ClientConfig::new(&self.url()).expect("Mock URL is valid");
        ApiClient::new(&config, session, sink).expect("Failed to build client")
    }

    /// Every request received so far, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.lock().requests.clone()
    }

    /// How many `method` requests hit exactly `path`.
    #[must_use]
    pub fn count(&self, method: &Method, path: &str) -> usize {
        self.lock()
            .requests
            .iter()
            .filter(|r| &r.method == method && r.path == path)
            .count()
    }

    /// Reject every bearer token from now on.
    pub fn revoke_tokens(&self) {
        self.lock().revoked = vec![ADMIN_TOKEN, SHOPPER_TOKEN];
    }

    /// Reject the shopper's bearer token from now on.
    pub fn revoke_shopper_token(&self) {
        self.lock().revoked.push(SHOPPER_TOKEN);
    }

    /// Delay catalog list reads so concurrent callers overlap. The list is
    /// read before the delay, so a slow response can be out of date.
    pub fn set_read_delay(&self, delay: Duration) {
        self.lock().read_delay = delay;
    }

    /// Delay `GET /orders` responses.
    pub fn set_order_delay(&self, delay: Duration) {
        self.lock().order_delay = delay;
    }

    /// Number of lines in the server-side cart.
    #[must_use]
    pub fn cart_len(&self) -> usize {
        self.lock().cart.len()
    }

    fn lock(&self) -> MutexGuard<'_, Data> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_delay(&self) -> Duration {
        self.lock().read_delay
    }

    fn order_delay(&self) -> Duration {
        self.lock().order_delay
    }

    fn router(&self) -> Router {
        Router::new()
            .route("/auth/login", post(login))
            .route("/auth/signup", post(signup))
            .route("/users/update-profile", put(update_profile))
            .route("/products", get(list_products).post(create_product))
            .route("/products/featured", get(featured_products))
            .route("/products/filters", post(filter_products))
            .route(
                "/products/{id}",
                get(show_product).patch(update_product).delete(delete_product),
            )
            .route("/categories", get(list_categories).post(create_category))
            .route(
                "/categories/{id}",
                get(show_category)
                    .patch(update_category)
                    .delete(delete_category),
            )
            .route("/cart", get(show_cart).post(add_to_cart).delete(clear_cart))
            .route(
                "/cart/{id}",
                patch(update_cart_line).delete(remove_cart_line),
            )
            .route("/orders", get(list_orders).post(place_order))
            .route("/orders/{id}", get(show_order))
            .route("/orders/{id}/status", patch(update_order_status))
            .layer(middleware::from_fn_with_state(self.clone(), record))
            .with_state(self.clone())
    }
}

type Reply = Result<Json<Value>, Response>;

async fn record(State(backend): State<MockBackend>, request: Request, next: Next) -> Response {
    let recorded = RecordedRequest {
        method: request.method().clone(),
        path: request.uri().path().to_string(),
        authorization: request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(ToString::to_string),
    };
    backend.lock().requests.push(recorded);
    next.run(request).await
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

fn admin_user() -> Value {
    json!({"_id": "u-admin", "name": "Meera Iyer", "email": ADMIN_EMAIL, "role": "admin"})
}

fn shopper_user() -> Value {
    json!({"_id": "u-asha", "name": "Asha Rao", "email": SHOPPER_EMAIL, "role": "user"})
}

/// The user behind the bearer token, or a 401.
fn authenticate(backend: &MockBackend, headers: &HeaderMap) -> Result<Value, Response> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));
    let revoked = token.is_some_and(|token| backend.lock().revoked.iter().any(|r| *r == token));
    if revoked {
        return Err(error(StatusCode::UNAUTHORIZED, "Token expired"));
    }
    match token {
        Some(ADMIN_TOKEN) => Ok(admin_user()),
        Some(SHOPPER_TOKEN) => Ok(shopper_user()),
        _ => Err(error(StatusCode::UNAUTHORIZED, "Invalid token")),
    }
}

fn require_admin(backend: &MockBackend, headers: &HeaderMap) -> Result<(), Response> {
    let user = authenticate(backend, headers)?;
    if user["role"] == "admin" {
        Ok(())
    } else {
        Err(error(StatusCode::FORBIDDEN, "Admin access required"))
    }
}

fn find<'a>(items: &'a mut [Value], id: &str) -> Option<&'a mut Value> {
    items.iter_mut().find(|item| item["_id"] == id)
}

fn merge(target: &mut Value, patch: Value) {
    if let (Some(target), Value::Object(patch)) = (target.as_object_mut(), patch) {
        target.extend(patch);
    }
}

// =============================================================================
// Auth
// =============================================================================

async fn login(Json(body): Json<Value>) -> Reply {
    if body["password"] != PASSWORD {
        return Err(error(StatusCode::UNAUTHORIZED, "Invalid credentials"));
    }
    match body["email"].as_str() {
        Some(ADMIN_EMAIL) => Ok(Json(json!({"user": admin_user(), "token": ADMIN_TOKEN}))),
        Some(SHOPPER_EMAIL) => Ok(Json(json!({"user": shopper_user(), "token": SHOPPER_TOKEN}))),
        _ => Err(error(StatusCode::UNAUTHORIZED, "Invalid credentials")),
    }
}

async fn signup(Json(body): Json<Value>) -> Reply {
    if body["email"] == SHOPPER_EMAIL || body["email"] == ADMIN_EMAIL {
        return Err(error(StatusCode::CONFLICT, "Email already registered"));
    }
    let user = json!({
        "_id": "u-new", "name": body["name"], "email": body["email"], "role": "user"
    });
    Ok(Json(json!({"user": user, "token": SHOPPER_TOKEN})))
}

async fn update_profile(
    State(backend): State<MockBackend>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    let mut user = authenticate(&backend, &headers)?;
    merge(&mut user, body);
    Ok(Json(json!({ "user": user })))
}

// =============================================================================
// Catalog
// =============================================================================

async fn list_products(State(backend): State<MockBackend>) -> Json<Value> {
    let products = backend.lock().products.clone();
    tokio::time::sleep(backend.read_delay()).await;
    Json(Value::Array(products))
}

async fn featured_products(State(backend): State<MockBackend>) -> Json<Value> {
    let featured: Vec<Value> = backend
        .lock()
        .products
        .iter()
        .filter(|product| product["featured"] == true)
        .cloned()
        .collect();
    Json(json!({ "products": featured }))
}

async fn filter_products(
    State(backend): State<MockBackend>,
    Json(filter): Json<Value>,
) -> Json<Value> {
    let wanted_sizes: Vec<&Value> = filter["sizes"]
        .as_array()
        .map(|sizes| sizes.iter().collect())
        .unwrap_or_default();
    let matches = |product: &&Value| {
        let category = &product["category"];
        let category_id = category.get("_id").unwrap_or(category);
        let in_stock = product["stock"].as_i64().unwrap_or(0) > 0;
        let sizes = product["sizes"].as_array();

        (filter["category"].is_null() || category_id == &filter["category"])
            && match filter["availability"].as_str() {
                Some("in-stock") => in_stock,
                Some("out-of-stock") => !in_stock,
                _ => true,
            }
            && (wanted_sizes.is_empty()
                || sizes.is_some_and(|sizes| sizes.iter().any(|s| wanted_sizes.contains(&s))))
    };
    let products: Vec<Value> = backend
        .lock()
        .products
        .iter()
        .filter(matches)
        .cloned()
        .collect();
    Json(Value::Array(products))
}

async fn show_product(State(backend): State<MockBackend>, Path(id): Path<String>) -> Reply {
    find(&mut backend.lock().products, &id)
        .map(|product| Json(product.clone()))
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "Product not found"))
}

async fn create_product(
    State(backend): State<MockBackend>,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> Reply {
    require_admin(&backend, &headers)?;
    let mut data = backend.lock();
    merge(&mut body, json!({ "_id": data.new_id("p") }));
    data.products.push(body.clone());
    Ok(Json(body))
}

async fn update_product(
    State(backend): State<MockBackend>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Reply {
    require_admin(&backend, &headers)?;
    let mut data = backend.lock();
    let product = find(&mut data.products, &id)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "Product not found"))?;
    merge(product, body);
    Ok(Json(product.clone()))
}

async fn delete_product(
    State(backend): State<MockBackend>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply {
    require_admin(&backend, &headers)?;
    let mut data = backend.lock();
    let before = data.products.len();
    data.products.retain(|product| product["_id"] != id.as_str());
    if data.products.len() == before {
        return Err(error(StatusCode::NOT_FOUND, "Product not found"));
    }
    Ok(Json(json!({"message": "Product deleted"})))
}

async fn list_categories(State(backend): State<MockBackend>) -> Json<Value> {
    let categories = backend.lock().categories.clone();
    tokio::time::sleep(backend.read_delay()).await;
    Json(Value::Array(categories))
}

async fn show_category(State(backend): State<MockBackend>, Path(id): Path<String>) -> Reply {
    find(&mut backend.lock().categories, &id)
        .map(|category| Json(category.clone()))
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "Category not found"))
}

async fn create_category(
    State(backend): State<MockBackend>,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> Reply {
    require_admin(&backend, &headers)?;
    let mut data = backend.lock();
    merge(&mut body, json!({ "_id": data.new_id("c") }));
    data.categories.push(body.clone());
    Ok(Json(body))
}

async fn update_category(
    State(backend): State<MockBackend>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Reply {
    require_admin(&backend, &headers)?;
    let mut data = backend.lock();
    let category = find(&mut data.categories, &id)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "Category not found"))?;
    merge(category, body);
    Ok(Json(category.clone()))
}

async fn delete_category(
    State(backend): State<MockBackend>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply {
    require_admin(&backend, &headers)?;
    let mut data = backend.lock();
    let before = data.categories.len();
    data.categories.retain(|category| category["_id"] != id.as_str());
    if data.categories.len() == before {
        return Err(error(StatusCode::NOT_FOUND, "Category not found"));
    }
    Ok(Json(json!({"message": "Category deleted"})))
}

// =============================================================================
// Cart
// =============================================================================

async fn show_cart(State(backend): State<MockBackend>, headers: HeaderMap) -> Reply {
    authenticate(&backend, &headers)?;
    Ok(Json(json!({ "items": backend.lock().cart.clone() })))
}

async fn add_to_cart(
    State(backend): State<MockBackend>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    authenticate(&backend, &headers)?;
    let product_id = body["productId"].as_str().unwrap_or_default().to_string();
    let quantity = body["quantity"].as_u64().unwrap_or(0);

    let mut data = backend.lock();
    let product = find(&mut data.products, &product_id)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "Product not found"))?
        .clone();
    if product["stock"].as_i64().unwrap_or(0) <= 0 {
        return Err(error(StatusCode::BAD_REQUEST, "Out of stock"));
    }

    match data
        .cart
        .iter_mut()
        .find(|line| line["productId"] == product_id.as_str() && line["size"] == body["size"])
    {
        Some(line) => {
            let current = line["quantity"].as_u64().unwrap_or(0);
            line["quantity"] = json!(current + quantity);
        }
        None => data.cart.push(json!({
            "productId": product_id,
            "quantity": quantity,
            "size": body["size"],
            "price": product["price"],
            "title": product["title"],
        })),
    }
    Ok(Json(json!({ "items": data.cart.clone() })))
}

async fn update_cart_line(
    State(backend): State<MockBackend>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Reply {
    authenticate(&backend, &headers)?;
    let mut data = backend.lock();
    let line = data
        .cart
        .iter_mut()
        .find(|line| line["productId"] == id.as_str())
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "Item not in cart"))?;
    line["quantity"] = body["quantity"].clone();
    Ok(Json(json!({ "items": data.cart.clone() })))
}

async fn remove_cart_line(
    State(backend): State<MockBackend>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply {
    authenticate(&backend, &headers)?;
    let mut data = backend.lock();
    data.cart.retain(|line| line["productId"] != id.as_str());
    Ok(Json(json!({ "items": data.cart.clone() })))
}

async fn clear_cart(State(backend): State<MockBackend>, headers: HeaderMap) -> Reply {
    authenticate(&backend, &headers)?;
    backend.lock().cart.clear();
    Ok(Json(json!({"message": "Cart cleared"})))
}

// =============================================================================
// Orders
// =============================================================================

async fn list_orders(State(backend): State<MockBackend>, headers: HeaderMap) -> Reply {
    tokio::time::sleep(backend.order_delay()).await;
    authenticate(&backend, &headers)?;
    Ok(Json(json!({ "orders": backend.lock().orders.clone() })))
}

async fn show_order(
    State(backend): State<MockBackend>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply {
    authenticate(&backend, &headers)?;
    find(&mut backend.lock().orders, &id)
        .map(|order| Json(order.clone()))
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "Order not found"))
}

async fn place_order(
    State(backend): State<MockBackend>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    authenticate(&backend, &headers)?;
    let mut data = backend.lock();
    if data.cart.is_empty() {
        return Err(error(StatusCode::BAD_REQUEST, "Cart is empty"));
    }

    let items: Vec<Value> = data
        .cart
        .iter()
        .map(|line| {
            json!({
                "product": line["productId"],
                "title": line["title"],
                "quantity": line["quantity"],
                "size": line["size"],
                "price": line["price"],
            })
        })
        .collect();
    let total: i64 = data
        .cart
        .iter()
        .map(|line| line["price"].as_i64().unwrap_or(0) * line["quantity"].as_i64().unwrap_or(0))
        .sum();
    let order = json!({
        "_id": data.new_id("o"),
        "status": "pending",
        "items": items,
        "shippingAddress": body["shippingAddress"],
        "paymentMethod": body["paymentMethod"],
        "totalAmount": total,
        "createdAt": "2026-10-19T10:00:00Z",
    });
    data.orders.push(order.clone());
    data.cart.clear();
    Ok(Json(order))
}

async fn update_order_status(
    State(backend): State<MockBackend>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Reply {
    require_admin(&backend, &headers)?;
    let mut data = backend.lock();
    let order = find(&mut data.orders, &id)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "Order not found"))?;
    order["status"] = body["status"].clone();
    Ok(Json(order.clone()))
}
