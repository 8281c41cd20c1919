//! Request and response shapes of the Tryla REST backend.
//!
//! The backend owns and validates every entity; these types are deliberately
//! lenient (`#[serde(default)]` on optional data, `_id` accepted as `id`).

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, Serializer};
use tryla_core::{CategoryId, Email, OrderId, OrderStatus, Price, ProductId, UserId, UserRole};

// =============================================================================
// Users & Auth
// =============================================================================

/// A shopper or admin account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(alias = "_id")]
    pub id: UserId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
}

impl User {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Body of a successful login or signup.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}

/// Credentials for `POST /auth/login`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: Email,
    #[serde(serialize_with = "expose")]
    pub password: SecretString,
}

/// Registration for `POST /auth/signup`.
#[derive(Debug, Clone, Serialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: Email,
    #[serde(serialize_with = "expose")]
    pub password: SecretString,
}

fn expose<S: Serializer>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

/// Fields accepted by `PUT /users/update-profile`. Unset fields are omitted.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<Email>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
}

impl ProfileUpdate {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.phone.is_none() && self.address.is_none()
    }
}

/// Profile update responses come either bare or wrapped in `{ "user": ... }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum UserPayload {
    Wrapped { user: User },
    Bare(User),
}

impl From<UserPayload> for User {
    fn from(payload: UserPayload) -> Self {
        match payload {
            UserPayload::Wrapped { user } | UserPayload::Bare(user) => user,
        }
    }
}

/// Postal address used for shipping and on the profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default, alias = "pincode", alias = "zip")]
    pub postal_code: String,
    #[serde(default)]
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

// =============================================================================
// Catalog
// =============================================================================

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(alias = "_id")]
    pub id: CategoryId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Payload for creating or updating a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInput {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// How a product refers to its category: a bare id or an embedded object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CategoryRef {
    Embedded {
        #[serde(alias = "_id")]
        id: CategoryId,
        #[serde(default)]
        name: String,
    },
    Id(CategoryId),
}

impl CategoryRef {
    #[must_use]
    pub const fn id(&self) -> &CategoryId {
        match self {
            Self::Embedded { id, .. } | Self::Id(id) => id,
        }
    }

    /// Category name, when the backend embedded it.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Embedded { name, .. } if !name.is_empty() => Some(name),
            _ => None,
        }
    }
}

/// A product as listed in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(alias = "_id")]
    pub id: ProductId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: Price,
    #[serde(default)]
    pub stock: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryRef>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub care: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,
}

impl Product {
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }

    #[must_use]
    pub fn category_id(&self) -> Option<&CategoryId> {
        self.category.as_ref().map(CategoryRef::id)
    }

    /// Case-insensitive match against title and description.
    #[must_use]
    pub fn matches(&self, needle_lowercase: &str) -> bool {
        self.title.to_lowercase().contains(needle_lowercase)
            || self.description.to_lowercase().contains(needle_lowercase)
    }
}

/// Payload assembled by the admin product form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub title: String,
    pub description: String,
    pub price: Price,
    pub stock: i64,
    pub category: CategoryId,
    pub images: Vec<String>,
    pub sizes: Vec<String>,
    pub features: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub care: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,
}

/// Stock filter for `POST /products/filters`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Availability {
    InStock,
    OutOfStock,
}

/// Body of `POST /products/filters`. Empty fields are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability: Option<Availability>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sizes: Vec<String>,
}

/// Product list responses come either bare or as `{ "products": [...] }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ProductsPayload {
    Wrapped { products: Vec<Product> },
    Bare(Vec<Product>),
}

impl From<ProductsPayload> for Vec<Product> {
    fn from(payload: ProductsPayload) -> Self {
        match payload {
            ProductsPayload::Wrapped { products } | ProductsPayload::Bare(products) => products,
        }
    }
}

// =============================================================================
// Cart
// =============================================================================

/// One line of the server-side cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: ProductId,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    pub price: Price,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl CartItem {
    /// Price × quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price * self.quantity
    }
}

/// Cart responses come either bare or as `{ "items": [...] }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum CartPayload {
    Wrapped { items: Vec<CartItem> },
    Bare(Vec<CartItem>),
}

impl From<CartPayload> for Vec<CartItem> {
    fn from(payload: CartPayload) -> Self {
        match payload {
            CartPayload::Wrapped { items } | CartPayload::Bare(items) => items,
        }
    }
}

/// Body of `POST /cart`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCart {
    pub product_id: ProductId,
    pub quantity: u32,
    pub size: String,
}

/// Body of `PATCH /cart/:productId`.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct QuantityUpdate {
    pub quantity: u32,
}

// =============================================================================
// Orders
// =============================================================================

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(alias = "_id")]
    pub id: OrderId,
    pub status: OrderStatus,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(alias = "totalAmount", alias = "totalPrice")]
    pub total: Price,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Sum of item quantities.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }
}

/// One line of a placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    #[serde(alias = "product")]
    pub product_id: ProductId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    pub price: Price,
}

/// Body of `PATCH /orders/:id/status`.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct StatusUpdate {
    pub status: OrderStatus,
}

/// How a checkout is paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    #[serde(rename = "cod")]
    CashOnDelivery,
    Card,
    Upi,
}

/// Body of `POST /orders`; the backend builds the order from the cart.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub shipping_address: Address,
    pub payment_method: PaymentMethod,
}

/// Order list responses come either bare or as `{ "orders": [...] }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum OrdersPayload {
    Wrapped { orders: Vec<Order> },
    Bare(Vec<Order>),
}

impl From<OrdersPayload> for Vec<Order> {
    fn from(payload: OrdersPayload) -> Self {
        match payload {
            OrdersPayload::Wrapped { orders } | OrdersPayload::Bare(orders) => orders,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_cart_payload_shapes() {
        let bare: CartPayload =
            serde_json::from_value(json!([{"productId": "p1", "price": 499, "quantity": 2}]))
                .unwrap();
        let items = Vec::from(bare);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].line_total().minor_units(), 998);
        assert_eq!(items[0].size, None);

        let wrapped: CartPayload = serde_json::from_value(json!({
            "items": [{"productId": 7, "price": 100, "quantity": 1, "size": "M"}]
        }))
        .unwrap();
        let items = Vec::from(wrapped);
        assert_eq!(items[0].product_id.as_str(), "7");
        assert_eq!(items[0].size.as_deref(), Some("M"));
    }

    #[test]
    fn test_product_accepts_mongo_ids_and_embedded_category() {
        let product: Product = serde_json::from_value(json!({
            "_id": "64ab",
            "title": "Linen Shirt",
            "price": 149_900,
            "stock": 0,
            "category": {"_id": "c1", "name": "Shirts"},
            "sizes": ["S", "M"]
        }))
        .unwrap();

        assert_eq!(product.id.as_str(), "64ab");
        assert!(!product.in_stock());
        assert_eq!(product.category_id().unwrap().as_str(), "c1");
        assert_eq!(product.category.as_ref().unwrap().name(), Some("Shirts"));
        assert!(product.images.is_empty());
    }

    #[test]
    fn test_product_with_bare_category_id() {
        let product: Product = serde_json::from_value(json!({
            "id": "p2", "title": "Tee", "price": 49_900, "category": "c2"
        }))
        .unwrap();
        assert_eq!(product.category, Some(CategoryRef::Id(CategoryId::new("c2"))));
        assert_eq!(product.category.unwrap().name(), None);
    }

    #[test]
    fn test_order_status_casing_and_total_alias() {
        let order: Order = serde_json::from_value(json!({
            "_id": "o1",
            "status": "Shipped",
            "totalAmount": 99_800,
            "items": [{"product": "p1", "quantity": 2, "price": 49_900}],
            "createdAt": "2026-01-05T10:00:00Z"
        }))
        .unwrap();
        assert_eq!(order.status, OrderStatus::Shipped);
        assert_eq!(order.total.minor_units(), 99_800);
        assert_eq!(order.item_count(), 2);
        assert!(order.created_at.is_some());
    }

    #[test]
    fn test_filter_omits_empty_fields() {
        let filter = ProductFilter {
            availability: Some(Availability::InStock),
            ..ProductFilter::default()
        };
        assert_eq!(
            serde_json::to_value(&filter).unwrap(),
            json!({"availability": "in-stock"})
        );
    }

    #[test]
    fn test_login_request_exposes_password_only_on_wire() {
        let request = LoginRequest {
            email: Email::parse("a@b.in").unwrap(),
            password: SecretString::from("hunter22".to_string()),
        };
        assert!(!format!("{request:?}").contains("hunter22"));
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"email": "a@b.in", "password": "hunter22"})
        );
    }

    #[test]
    fn test_payment_method_wire_names() {
        assert_eq!(
            serde_json::to_value(PaymentMethod::CashOnDelivery).unwrap(),
            json!("cod")
        );
        assert_eq!(serde_json::to_value(PaymentMethod::Upi).unwrap(), json!("upi"));
    }
}
