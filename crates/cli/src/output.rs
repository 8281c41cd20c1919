//! Terminal rendering.
//!
//! Data goes to stdout (as text or `--json`); toasts and navigation requests
//! go to stderr so they never mix with piped output.

use std::fmt::Write as _;

use serde::Serialize;
use tryla_client::types::{CartItem, Category, Order, Product, User};
use tryla_client::{Route, Toast, ToastLevel, UiSink};
use tryla_core::Price;

/// Prints toasts and navigation hints.
#[derive(Debug, Clone, Copy)]
pub struct ConsoleSink;

impl UiSink for ConsoleSink {
    #[allow(clippy::print_stderr)]
    fn toast(&self, toast: Toast) {
        let marker = match toast.level {
            ToastLevel::Success => "ok",
            ToastLevel::Info => "--",
            ToastLevel::Error => "error",
        };
        eprintln!("[{marker}] {}", toast.message);
    }

    #[allow(clippy::print_stderr)]
    fn navigate(&self, route: Route) {
        match route {
            Route::Login => eprintln!("Please log in first: tryla login --email <EMAIL>"),
            route => tracing::debug!(%route, "navigation ignored"),
        }
    }
}

/// Chooses between tables and JSON.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    json: bool,
}

impl Output {
    pub const fn new(json: bool) -> Self {
        Self { json }
    }

    /// Print `value` as JSON, or as `render(value)`.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    #[allow(clippy::print_stdout)]
    pub fn show<T: Serialize + ?Sized>(
        &self,
        value: &T,
        render: impl FnOnce(&T) -> String,
    ) -> Result<(), serde_json::Error> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            print!("{}", render(value));
        }
        Ok(())
    }

    /// Print a one-line status message (suppressed in JSON mode).
    #[allow(clippy::print_stdout)]
    pub fn message(&self, text: &str) {
        if !self.json {
            println!("{text}");
        }
    }
}

pub fn products(products: &[Product]) -> String {
    if products.is_empty() {
        return "No products found.\n".to_string();
    }
    let mut out = String::new();
    for product in products {
        let stock = if product.in_stock() {
            format!("{} in stock", product.stock)
        } else {
            "out of stock".to_string()
        };
        let _ = writeln!(
            out,
            "{:<26} {:<32} {:>12}  {}",
            product.id,
            product.title,
            product.price.to_string(),
            stock
        );
    }
    out
}

pub fn product(product: &Product) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", product.title, product.id);
    let _ = writeln!(out, "Price:    {}", product.price);
    let _ = writeln!(out, "Stock:    {}", product.stock);
    if let Some(category) = &product.category {
        let _ = writeln!(
            out,
            "Category: {}",
            category.name().unwrap_or(category.id().as_str())
        );
    }
    if !product.sizes.is_empty() {
        let _ = writeln!(out, "Sizes:    {}", product.sizes.join(", "));
    }
    for (label, value) in [
        ("Material", &product.material),
        ("Fit", &product.fit),
        ("Care", &product.care),
    ] {
        if let Some(value) = value {
            let _ = writeln!(out, "{label:<9} {value}");
        }
    }
    if !product.description.is_empty() {
        let _ = writeln!(out, "\n{}", product.description);
    }
    for feature in &product.features {
        let _ = writeln!(out, "  - {feature}");
    }
    out
}

pub fn categories(categories: &[Category]) -> String {
    if categories.is_empty() {
        return "No categories found.\n".to_string();
    }
    let mut out = String::new();
    for category in categories {
        let _ = writeln!(out, "{:<26} {}", category.id, category.name);
    }
    out
}

pub fn category(category: &Category) -> String {
    let mut out = format!("{} ({})\n", category.name, category.id);
    if let Some(description) = &category.description {
        let _ = writeln!(out, "{description}");
    }
    out
}

/// Cart lines plus totals.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub items: Vec<CartItem>,
    pub total_items: u64,
    pub total_price: Price,
}

pub fn cart(cart: &CartView) -> String {
    if cart.items.is_empty() {
        return "Your cart is empty.\n".to_string();
    }
    let mut out = String::new();
    for item in &cart.items {
        let _ = writeln!(
            out,
            "{:<26} {:<24} {:>4} x {:>10} = {:>12}",
            item.product_id,
            format!(
                "{} [{}]",
                item.title.as_deref().unwrap_or("-"),
                item.size.as_deref().unwrap_or("-")
            ),
            item.quantity,
            item.price.to_string(),
            item.line_total().to_string()
        );
    }
    let _ = writeln!(
        out,
        "{} item(s), total {}",
        cart.total_items, cart.total_price
    );
    out
}

pub fn orders(orders: &[Order]) -> String {
    if orders.is_empty() {
        return "No orders yet.\n".to_string();
    }
    let mut out = String::new();
    for order in orders {
        let placed = order
            .created_at
            .map(|at| at.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "{:<26} {:<11} {:>4} item(s) {:>12}  {}",
            order.id,
            order.status,
            order.item_count(),
            order.total.to_string(),
            placed
        );
    }
    out
}

pub fn order(order: &Order) -> String {
    let mut out = format!("Order {} - {}\n", order.id, order.status);
    for item in &order.items {
        let _ = writeln!(
            out,
            "  {} x {}{} @ {}",
            item.quantity,
            item.title.as_deref().unwrap_or(item.product_id.as_str()),
            item.size
                .as_deref()
                .map(|size| format!(" [{size}]"))
                .unwrap_or_default(),
            item.price
        );
    }
    if let Some(address) = &order.shipping_address {
        let _ = writeln!(
            out,
            "Ship to: {}, {}, {}, {} {}",
            address.full_name, address.street, address.city, address.state, address.postal_code
        );
    }
    if let Some(method) = &order.payment_method {
        let _ = writeln!(out, "Payment: {method}");
    }
    let _ = writeln!(out, "Total:   {}", order.total);
    out
}

pub fn user(user: &User) -> String {
    let mut out = format!("{} <{}>", user.name, user.email);
    if user.is_admin() {
        out.push_str(" [admin]");
    }
    out.push('\n');
    if let Some(phone) = &user.phone {
        let _ = writeln!(out, "Phone: {phone}");
    }
    out
}

#[cfg(test)]
mod tests {
    use tryla_core::{OrderId, OrderStatus, ProductId};

    use super::*;

    fn line(id: &str, price: i64, quantity: u32) -> CartItem {
        CartItem {
            product_id: ProductId::new(id),
            quantity,
            size: Some("M".to_string()),
            price: Price::from_minor(price),
            title: Some("Kurta".to_string()),
            image: None,
        }
    }

    #[test]
    fn test_cart_shows_totals() {
        let view = CartView {
            items: vec![line("p1", 49_900, 2)],
            total_items: 2,
            total_price: Price::from_minor(99_800),
        };
        let text = cart(&view);
        assert!(text.contains("Kurta [M]"));
        assert!(text.contains("2 item(s), total ₹998.00"));
    }

    #[test]
    fn test_empty_cart() {
        let view = CartView {
            items: Vec::new(),
            total_items: 0,
            total_price: Price::ZERO,
        };
        assert_eq!(cart(&view), "Your cart is empty.\n");
    }

    #[test]
    fn test_order_summary() {
        let order = Order {
            id: OrderId::new("o1"),
            status: OrderStatus::Shipped,
            items: Vec::new(),
            shipping_address: None,
            payment_method: Some("cod".to_string()),
            total: Price::from_minor(129_900),
            created_at: None,
        };
        let text = orders(std::slice::from_ref(&order));
        assert!(text.starts_with("o1 "));
        assert!(text.contains("shipped"));
        assert!(text.contains("₹1299.00"));
    }
}
