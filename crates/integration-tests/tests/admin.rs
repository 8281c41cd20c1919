//! Admin dashboard views driven through the real client.

use std::sync::Arc;
use std::time::Duration;

use axum::http::Method;
use secrecy::SecretString;
use tryla_client::admin::{AdminCollection, Categories, FormState, OrderAdmin, Products};
use tryla_client::{ApiClient, RecordingSink, SessionHandle, ToastLevel};
use tryla_core::{CategoryId, OrderId, OrderStatus, ProductId};
use tryla_integration_tests::{ADMIN_EMAIL, MockBackend, PASSWORD, SHOPPER_EMAIL};

async fn login(backend: &MockBackend, email: &str) -> (ApiClient, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::new());
    let client = backend.client(SessionHandle::in_memory(), Arc::clone(&sink));
    client
        .login(email, SecretString::from(PASSWORD.to_string()))
        .await
        .expect("Login should succeed");
    (client, sink)
}

#[tokio::test]
async fn test_create_product_reloads_list() {
    let backend = MockBackend::start().await;
    let (client, sink) = login(&backend, ADMIN_EMAIL).await;
    let mut products = AdminCollection::<Products>::new(client);
    assert_eq!(products.load().await.expect("Load").len(), 3);

    products.begin_create().expect("Form opens");
    let draft = products.draft_mut().expect("Draft is editable");
    draft.title = "Block Print Dupatta".to_string();
    draft.price = "799.50".to_string();
    draft.stock = "12".to_string();
    draft.category = "c1".to_string();
    draft.sizes = "Free".to_string();

    let created = products.submit().await.expect("Submit should succeed");

    assert_eq!(created.price.minor_units(), 79_950);
    assert_eq!(created.sizes, vec!["Free".to_string()]);
    assert_eq!(products.form().state(), FormState::Viewing);
    assert_eq!(products.items().len(), 4);
    assert!(
        sink.toasts()
            .iter()
            .any(|t| t.level == ToastLevel::Success && t.message == "Product created")
    );
}

#[tokio::test]
async fn test_reload_ignores_read_started_before_create() {
    let backend = MockBackend::start().await;
    let (client, _sink) = login(&backend, ADMIN_EMAIL).await;
    backend.set_read_delay(Duration::from_millis(200));
    let mut products = AdminCollection::<Products>::new(client.clone());

    let (listed, created) = tokio::join!(client.products(), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        products.begin_create().expect("Form opens");
        let draft = products.draft_mut().expect("Draft is editable");
        draft.title = "Chanderi Dupatta".to_string();
        draft.price = "1499".to_string();
        draft.stock = "4".to_string();
        draft.category = "c1".to_string();
        products.submit().await
    });

    assert_eq!(listed.expect("Earlier read").len(), 3);
    created.expect("Submit should succeed");
    assert_eq!(products.items().len(), 4);
    assert_eq!(client.products().await.expect("Cached read").len(), 4);
    assert_eq!(backend.count(&Method::GET, "/products"), 2);
}

#[tokio::test]
async fn test_invalid_draft_is_not_sent() {
    let backend = MockBackend::start().await;
    let (client, _sink) = login(&backend, ADMIN_EMAIL).await;
    let mut products = AdminCollection::<Products>::new(client);

    products.begin_create().expect("Form opens");
    products.draft_mut().expect("Draft is editable").price = "abc".to_string();
    let result = products.submit().await;

    assert!(result.is_err());
    assert_eq!(products.form().state(), FormState::Editing);
    assert!(products.form().last_error().is_some());
    assert_eq!(backend.count(&Method::POST, "/products"), 0);
}

#[tokio::test]
async fn test_edit_keeps_untouched_fields() {
    let backend = MockBackend::start().await;
    let (client, _sink) = login(&backend, ADMIN_EMAIL).await;
    let mut products = AdminCollection::<Products>::new(client);
    products.load().await.expect("Load");

    products
        .begin_edit(&ProductId::new("p1"))
        .expect("p1 is listed");
    products.draft_mut().expect("Draft is editable").stock = "9".to_string();
    let updated = products.submit().await.expect("Submit should succeed");

    assert_eq!(updated.stock, 9);
    assert_eq!(updated.title, "Cotton Kurta");
    assert_eq!(updated.price.minor_units(), 129_900);
    assert_eq!(backend.count(&Method::PATCH, "/products/p1"), 1);
}

#[tokio::test]
async fn test_declined_delete_sends_nothing() {
    let backend = MockBackend::start().await;
    let (client, _sink) = login(&backend, ADMIN_EMAIL).await;
    let mut categories = AdminCollection::<Categories>::new(client);
    categories.load().await.expect("Load");

    let deleted = categories
        .delete(&CategoryId::new("c2"), &|_: &str| false)
        .await
        .expect("Declining is not an error");

    assert!(!deleted);
    assert_eq!(backend.count(&Method::DELETE, "/categories/c2"), 0);

    let deleted = categories
        .delete(&CategoryId::new("c2"), &|_: &str| true)
        .await
        .expect("Delete should succeed");
    assert!(deleted);
    assert_eq!(categories.items().len(), 1);
}

#[tokio::test]
async fn test_shopper_cannot_create() {
    let backend = MockBackend::start().await;
    let (client, sink) = login(&backend, SHOPPER_EMAIL).await;
    let mut categories = AdminCollection::<Categories>::new(client.clone());

    categories.begin_create().expect("Form opens");
    categories.draft_mut().expect("Draft is editable").name = "Scarves".to_string();
    let err = categories.submit().await.expect_err("Backend refuses");

    assert_eq!(err.user_message(), "Admin access required");
    assert_eq!(categories.form().state(), FormState::Viewing);
    assert_eq!(categories.form().last_error(), Some("Admin access required"));
    assert!(client.session().is_authenticated().await);
    assert!(
        sink.toasts()
            .iter()
            .any(|t| t.level == ToastLevel::Error && t.message == "Admin access required")
    );
}

#[tokio::test]
async fn test_order_status_change() {
    let backend = MockBackend::start().await;
    let (client, sink) = login(&backend, ADMIN_EMAIL).await;
    let mut orders = OrderAdmin::new(client);
    orders.load().await.expect("Load");
    assert_eq!(orders.with_status(OrderStatus::Pending).count(), 1);

    orders
        .update_status(&OrderId::new("o1"), OrderStatus::Shipped)
        .await
        .expect("Update should succeed");

    assert_eq!(backend.count(&Method::PATCH, "/orders/o1/status"), 1);
    assert_eq!(orders.with_status(OrderStatus::Shipped).count(), 1);
    assert!(
        sink.toasts()
            .iter()
            .any(|t| t.message == "Order marked shipped")
    );
}
