//! Catalog reads: coalescing, caching, filtering and search.

use std::sync::Arc;
use std::time::Duration;

use axum::http::Method;
use secrecy::SecretString;
use tryla_client::types::{Availability, CategoryInput, ProductFilter};
use tryla_client::{ApiError, RecordingSink, SessionHandle};
use tryla_core::{CategoryId, ProductId};
use tryla_integration_tests::{ADMIN_EMAIL, MockBackend, PASSWORD};

#[tokio::test]
async fn test_concurrent_reads_share_one_request() {
    let backend = MockBackend::start().await;
    backend.set_read_delay(Duration::from_millis(100));
    let client = backend.client(SessionHandle::in_memory(), Arc::new(RecordingSink::new()));

    let (a, b, c) = tokio::join!(client.products(), client.products(), client.products());

    assert_eq!(a.expect("First read").len(), 3);
    assert_eq!(b.expect("Second read").len(), 3);
    assert_eq!(c.expect("Third read").len(), 3);
    assert_eq!(backend.count(&Method::GET, "/products"), 1);
}

#[tokio::test]
async fn test_admin_mutation_invalidates_cache() {
    let backend = MockBackend::start().await;
    let client = backend.client(SessionHandle::in_memory(), Arc::new(RecordingSink::new()));
    client
        .login(ADMIN_EMAIL, SecretString::from(PASSWORD.to_string()))
        .await
        .expect("Login should succeed");

    assert_eq!(client.categories().await.expect("Categories").len(), 2);
    assert_eq!(client.categories().await.expect("Categories").len(), 2);
    assert_eq!(backend.count(&Method::GET, "/categories"), 1);

    client
        .create_category(&CategoryInput {
            name: "Dupattas".to_string(),
            description: None,
            image: None,
        })
        .await
        .expect("Create should succeed");

    let categories = client.categories().await.expect("Categories");
    assert_eq!(categories.len(), 3);
    assert_eq!(backend.count(&Method::GET, "/categories"), 2);
}

#[tokio::test]
async fn test_filter_by_category_and_stock() {
    let backend = MockBackend::start().await;
    let client = backend.client(SessionHandle::in_memory(), Arc::new(RecordingSink::new()));

    let filter = ProductFilter {
        category: Some(CategoryId::new("c1")),
        availability: Some(Availability::InStock),
        sizes: Vec::new(),
    };
    let products = client.filter_products(&filter).await.expect("Filter");

    let ids: Vec<&str> = products.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["p1"]);
}

#[tokio::test]
async fn test_category_products_include_embedded_refs() {
    let backend = MockBackend::start().await;
    let client = backend.client(SessionHandle::in_memory(), Arc::new(RecordingSink::new()));

    let products = client
        .category_products(&CategoryId::new("c2"))
        .await
        .expect("Category products");

    assert_eq!(products.len(), 1);
    assert_eq!(products[0].title, "Silk Saree");
}

#[tokio::test]
async fn test_search_ignores_case() {
    let backend = MockBackend::start().await;
    let client = backend.client(SessionHandle::in_memory(), Arc::new(RecordingSink::new()));

    let hits = client.search_products("KURTA").await.expect("Search");
    assert_eq!(hits.len(), 2);

    let by_description = client.search_products("banarasi").await.expect("Search");
    assert_eq!(by_description.len(), 1);

    assert!(client.search_products("   ").await.expect("Search").is_empty());
}

#[tokio::test]
async fn test_featured_and_single_product() {
    let backend = MockBackend::start().await;
    let client = backend.client(SessionHandle::in_memory(), Arc::new(RecordingSink::new()));

    let featured = client.featured_products().await.expect("Featured");
    assert_eq!(featured.len(), 2);

    let product = client.product(&ProductId::new("p3")).await.expect("Product");
    assert_eq!(product.price.to_string(), "₹7499.00");

    let missing = client.product(&ProductId::new("nope")).await;
    assert!(matches!(missing, Err(ApiError::NotFound(message)) if message == "Product not found"));
}
