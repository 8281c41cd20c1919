//! Login, persistence and centralized 401 handling.

use std::sync::Arc;
use std::time::Duration;

use axum::http::Method;
use secrecy::SecretString;
use tryla_client::types::ProfileUpdate;
use tryla_client::{
    ApiError, FileSessionStore, MemorySessionStore, RecordingSink, Route, SessionHandle,
};
use tryla_core::ProductId;
use tryla_integration_tests::{ADMIN_EMAIL, MockBackend, PASSWORD, SHOPPER_EMAIL};

fn password() -> SecretString {
    SecretString::from(PASSWORD.to_string())
}

#[tokio::test]
async fn test_login_persists_session() {
    let backend = MockBackend::start().await;
    let store = Arc::new(MemorySessionStore::new());
    let sink = Arc::new(RecordingSink::new());
    let client = backend.client(SessionHandle::new(store.clone()), Arc::clone(&sink));

    let user = client
        .login(SHOPPER_EMAIL, password())
        .await
        .expect("Login should succeed");

    assert_eq!(user.email, SHOPPER_EMAIL);
    assert!(!user.is_admin());
    assert!(store.is_stored());
    assert!(client.session().is_authenticated().await);
    assert_eq!(sink.navigations(), vec![Route::Home]);
}

#[tokio::test]
async fn test_bad_password_keeps_session_empty() {
    let backend = MockBackend::start().await;
    let sink = Arc::new(RecordingSink::new());
    let client = backend.client(SessionHandle::in_memory(), Arc::clone(&sink));

    let err = client
        .login(SHOPPER_EMAIL, SecretString::from("wrong".to_string()))
        .await
        .expect_err("Login should fail");

    assert_eq!(err.user_message(), "Invalid credentials");
    assert!(!client.session().is_authenticated().await);
    assert!(sink.navigations().is_empty());
}

#[tokio::test]
async fn test_malformed_email_is_not_sent() {
    let backend = MockBackend::start().await;
    let client = backend.client(SessionHandle::in_memory(), Arc::new(RecordingSink::new()));

    let result = client.login("not-an-email", password()).await;

    assert!(matches!(result, Err(ApiError::Validation(_))));
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn test_rejected_token_clears_session_and_redirects() {
    let backend = MockBackend::start().await;
    let store = Arc::new(MemorySessionStore::new());
    let sink = Arc::new(RecordingSink::new());
    let client = backend.client(SessionHandle::new(store.clone()), Arc::clone(&sink));
    client
        .login(ADMIN_EMAIL, password())
        .await
        .expect("Login should succeed");

    backend.revoke_tokens();
    let err = client
        .delete_product(&ProductId::new("p1"))
        .await
        .expect_err("Revoked token is rejected");

    assert!(err.is_unauthorized());
    assert!(!client.session().is_authenticated().await);
    assert!(!store.is_stored());
    assert_eq!(sink.navigations(), vec![Route::Home, Route::Login]);
    assert_eq!(backend.count(&Method::DELETE, "/products/p1"), 1);
}

#[tokio::test]
async fn test_late_rejection_keeps_newer_session() {
    let backend = MockBackend::start().await;
    let sink = Arc::new(RecordingSink::new());
    let client = backend.client(SessionHandle::in_memory(), Arc::clone(&sink));
    client
        .login(SHOPPER_EMAIL, password())
        .await
        .expect("Login should succeed");
    backend.revoke_shopper_token();
    backend.set_order_delay(Duration::from_millis(200));

    let (stale, relogin) = tokio::join!(client.orders(), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        client.login(ADMIN_EMAIL, password()).await
    });

    relogin.expect("Second login should succeed");
    assert!(stale.expect_err("Old token is rejected").is_unauthorized());
    let user = client.current_user().await.expect("New session survives");
    assert_eq!(user.email, ADMIN_EMAIL);
    assert!(!sink.navigations().contains(&Route::Login));
}

#[tokio::test]
async fn test_bearer_header_is_attached() {
    let backend = MockBackend::start().await;
    let client = backend.client(SessionHandle::in_memory(), Arc::new(RecordingSink::new()));
    client
        .login(SHOPPER_EMAIL, password())
        .await
        .expect("Login should succeed");

    client.orders().await.expect("Orders should load");

    let request = backend
        .requests()
        .into_iter()
        .find(|r| r.path == "/orders")
        .expect("Orders were requested");
    assert_eq!(request.authorization.as_deref(), Some("Bearer shopper-token"));
}

#[tokio::test]
async fn test_file_session_survives_restart() {
    let backend = MockBackend::start().await;
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("session.json");

    let first = backend.client(
        SessionHandle::new(Arc::new(FileSessionStore::new(&path))),
        Arc::new(RecordingSink::new()),
    );
    first
        .login(SHOPPER_EMAIL, password())
        .await
        .expect("Login should succeed");

    let restored = SessionHandle::restore(Arc::new(FileSessionStore::new(&path)))
        .expect("Stored session should load");
    let second = backend.client(restored, Arc::new(RecordingSink::new()));
    let user = second.current_user().await.expect("Session was restored");
    assert_eq!(user.email, SHOPPER_EMAIL);

    second.logout().await.expect("Logout should succeed");
    assert!(!path.exists());
}

#[tokio::test]
async fn test_profile_update_replaces_session_user() {
    let backend = MockBackend::start().await;
    let client = backend.client(SessionHandle::in_memory(), Arc::new(RecordingSink::new()));
    client
        .login(SHOPPER_EMAIL, password())
        .await
        .expect("Login should succeed");

    let update = ProfileUpdate {
        phone: Some("+91 98450 00000".to_string()),
        ..ProfileUpdate::default()
    };
    let user = client
        .update_profile(&update)
        .await
        .expect("Update should succeed");

    assert_eq!(user.phone.as_deref(), Some("+91 98450 00000"));
    let current = client.current_user().await.expect("Still logged in");
    assert_eq!(current.phone.as_deref(), Some("+91 98450 00000"));
}

#[tokio::test]
async fn test_signup_logs_in() {
    let backend = MockBackend::start().await;
    let client = backend.client(SessionHandle::in_memory(), Arc::new(RecordingSink::new()));

    let user = client
        .signup("Ravi Kumar", "ravi@tryla.in", password())
        .await
        .expect("Signup should succeed");

    assert_eq!(user.name, "Ravi Kumar");
    assert!(client.session().is_authenticated().await);
}
