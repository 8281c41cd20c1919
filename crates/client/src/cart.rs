//! Shopping cart mirror.
//!
//! [`CartStore`] keeps an in-memory copy of the server-side cart. The server
//! is the only source of truth: every mutation is followed by a full refetch
//! (except `clear_cart`, which empties the local list directly), and every
//! fetch replaces the list wholesale. With overlapping operations the
//! last-arriving fetch response wins.
//!
//! There is no retry, backoff or offline queue. Failures are logged and
//! reported as error toasts.

use std::future::Future;
use std::sync::Arc;

use reqwest::Method;
use tokio::sync::RwLock;
use tracing::{debug, instrument};
use tryla_core::{Price, ProductId};

use crate::client::{ApiClient, Auth};
use crate::error::{ApiError, ValidationError};
use crate::notify::{Route, Toast, UiSink};
use crate::scope::RequestScope;
use crate::types::{AddToCart, CartItem, CartPayload, QuantityUpdate};

/// Remote cart operations used by [`CartStore`].
pub trait CartBackend: Send + Sync {
    /// Whether a session token is available.
    fn has_session(&self) -> impl Future<Output = bool> + Send;

    /// `GET /cart`.
    fn get_cart(&self) -> impl Future<Output = Result<Vec<CartItem>, ApiError>> + Send;

    /// `POST /cart`.
    fn add_item(&self, item: &AddToCart) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// `PATCH /cart/:productId`.
    fn update_item(
        &self,
        product_id: &ProductId,
        quantity: u32,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// `DELETE /cart/:productId`.
    fn remove_item(
        &self,
        product_id: &ProductId,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// `DELETE /cart`.
    fn clear(&self) -> impl Future<Output = Result<(), ApiError>> + Send;
}

impl CartBackend for ApiClient {
    async fn has_session(&self) -> bool {
        self.session().is_authenticated().await
    }

    async fn get_cart(&self) -> Result<Vec<CartItem>, ApiError> {
        let payload: CartPayload = self
            .send_json::<_, ()>(Method::GET, &["cart"], Auth::Bearer, None)
            .await?;
        Ok(payload.into())
    }

    async fn add_item(&self, item: &AddToCart) -> Result<(), ApiError> {
        self.send_unit(Method::POST, &["cart"], Auth::Bearer, Some(item))
            .await
    }

    async fn update_item(&self, product_id: &ProductId, quantity: u32) -> Result<(), ApiError> {
        self.send_unit(
            Method::PATCH,
            &["cart", product_id.as_str()],
            Auth::Bearer,
            Some(&QuantityUpdate { quantity }),
        )
        .await
    }

    async fn remove_item(&self, product_id: &ProductId) -> Result<(), ApiError> {
        self.send_unit::<()>(
            Method::DELETE,
            &["cart", product_id.as_str()],
            Auth::Bearer,
            None,
        )
        .await
    }

    async fn clear(&self) -> Result<(), ApiError> {
        self.send_unit::<()>(Method::DELETE, &["cart"], Auth::Bearer, None)
            .await
    }
}

/// How a cart operation ended when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartOutcome {
    /// The server accepted the change (or returned the cart).
    Updated,
    /// No session; the user was sent to the login page instead.
    LoginRequired,
    /// No session; nothing to fetch.
    Skipped,
}

/// In-memory mirror of the server cart.
pub struct CartStore<B = ApiClient> {
    backend: B,
    sink: Arc<dyn UiSink>,
    items: RwLock<Vec<CartItem>>,
    scope: RequestScope,
}

impl CartStore<ApiClient> {
    /// Cart backed by the REST client, reporting to the client's sink.
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        let sink = Arc::clone(client.sink());
        Self::with_backend(client, sink)
    }
}

impl<B: CartBackend> CartStore<B> {
    #[must_use]
    pub fn with_backend(backend: B, sink: Arc<dyn UiSink>) -> Self {
        Self {
            backend,
            sink,
            items: RwLock::new(Vec::new()),
            scope: RequestScope::new(),
        }
    }

    /// Replace the local list with the server cart.
    ///
    /// Does nothing without a session.
    ///
    /// # Errors
    ///
    /// Returns the request error; the local list is left untouched.
    #[instrument(skip(self))]
    pub async fn fetch_cart(&self) -> Result<CartOutcome, ApiError> {
        if !self.backend.has_session().await {
            debug!("no session, skipping cart fetch");
            return Ok(CartOutcome::Skipped);
        }

        match self.scope.run(self.backend.get_cart()).await {
            Ok(items) => {
                debug!(lines = items.len(), "cart fetched");
                *self.items.write().await = items;
                Ok(CartOutcome::Updated)
            }
            Err(e) => Err(self.report("fetch", e)),
        }
    }

    /// Add `quantity` of a product in `size`, then refetch.
    ///
    /// Without a session the user is sent to the login page and nothing is
    /// sent.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank size or a zero quantity (no
    /// request is made), or the request error.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add_to_cart(
        &self,
        product_id: &ProductId,
        quantity: u32,
        size: &str,
    ) -> Result<CartOutcome, ApiError> {
        let size = size.trim();
        if size.is_empty() {
            return Err(self.report("add", ValidationError::EmptySize.into()));
        }
        if quantity == 0 {
            return Err(self.report("add", ValidationError::ZeroQuantity.into()));
        }
        if !self.backend.has_session().await {
            debug!("no session, redirecting to login");
            self.sink.navigate(Route::Login);
            return Ok(CartOutcome::LoginRequired);
        }

        let item = AddToCart {
            product_id: product_id.clone(),
            quantity,
            size: size.to_string(),
        };
        if let Err(e) = self.scope.run(self.backend.add_item(&item)).await {
            return Err(self.report("add", e));
        }

        self.sink.toast(Toast::success("Added to cart"));
        self.fetch_cart().await?;
        Ok(CartOutcome::Updated)
    }

    /// Set a line's quantity, then refetch. Zero removes the line.
    ///
    /// # Errors
    ///
    /// Returns the request error.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn update_quantity(
        &self,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<CartOutcome, ApiError> {
        if quantity == 0 {
            return self.remove_from_cart(product_id).await;
        }

        if let Err(e) = self
            .scope
            .run(self.backend.update_item(product_id, quantity))
            .await
        {
            return Err(self.report("update", e));
        }
        self.fetch_cart().await?;
        Ok(CartOutcome::Updated)
    }

    /// Remove a line, then refetch.
    ///
    /// # Errors
    ///
    /// Returns the request error.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove_from_cart(&self, product_id: &ProductId) -> Result<CartOutcome, ApiError> {
        if let Err(e) = self.scope.run(self.backend.remove_item(product_id)).await {
            return Err(self.report("remove", e));
        }
        self.sink.toast(Toast::info("Removed from cart"));
        self.fetch_cart().await?;
        Ok(CartOutcome::Updated)
    }

    /// Empty the server cart and the local list. Does not refetch.
    ///
    /// # Errors
    ///
    /// Returns the request error; the local list is left untouched.
    #[instrument(skip(self))]
    pub async fn clear_cart(&self) -> Result<CartOutcome, ApiError> {
        if let Err(e) = self.scope.run(self.backend.clear()).await {
            return Err(self.report("clear", e));
        }
        self.items.write().await.clear();
        Ok(CartOutcome::Updated)
    }

    /// Snapshot of the current lines.
    pub async fn items(&self) -> Vec<CartItem> {
        self.items.read().await.clone()
    }

    /// Sum of quantities over the current lines.
    pub async fn total_items(&self) -> u64 {
        self.items
            .read()
            .await
            .iter()
            .map(|item| u64::from(item.quantity))
            .sum()
    }

    /// Sum of price × quantity over the current lines.
    pub async fn total_price(&self) -> Price {
        self.items.read().await.iter().map(CartItem::line_total).sum()
    }

    /// Abort in-flight requests; their responses are never applied.
    pub fn cancel(&self) {
        self.scope.cancel();
    }

    /// The scope this cart's requests run in.
    #[must_use]
    pub const fn scope(&self) -> &RequestScope {
        &self.scope
    }

    fn report(&self, action: &'static str, err: ApiError) -> ApiError {
        if matches!(err, ApiError::Cancelled) {
            debug!(action, "cart request cancelled");
            return err;
        }
        tracing::warn!(action, error = %err, "cart request failed");
        self.sink.toast(Toast::error(err.user_message()));
        err
    }
}

impl<B> std::fmt::Debug for CartStore<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    use reqwest::StatusCode;
    use tokio::sync::oneshot;

    use super::*;
    use crate::notify::{RecordingSink, ToastLevel};

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        GetCart,
        Add(String, u32, String),
        Update(String, u32),
        Remove(String),
        Clear,
    }

    enum Reply {
        Ready(Result<Vec<CartItem>, ApiError>),
        Gated(oneshot::Receiver<Vec<CartItem>>),
    }

    #[derive(Default)]
    struct FakeBackend {
        logged_in: AtomicBool,
        replies: Mutex<VecDeque<Reply>>,
        add_error: Mutex<Option<ApiError>>,
        calls: Mutex<Vec<Call>>,
    }

    impl FakeBackend {
        fn logged_in() -> Self {
            let backend = Self::default();
            backend.logged_in.store(true, Ordering::SeqCst);
            backend
        }

        fn reply(&self, items: Vec<CartItem>) {
            self.replies
                .lock()
                .unwrap()
                .push_back(Reply::Ready(Ok(items)));
        }

        fn fail_next_fetch(&self, err: ApiError) {
            self.replies.lock().unwrap().push_back(Reply::Ready(Err(err)));
        }

        fn gate(&self) -> oneshot::Sender<Vec<CartItem>> {
            let (tx, rx) = oneshot::channel();
            self.replies.lock().unwrap().push_back(Reply::Gated(rx));
            tx
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: Call) {
            self.calls.lock().unwrap().push(call);
        }
    }

    impl CartBackend for FakeBackend {
        async fn has_session(&self) -> bool {
            self.logged_in.load(Ordering::SeqCst)
        }

        async fn get_cart(&self) -> Result<Vec<CartItem>, ApiError> {
            self.record(Call::GetCart);
            let reply = self.replies.lock().unwrap().pop_front();
            match reply {
                Some(Reply::Ready(result)) => result,
                Some(Reply::Gated(rx)) => rx.await.map_err(|_| ApiError::Cancelled),
                None => Ok(Vec::new()),
            }
        }

        async fn add_item(&self, item: &AddToCart) -> Result<(), ApiError> {
            self.record(Call::Add(
                item.product_id.to_string(),
                item.quantity,
                item.size.clone(),
            ));
            self.add_error.lock().unwrap().take().map_or(Ok(()), Err)
        }

        async fn update_item(&self, product_id: &ProductId, quantity: u32) -> Result<(), ApiError> {
            self.record(Call::Update(product_id.to_string(), quantity));
            Ok(())
        }

        async fn remove_item(&self, product_id: &ProductId) -> Result<(), ApiError> {
            self.record(Call::Remove(product_id.to_string()));
            Ok(())
        }

        async fn clear(&self) -> Result<(), ApiError> {
            self.record(Call::Clear);
            Ok(())
        }
    }

    fn item(product_id: &str, price: i64, quantity: u32) -> CartItem {
        CartItem {
            product_id: ProductId::new(product_id),
            quantity,
            size: Some("M".to_string()),
            price: Price::from_minor(price),
            title: None,
            image: None,
        }
    }

    fn store(backend: FakeBackend) -> (CartStore<FakeBackend>, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::new());
        let store = CartStore::with_backend(backend, sink.clone());
        (store, sink)
    }

    #[tokio::test]
    async fn test_empty_size_rejected_without_request() {
        let (store, sink) = store(FakeBackend::logged_in());

        for size in ["", "   "] {
            let err = store
                .add_to_cart(&ProductId::new("p1"), 1, size)
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                ApiError::Validation(ValidationError::EmptySize)
            ));
        }

        assert!(store.backend.calls().is_empty());
        let toasts = sink.toasts();
        assert_eq!(toasts.len(), 2);
        assert_eq!(toasts[0].message, "Please select a size");
    }

    #[tokio::test]
    async fn test_zero_quantity_rejected_without_request() {
        let (store, _sink) = store(FakeBackend::logged_in());
        let err = store
            .add_to_cart(&ProductId::new("p1"), 0, "M")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ApiError::Validation(ValidationError::ZeroQuantity)
        ));
        assert!(store.backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_add_without_session_redirects_to_login() {
        let (store, sink) = store(FakeBackend::default());

        let outcome = store
            .add_to_cart(&ProductId::new("p1"), 2, "M")
            .await
            .unwrap();

        assert_eq!(outcome, CartOutcome::LoginRequired);
        assert_eq!(sink.navigations(), vec![Route::Login]);
        assert!(store.backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_without_session_is_silent() {
        let (store, sink) = store(FakeBackend::default());
        assert_eq!(store.fetch_cart().await.unwrap(), CartOutcome::Skipped);
        assert!(store.backend.calls().is_empty());
        assert!(sink.events().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_computes_totals() {
        let backend = FakeBackend::logged_in();
        backend.reply(vec![item("p1", 499, 2)]);
        let (store, _sink) = store(backend);

        store.fetch_cart().await.unwrap();

        assert_eq!(store.total_items().await, 2);
        assert_eq!(store.total_price().await, Price::from_minor(998));
    }

    #[tokio::test]
    async fn test_refetch_replaces_list() {
        let backend = FakeBackend::logged_in();
        backend.reply(vec![item("p1", 499, 2), item("p2", 100, 1)]);
        backend.reply(vec![item("p3", 250, 3)]);
        let (store, _sink) = store(backend);

        store.fetch_cart().await.unwrap();
        assert_eq!(store.total_items().await, 3);

        store.fetch_cart().await.unwrap();
        assert_eq!(store.items().await, vec![item("p3", 250, 3)]);
        assert_eq!(store.total_items().await, 3);
        assert_eq!(store.total_price().await, Price::from_minor(750));
    }

    #[tokio::test]
    async fn test_fetch_failure_keeps_list_and_toasts() {
        let backend = FakeBackend::logged_in();
        backend.reply(vec![item("p1", 499, 2)]);
        backend.fail_next_fetch(ApiError::Status {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "Database unavailable".to_string(),
        });
        let (store, sink) = store(backend);

        store.fetch_cart().await.unwrap();
        assert!(store.fetch_cart().await.is_err());

        assert_eq!(store.items().await, vec![item("p1", 499, 2)]);
        let toasts = sink.toasts();
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].level, ToastLevel::Error);
        assert_eq!(toasts[0].message, "Database unavailable");
    }

    #[tokio::test]
    async fn test_add_refetches_and_toasts_success() {
        let backend = FakeBackend::logged_in();
        backend.reply(vec![item("p1", 499, 2)]);
        let (store, sink) = store(backend);

        let outcome = store
            .add_to_cart(&ProductId::new("p1"), 2, " M ")
            .await
            .unwrap();

        assert_eq!(outcome, CartOutcome::Updated);
        assert_eq!(
            store.backend.calls(),
            vec![
                Call::Add("p1".to_string(), 2, "M".to_string()),
                Call::GetCart
            ]
        );
        assert_eq!(store.total_items().await, 2);
        assert_eq!(sink.toasts(), vec![Toast::success("Added to cart")]);
    }

    #[tokio::test]
    async fn test_add_failure_surfaces_server_message() {
        let backend = FakeBackend::logged_in();
        *backend.add_error.lock().unwrap() = Some(ApiError::Status {
            status: StatusCode::BAD_REQUEST,
            message: "Out of stock".to_string(),
        });
        let (store, sink) = store(backend);

        assert!(
            store
                .add_to_cart(&ProductId::new("p1"), 1, "L")
                .await
                .is_err()
        );

        assert_eq!(
            store.backend.calls(),
            vec![Call::Add("p1".to_string(), 1, "L".to_string())]
        );
        assert_eq!(sink.toasts(), vec![Toast::error("Out of stock")]);
    }

    #[tokio::test]
    async fn test_update_quantity_sends_patch() {
        let (store, _sink) = store(FakeBackend::logged_in());
        store
            .update_quantity(&ProductId::new("p1"), 3)
            .await
            .unwrap();
        assert_eq!(
            store.backend.calls(),
            vec![Call::Update("p1".to_string(), 3), Call::GetCart]
        );
    }

    #[tokio::test]
    async fn test_update_quantity_zero_removes() {
        let (store, _sink) = store(FakeBackend::logged_in());
        store
            .update_quantity(&ProductId::new("p1"), 0)
            .await
            .unwrap();
        assert_eq!(
            store.backend.calls(),
            vec![Call::Remove("p1".to_string()), Call::GetCart]
        );
    }

    #[tokio::test]
    async fn test_clear_resets_without_refetch() {
        let backend = FakeBackend::logged_in();
        backend.reply(vec![item("p1", 499, 2)]);
        let (store, _sink) = store(backend);

        store.fetch_cart().await.unwrap();
        store.clear_cart().await.unwrap();

        assert!(store.items().await.is_empty());
        assert_eq!(store.total_price().await, Price::ZERO);
        assert_eq!(store.backend.calls(), vec![Call::GetCart, Call::Clear]);
    }

    #[tokio::test]
    async fn test_cancelled_fetch_is_not_applied() {
        let backend = FakeBackend::logged_in();
        let gate = backend.gate();
        let (store, sink) = store(backend);
        let store = Arc::new(store);

        let fetch = tokio::spawn({
            let store = Arc::clone(&store);
            async move { store.fetch_cart().await }
        });
        while store.backend.calls().is_empty() {
            tokio::task::yield_now().await;
        }

        store.cancel();
        let result = tokio::time::timeout(Duration::from_secs(5), fetch)
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(result, Err(ApiError::Cancelled)));

        // A late response has nowhere to go.
        let _ = gate.send(vec![item("p1", 499, 2)]);
        assert!(store.items().await.is_empty());
        assert!(sink.toasts().is_empty());
    }

    #[tokio::test]
    async fn test_out_of_order_fetches_last_arrival_wins() {
        let backend = FakeBackend::logged_in();
        let first = backend.gate();
        let second = backend.gate();
        let (store, _sink) = store(backend);
        let store = Arc::new(store);

        let adds: Vec<_> = ["p1", "p2"]
            .into_iter()
            .map(|id| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.add_to_cart(&ProductId::new(id), 1, "M").await })
            })
            .collect();

        let early = vec![item("p2", 100, 1)];
        let late = vec![item("p1", 499, 1)];

        second.send(early.clone()).unwrap();
        tokio::time::timeout(Duration::from_secs(5), async {
            while store.items().await != early {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();

        first.send(late.clone()).unwrap();
        for add in adds {
            add.await.unwrap().unwrap();
        }

        assert_eq!(store.items().await, late);
        assert_eq!(store.total_items().await, 1);
    }
}
