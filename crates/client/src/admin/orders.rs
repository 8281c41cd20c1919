//! Admin order list with status changes.

use tracing::instrument;
use tryla_core::{OrderId, OrderStatus};

use super::report;
use crate::client::ApiClient;
use crate::error::ApiError;
use crate::notify::Toast;
use crate::scope::RequestScope;
use crate::types::Order;

/// Every order, with a status control per row.
#[derive(Debug)]
pub struct OrderAdmin {
    client: ApiClient,
    orders: Vec<Order>,
    scope: RequestScope,
}

impl OrderAdmin {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            orders: Vec::new(),
            scope: RequestScope::new(),
        }
    }

    /// Fetch all orders, replacing what was shown.
    ///
    /// # Errors
    ///
    /// Returns the request error; the previous list is kept.
    #[instrument(skip(self))]
    pub async fn load(&mut self) -> Result<&[Order], ApiError> {
        match self.scope.run(self.client.orders()).await {
            Ok(orders) => {
                self.orders = orders;
                Ok(&self.orders)
            }
            Err(e) => Err(report(self.client.sink().as_ref(), "order", e)),
        }
    }

    #[must_use]
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    /// Loaded orders currently in `status`.
    pub fn with_status(&self, status: OrderStatus) -> impl Iterator<Item = &Order> {
        self.orders.iter().filter(move |order| order.status == status)
    }

    /// Move an order to `status`, then reload the list.
    ///
    /// # Errors
    ///
    /// Returns the request error.
    #[instrument(skip(self), fields(order_id = %id, status = %status))]
    pub async fn update_status(&mut self, id: &OrderId, status: OrderStatus) -> Result<(), ApiError> {
        if let Err(e) = self
            .scope
            .run(self.client.update_order_status(id, status))
            .await
        {
            return Err(report(self.client.sink().as_ref(), "order", e));
        }
        self.client
            .sink()
            .toast(Toast::success(format!("Order marked {status}")));
        let _ = self.load().await;
        Ok(())
    }

    /// Abort in-flight requests; their results are never applied.
    pub fn cancel(&self) {
        self.scope.cancel();
    }

    /// The scope this view's requests run in.
    #[must_use]
    pub const fn scope(&self) -> &RequestScope {
        &self.scope
    }
}
