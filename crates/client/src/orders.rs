//! Order history, checkout and admin status changes.

use reqwest::Method;
use tracing::instrument;
use tryla_core::{OrderId, OrderStatus};

use crate::client::{ApiClient, Auth};
use crate::error::ApiError;
use crate::types::{CheckoutRequest, Order, OrdersPayload, StatusUpdate};

impl ApiClient {
    /// Orders visible to the session (`GET /orders`).
    ///
    /// Shoppers see their own orders; admins see every order.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotAuthenticated` without a session, or an error if
    /// the request fails.
    #[instrument(skip(self))]
    pub async fn orders(&self) -> Result<Vec<Order>, ApiError> {
        let payload: OrdersPayload = self
            .send_json::<_, ()>(Method::GET, &["orders"], Auth::Bearer, None)
            .await?;
        Ok(payload.into())
    }

    /// One order (`GET /orders/:id`).
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the order does not exist, or another
    /// error if the request fails.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn order(&self, id: &OrderId) -> Result<Order, ApiError> {
        self.send_json::<_, ()>(Method::GET, &["orders", id.as_str()], Auth::Bearer, None)
            .await
    }

    /// Turn the server cart into an order (`POST /orders`).
    ///
    /// # Errors
    ///
    /// Returns the backend's error if checkout is refused (an empty cart,
    /// for instance).
    #[instrument(skip(self, request), fields(payment = ?request.payment_method))]
    pub async fn place_order(&self, request: &CheckoutRequest) -> Result<Order, ApiError> {
        let order: Order = self
            .send_json(Method::POST, &["orders"], Auth::Bearer, Some(request))
            .await?;
        tracing::info!(order_id = %order.id, total = %order.total, "order placed");
        Ok(order)
    }

    /// Move an order to another status (`PATCH /orders/:id/status`).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the session is rejected.
    #[instrument(skip(self), fields(order_id = %id, status = %status))]
    pub async fn update_order_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
    ) -> Result<(), ApiError> {
        self.send_unit(
            Method::PATCH,
            &["orders", id.as_str(), "status"],
            Auth::Bearer,
            Some(&StatusUpdate { status }),
        )
        .await
    }
}
