//! Owned request lifecycle for a component.
//!
//! Each stateful component ([`CartStore`](crate::CartStore), the admin views)
//! runs its requests inside a [`RequestScope`]. Cancelling the scope (when the
//! component is torn down, or on Ctrl-C in the CLI) aborts every in-flight
//! request, and their responses are never written back into component state.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;

use crate::error::ApiError;

/// Cancellation boundary shared by the requests of one component.
///
/// Clones share the same cancellation flag.
#[derive(Debug, Clone)]
pub struct RequestScope {
    cancelled: Arc<watch::Sender<bool>>,
}

impl RequestScope {
    #[must_use]
    pub fn new() -> Self {
        let (cancelled, _) = watch::channel(false);
        Self {
            cancelled: Arc::new(cancelled),
        }
    }

    /// Run `request` unless the scope is cancelled first.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Cancelled` if the scope is, or becomes, cancelled
    /// before `request` finishes; otherwise whatever `request` returns.
    pub async fn run<T, F>(&self, request: F) -> Result<T, ApiError>
    where
        F: Future<Output = Result<T, ApiError>>,
    {
        if self.is_cancelled() {
            return Err(ApiError::Cancelled);
        }

        let mut cancelled = self.cancelled.subscribe();
        let until_cancelled = async move {
            loop {
                let is_cancelled = *cancelled.borrow_and_update();
                if is_cancelled || cancelled.changed().await.is_err() {
                    return;
                }
            }
        };

        tokio::select! {
            biased;
            () = until_cancelled => Err(ApiError::Cancelled),
            result = request => result,
        }
    }

    /// Abort every request running in this scope, now and later.
    pub fn cancel(&self) {
        if !self.cancelled.send_replace(true) {
            tracing::debug!("request scope cancelled");
        }
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.cancelled.borrow()
    }
}

impl Default for RequestScope {
    fn default() -> Self {
        Self::new()
    }
}
