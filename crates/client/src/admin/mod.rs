//! Admin dashboard views.
//!
//! [`AdminCollection`] drives the product and category screens: a list that
//! is fetched on load, an [`EditForm`] for creating or editing one record, and
//! confirmed deletion. [`OrderAdmin`] lists orders and changes their status.
//! Every mutation is followed by a full reload of the list.

mod collection;
mod draft;
mod form;
mod orders;

pub use collection::{AdminCollection, AdminResource, Categories, Products};
pub use draft::{CategoryDraft, ProductDraft};
pub use form::{DraftTarget, EditForm, FormError, FormState};
pub use orders::OrderAdmin;

use tracing::debug;

use crate::error::ApiError;
use crate::notify::{Toast, UiSink};

/// Asks the user to approve a destructive action.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Log a failed admin action and show it as an error toast.
fn report(sink: &dyn UiSink, resource: &'static str, err: ApiError) -> ApiError {
    if matches!(err, ApiError::Cancelled) {
        debug!(resource, "admin request cancelled");
        return err;
    }
    tracing::warn!(resource, error = %err, "admin request failed");
    sink.toast(Toast::error(err.user_message()));
    err
}
