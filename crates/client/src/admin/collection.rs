//! List-plus-form admin views for products and categories.

use std::fmt::Display;
use std::future::Future;

use tracing::{debug, instrument};
use tryla_core::{CategoryId, ProductId};

use super::draft::{CategoryDraft, ProductDraft};
use super::form::{DraftTarget, EditForm};
use super::{Confirm, report};
use crate::client::ApiClient;
use crate::error::{ApiError, ValidationError};
use crate::notify::Toast;
use crate::scope::RequestScope;
use crate::types::{Category, CategoryInput, Product, ProductInput};

/// A backend collection managed from the admin dashboard.
pub trait AdminResource: Send + Sync + 'static {
    type Item: Clone + Send + Sync;
    type Id: Clone + Display + PartialEq + Send + Sync;
    type Draft: Clone + Default + Send + Sync;
    type Input: Send + Sync;

    /// Singular noun used in prompts and toasts.
    const LABEL: &'static str;

    fn id(item: &Self::Item) -> &Self::Id;

    fn to_draft(item: &Self::Item) -> Self::Draft;

    /// # Errors
    ///
    /// Returns the first field that fails validation.
    fn validate(draft: &Self::Draft) -> Result<Self::Input, ValidationError>;

    fn list(client: &ApiClient) -> impl Future<Output = Result<Vec<Self::Item>, ApiError>> + Send;

    fn create(
        client: &ApiClient,
        input: &Self::Input,
    ) -> impl Future<Output = Result<Self::Item, ApiError>> + Send;

    fn update(
        client: &ApiClient,
        id: &Self::Id,
        input: &Self::Input,
    ) -> impl Future<Output = Result<Self::Item, ApiError>> + Send;

    fn delete(
        client: &ApiClient,
        id: &Self::Id,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;
}

/// Marker for the product catalog.
#[derive(Debug, Clone, Copy)]
pub struct Products;

impl AdminResource for Products {
    type Item = Product;
    type Id = ProductId;
    type Draft = ProductDraft;
    type Input = ProductInput;

    const LABEL: &'static str = "product";

    fn id(item: &Product) -> &ProductId {
        &item.id
    }

    fn to_draft(item: &Product) -> ProductDraft {
        ProductDraft::from(item)
    }

    fn validate(draft: &ProductDraft) -> Result<ProductInput, ValidationError> {
        draft.validate()
    }

    async fn list(client: &ApiClient) -> Result<Vec<Product>, ApiError> {
        client.products().await
    }

    async fn create(client: &ApiClient, input: &ProductInput) -> Result<Product, ApiError> {
        client.create_product(input).await
    }

    async fn update(
        client: &ApiClient,
        id: &ProductId,
        input: &ProductInput,
    ) -> Result<Product, ApiError> {
        client.update_product(id, input).await
    }

    async fn delete(client: &ApiClient, id: &ProductId) -> Result<(), ApiError> {
        client.delete_product(id).await
    }
}

/// Marker for product categories.
#[derive(Debug, Clone, Copy)]
pub struct Categories;

impl AdminResource for Categories {
    type Item = Category;
    type Id = CategoryId;
    type Draft = CategoryDraft;
    type Input = CategoryInput;

    const LABEL: &'static str = "category";

    fn id(item: &Category) -> &CategoryId {
        &item.id
    }

    fn to_draft(item: &Category) -> CategoryDraft {
        CategoryDraft::from(item)
    }

    fn validate(draft: &CategoryDraft) -> Result<CategoryInput, ValidationError> {
        draft.validate()
    }

    async fn list(client: &ApiClient) -> Result<Vec<Category>, ApiError> {
        client.categories().await
    }

    async fn create(client: &ApiClient, input: &CategoryInput) -> Result<Category, ApiError> {
        client.create_category(input).await
    }

    async fn update(
        client: &ApiClient,
        id: &CategoryId,
        input: &CategoryInput,
    ) -> Result<Category, ApiError> {
        client.update_category(id, input).await
    }

    async fn delete(client: &ApiClient, id: &CategoryId) -> Result<(), ApiError> {
        client.delete_category(id).await
    }
}

/// Admin view over one collection: the list, an edit form and deletion.
///
/// Every successful mutation is followed by a reload of the list.
pub struct AdminCollection<R: AdminResource> {
    client: ApiClient,
    items: Vec<R::Item>,
    form: EditForm<R::Draft, R::Id>,
    scope: RequestScope,
}

impl<R: AdminResource> AdminCollection<R> {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            items: Vec::new(),
            form: EditForm::new(),
            scope: RequestScope::new(),
        }
    }

    /// Fetch the list, replacing what was shown.
    ///
    /// # Errors
    ///
    /// Returns the request error; the previous list is kept.
    #[instrument(skip_all, fields(resource = R::LABEL))]
    pub async fn load(&mut self) -> Result<&[R::Item], ApiError> {
        match self.scope.run(R::list(&self.client)).await {
            Ok(items) => {
                debug!(count = items.len(), "admin list loaded");
                self.items = items;
                Ok(&self.items)
            }
            Err(e) => Err(report(self.client.sink().as_ref(), R::LABEL, e)),
        }
    }

    #[must_use]
    pub fn items(&self) -> &[R::Item] {
        &self.items
    }

    #[must_use]
    pub const fn form(&self) -> &EditForm<R::Draft, R::Id> {
        &self.form
    }

    /// Draft being edited, if the form is open.
    pub fn draft_mut(&mut self) -> Option<&mut R::Draft> {
        self.form.draft_mut()
    }

    /// Open an empty form for a new record.
    ///
    /// # Errors
    ///
    /// Returns an error while a submission is pending.
    pub fn begin_create(&mut self) -> Result<(), ApiError> {
        Ok(self.form.begin_create(R::Draft::default())?)
    }

    /// Open the form prefilled from a listed record.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if `id` is not in the loaded list, or an
    /// error while a submission is pending.
    pub fn begin_edit(&mut self, id: &R::Id) -> Result<(), ApiError> {
        let item = self
            .items
            .iter()
            .find(|item| R::id(item) == id)
            .ok_or_else(|| ApiError::NotFound(format!("No {} with id {id}", R::LABEL)))?;
        let draft = R::to_draft(item);
        Ok(self.form.begin_edit(id.clone(), draft)?)
    }

    /// Close the form without saving.
    pub fn cancel_edit(&mut self) {
        self.form.cancel();
    }

    /// Send the draft: POST for a new record, PATCH for an existing one.
    ///
    /// # Errors
    ///
    /// Returns a validation error (the form stays open), a form error if no
    /// draft is open or one is already being sent, or the request error.
    #[instrument(skip_all, fields(resource = R::LABEL))]
    pub async fn submit(&mut self) -> Result<R::Item, ApiError> {
        let (target, draft) = self.form.start_submit()?;

        let input = match R::validate(&draft) {
            Ok(input) => input,
            Err(e) => {
                self.form.reject(e.to_string());
                return Err(report(self.client.sink().as_ref(), R::LABEL, e.into()));
            }
        };

        let result = match &target {
            DraftTarget::New => self.scope.run(R::create(&self.client, &input)).await,
            DraftTarget::Existing(id) => {
                self.scope
                    .run(R::update(&self.client, id, &input))
                    .await
            }
        };

        match result {
            Ok(item) => {
                self.form.finish(None);
                let verb = match target {
                    DraftTarget::New => "created",
                    DraftTarget::Existing(_) => "updated",
                };
                self.client
                    .sink()
                    .toast(Toast::success(format!("{} {verb}", capitalize(R::LABEL))));
                self.reload().await;
                Ok(item)
            }
            Err(e) => {
                self.form.finish(Some(e.user_message()));
                Err(report(self.client.sink().as_ref(), R::LABEL, e))
            }
        }
    }

    /// Delete a record after `confirm` agrees. Returns whether it was deleted.
    ///
    /// # Errors
    ///
    /// Returns the request error.
    #[instrument(skip_all, fields(resource = R::LABEL, id = %id))]
    pub async fn delete(&mut self, id: &R::Id, confirm: &dyn Confirm) -> Result<bool, ApiError> {
        if !confirm.confirm(&format!("Delete this {}?", R::LABEL)) {
            debug!("delete declined");
            return Ok(false);
        }

        if let Err(e) = self.scope.run(R::delete(&self.client, id)).await {
            return Err(report(self.client.sink().as_ref(), R::LABEL, e));
        }
        self.client
            .sink()
            .toast(Toast::success(format!("{} deleted", capitalize(R::LABEL))));
        self.reload().await;
        Ok(true)
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

    /// Refetch after a mutation. A failure is already reported by `load`
    /// and does not undo the mutation.
    async fn reload(&mut self) {
        let _ = self.load().await;
    }
}

impl<R: AdminResource> std::fmt::Debug for AdminCollection<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminCollection")
            .field("resource", &R::LABEL)
            .field("items", &self.items.len())
            .field("state", &self.form.state())
            .finish_non_exhaustive()
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}
