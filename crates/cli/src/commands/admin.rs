//! Admin dashboard commands.
//!
//! Create and update go through the same [`EditForm`] cycle as the web
//! dashboard: open the form, fill the draft, submit. On update, flags that
//! were not passed keep the value loaded from the backend.
//!
//! [`EditForm`]: tryla_client::admin::EditForm

use std::io::{self, BufRead, Write};

use tryla_client::admin::{
    AdminCollection, AdminResource, Categories, CategoryDraft, FormError, OrderAdmin, ProductDraft,
    Products,
};
use tryla_client::ApiError;
use tryla_core::{CategoryId, OrderId, OrderStatus, ProductId};

use super::{Context, cancel_on_interrupt};
use crate::output;
use crate::{CategoryFields, ProductFields};

type CommandResult = Result<(), Box<dyn std::error::Error>>;

fn collection<R: AdminResource>(ctx: &Context) -> AdminCollection<R> {
    let collection = AdminCollection::new(ctx.client.clone());
    cancel_on_interrupt(collection.scope().clone());
    collection
}

/// Open the form prefilled from the backend, or empty for a new record.
async fn open_form<R: AdminResource>(
    collection: &mut AdminCollection<R>,
    id: Option<&R::Id>,
) -> Result<(), ApiError> {
    match id {
        Some(id) => {
            collection.load().await?;
            collection.begin_edit(id)
        }
        None => collection.begin_create(),
    }
}

fn draft<R: AdminResource>(collection: &mut AdminCollection<R>) -> Result<&mut R::Draft, ApiError> {
    collection
        .draft_mut()
        .ok_or(ApiError::Form(FormError::NotEditing))
}

fn overlay(field: &mut String, value: Option<String>) {
    if let Some(value) = value {
        *field = value;
    }
}

fn apply_product(draft: &mut ProductDraft, fields: ProductFields) {
    overlay(&mut draft.title, fields.title);
    overlay(&mut draft.description, fields.description);
    overlay(&mut draft.price, fields.price);
    overlay(&mut draft.stock, fields.stock);
    overlay(&mut draft.category, fields.category);
    overlay(&mut draft.images, fields.images);
    overlay(&mut draft.sizes, fields.sizes);
    overlay(&mut draft.features, fields.features);
    overlay(&mut draft.care, fields.care);
    overlay(&mut draft.fit, fields.fit);
    overlay(&mut draft.material, fields.material);
}

fn apply_category(draft: &mut CategoryDraft, fields: CategoryFields) {
    overlay(&mut draft.name, fields.name);
    overlay(&mut draft.description, fields.description);
    overlay(&mut draft.image, fields.image);
}

/// Ask on the terminal; anything but `y`/`yes` declines.
#[allow(clippy::print_stderr)]
fn prompt(question: &str) -> bool {
    eprint!("{question} [y/N] ");
    let _ = io::stderr().flush();
    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

fn confirmer(yes: bool) -> impl Fn(&str) -> bool {
    move |question| yes || prompt(question)
}

// =============================================================================
// Products
// =============================================================================

pub async fn list_products(ctx: &Context) -> CommandResult {
    let mut products = collection::<Products>(ctx);
    let items = products.load().await?;
    ctx.out.show(items, output::products)?;
    Ok(())
}

pub async fn create_product(ctx: &Context, fields: ProductFields) -> CommandResult {
    let mut products = collection::<Products>(ctx);
    open_form(&mut products, None).await?;
    apply_product(draft(&mut products)?, fields);
    let product = products.submit().await?;
    ctx.out.show(&product, output::product)?;
    Ok(())
}

pub async fn update_product(ctx: &Context, id: &str, fields: ProductFields) -> CommandResult {
    let id = ProductId::new(id);
    let mut products = collection::<Products>(ctx);
    open_form(&mut products, Some(&id)).await?;
    apply_product(draft(&mut products)?, fields);
    let product = products.submit().await?;
    ctx.out.show(&product, output::product)?;
    Ok(())
}

pub async fn delete_product(ctx: &Context, id: &str, yes: bool) -> CommandResult {
    let mut products = collection::<Products>(ctx);
    if products.delete(&ProductId::new(id), &confirmer(yes)).await? {
        ctx.out.message("Product deleted.");
    } else {
        ctx.out.message("Cancelled.");
    }
    Ok(())
}

// =============================================================================
// Categories
// =============================================================================

pub async fn list_categories(ctx: &Context) -> CommandResult {
    let mut categories = collection::<Categories>(ctx);
    let items = categories.load().await?;
    ctx.out.show(items, output::categories)?;
    Ok(())
}

pub async fn create_category(ctx: &Context, fields: CategoryFields) -> CommandResult {
    let mut categories = collection::<Categories>(ctx);
    open_form(&mut categories, None).await?;
    apply_category(draft(&mut categories)?, fields);
    let category = categories.submit().await?;
    ctx.out.show(&category, output::category)?;
    Ok(())
}

pub async fn update_category(ctx: &Context, id: &str, fields: CategoryFields) -> CommandResult {
    let id = CategoryId::new(id);
    let mut categories = collection::<Categories>(ctx);
    open_form(&mut categories, Some(&id)).await?;
    apply_category(draft(&mut categories)?, fields);
    let category = categories.submit().await?;
    ctx.out.show(&category, output::category)?;
    Ok(())
}

pub async fn delete_category(ctx: &Context, id: &str, yes: bool) -> CommandResult {
    let mut categories = collection::<Categories>(ctx);
    if categories.delete(&CategoryId::new(id), &confirmer(yes)).await? {
        ctx.out.message("Category deleted.");
    } else {
        ctx.out.message("Cancelled.");
    }
    Ok(())
}

// =============================================================================
// Orders
// =============================================================================

pub async fn list_orders(ctx: &Context, status: Option<OrderStatus>) -> CommandResult {
    let mut admin = OrderAdmin::new(ctx.client.clone());
    cancel_on_interrupt(admin.scope().clone());
    admin.load().await?;

    let orders: Vec<_> = match status {
        Some(status) => admin.with_status(status).cloned().collect(),
        None => admin.orders().to_vec(),
    };
    ctx.out.show(&orders[..], output::orders)?;
    Ok(())
}

pub async fn set_order_status(ctx: &Context, id: &str, status: OrderStatus) -> CommandResult {
    let mut admin = OrderAdmin::new(ctx.client.clone());
    cancel_on_interrupt(admin.scope().clone());
    admin.update_status(&OrderId::new(id), status).await?;
    ctx.out.message(&format!("Order {id} is now {status}."));
    Ok(())
}
