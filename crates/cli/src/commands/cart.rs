//! Cart commands.
//!
//! Every command goes through [`CartStore`], so the CLI sees the same
//! validation, login redirect and refetch behavior as the storefront.

use tryla_client::{ApiError, CartOutcome, CartStore};
use tryla_core::ProductId;

use super::{Context, cancel_on_interrupt};
use crate::output::{self, CartView};

type CommandResult = Result<(), Box<dyn std::error::Error>>;

fn store(ctx: &Context) -> CartStore {
    let store = CartStore::new(ctx.client.clone());
    cancel_on_interrupt(store.scope().clone());
    store
}

async fn print(ctx: &Context, store: &CartStore) -> CommandResult {
    let view = CartView {
        items: store.items().await,
        total_items: store.total_items().await,
        total_price: store.total_price().await,
    };
    ctx.out.show(&view, output::cart)?;
    Ok(())
}

/// Map a login redirect to a failing exit status.
fn require_session(outcome: CartOutcome) -> Result<(), ApiError> {
    match outcome {
        CartOutcome::Updated => Ok(()),
        CartOutcome::LoginRequired | CartOutcome::Skipped => Err(ApiError::NotAuthenticated),
    }
}

pub async fn show(ctx: &Context) -> CommandResult {
    let store = store(ctx);
    require_session(store.fetch_cart().await?)?;
    print(ctx, &store).await
}

pub async fn add(ctx: &Context, product_id: &str, quantity: u32, size: &str) -> CommandResult {
    let store = store(ctx);
    require_session(
        store
            .add_to_cart(&ProductId::new(product_id), quantity, size)
            .await?,
    )?;
    print(ctx, &store).await
}

pub async fn update(ctx: &Context, product_id: &str, quantity: u32) -> CommandResult {
    let store = store(ctx);
    require_session(
        store
            .update_quantity(&ProductId::new(product_id), quantity)
            .await?,
    )?;
    print(ctx, &store).await
}

pub async fn remove(ctx: &Context, product_id: &str) -> CommandResult {
    let store = store(ctx);
    require_session(store.remove_from_cart(&ProductId::new(product_id)).await?)?;
    print(ctx, &store).await
}

pub async fn clear(ctx: &Context) -> CommandResult {
    let store = store(ctx);
    require_session(store.clear_cart().await?)?;
    ctx.out.message("Cart cleared.");
    Ok(())
}
