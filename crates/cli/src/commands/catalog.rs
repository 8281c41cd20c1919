//! Product and category browsing.

use tryla_client::types::{Availability, ProductFilter};
use tryla_core::{CategoryId, ProductId};

use super::Context;
use crate::output;

type CommandResult = Result<(), Box<dyn std::error::Error>>;

pub async fn list_products(ctx: &Context) -> CommandResult {
    let products = ctx.run(ctx.client.products()).await?;
    ctx.out.show(&products[..], output::products)?;
    Ok(())
}

pub async fn show_product(ctx: &Context, id: &str) -> CommandResult {
    let product = ctx.run(ctx.client.product(&ProductId::new(id))).await?;
    ctx.out.show(&product, output::product)?;
    Ok(())
}

pub async fn featured(ctx: &Context) -> CommandResult {
    let products = ctx.run(ctx.client.featured_products()).await?;
    ctx.out.show(&products[..], output::products)?;
    Ok(())
}

pub async fn filter(
    ctx: &Context,
    category: Option<String>,
    in_stock: bool,
    out_of_stock: bool,
    sizes: Vec<String>,
) -> CommandResult {
    let availability = if in_stock {
        Some(Availability::InStock)
    } else if out_of_stock {
        Some(Availability::OutOfStock)
    } else {
        None
    };
    let filter = ProductFilter {
        category: category.map(CategoryId::new),
        availability,
        sizes,
    };
    tracing::debug!(?filter, "filtering products");

    let products = ctx.run(ctx.client.filter_products(&filter)).await?;
    ctx.out.show(&products[..], output::products)?;
    Ok(())
}

pub async fn search(ctx: &Context, query: &str) -> CommandResult {
    let products = ctx.run(ctx.client.search_products(query)).await?;
    ctx.out.show(&products[..], output::products)?;
    Ok(())
}

pub async fn list_categories(ctx: &Context) -> CommandResult {
    let categories = ctx.run(ctx.client.categories()).await?;
    ctx.out.show(&categories[..], output::categories)?;
    Ok(())
}

pub async fn show_category(ctx: &Context, id: &str) -> CommandResult {
    let category = ctx.run(ctx.client.category(&CategoryId::new(id))).await?;
    ctx.out.show(&category, output::category)?;
    Ok(())
}

pub async fn category_products(ctx: &Context, id: &str) -> CommandResult {
    let products = ctx
        .run(ctx.client.category_products(&CategoryId::new(id)))
        .await?;
    ctx.out.show(&products[..], output::products)?;
    Ok(())
}
