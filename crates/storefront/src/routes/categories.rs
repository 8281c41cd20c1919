//! Category pass-through handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use tracing::instrument;
use tryla_client::types::Category;
use tryla_core::CategoryId;

use crate::error::{AppError, Result};
use crate::state::AppState;

/// `GET /api/categories` - the backend's category list, unchanged.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Category>>> {
    Ok(Json(state.api().categories().await?))
}

/// `GET /api/categories/{id}` - one category, picked out of the full list.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Category>> {
    let id = CategoryId::new(id);
    let categories = state.api().categories().await?;
    find_category(categories, &id)
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Category not found".to_string()))
}

fn find_category(categories: Vec<Category>, id: &CategoryId) -> Option<Category> {
    categories.into_iter().find(|category| &category.id == id)
}
