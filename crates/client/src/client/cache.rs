//! Cache types for catalog responses.

use std::sync::Arc;

use tryla_core::{CategoryId, ProductId};

use crate::types::{Category, Product};

/// Cache key for catalog reads.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Products,
    Featured,
    Product(ProductId),
    Categories,
    Category(CategoryId),
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Products(Arc<Vec<Product>>),
    Product(Box<Product>),
    Categories(Arc<Vec<Category>>),
    Category(Box<Category>),
}
