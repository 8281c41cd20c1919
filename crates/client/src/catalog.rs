//! Products and categories.
//!
//! Reads are public, coalesced and cached; admin mutations need a session and
//! drop the whole catalog cache so the next read reflects the server.

use std::sync::Arc;

use reqwest::Method;
use tracing::{debug, instrument};
use tryla_core::{CategoryId, ProductId};

use crate::client::{ApiClient, Auth, CacheKey, CacheValue};
use crate::error::ApiError;
use crate::types::{
    Category, CategoryInput, Product, ProductFilter, ProductInput, ProductsPayload,
};

fn cache_mismatch(key: &CacheKey) -> ApiError {
    ApiError::UnexpectedResponse(format!("cache entry for {key:?} has the wrong type"))
}

impl ApiClient {
    // =========================================================================
    // Product reads
    // =========================================================================

    /// All products (`GET /products`).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn products(&self) -> Result<Vec<Product>, ApiError> {
        let key = CacheKey::Products;
        let value = self
            .cached(key.clone(), async {
                let payload: ProductsPayload = self
                    .send_json::<_, ()>(Method::GET, &["products"], Auth::Public, None)
                    .await?;
                Ok(CacheValue::Products(Arc::new(payload.into())))
            })
            .await?;

        match value {
            CacheValue::Products(products) => Ok(products.as_ref().clone()),
            _ => Err(cache_mismatch(&key)),
        }
    }

    /// Featured products for the home page (`GET /products/featured`).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn featured_products(&self) -> Result<Vec<Product>, ApiError> {
        let key = CacheKey::Featured;
        let value = self
            .cached(key.clone(), async {
                let payload: ProductsPayload = self
                    .send_json::<_, ()>(
                        Method::GET,
                        &["products", "featured"],
                        Auth::Public,
                        None,
                    )
                    .await?;
                Ok(CacheValue::Products(Arc::new(payload.into())))
            })
            .await?;

        match value {
            CacheValue::Products(products) => Ok(products.as_ref().clone()),
            _ => Err(cache_mismatch(&key)),
        }
    }

    /// One product (`GET /products/:id`).
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the product does not exist, or another
    /// error if the request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product(&self, id: &ProductId) -> Result<Product, ApiError> {
        let key = CacheKey::Product(id.clone());
        let value = self
            .cached(key.clone(), async {
                let product: Product = self
                    .send_json::<_, ()>(
                        Method::GET,
                        &["products", id.as_str()],
                        Auth::Public,
                        None,
                    )
                    .await?;
                Ok(CacheValue::Product(Box::new(product)))
            })
            .await?;

        match value {
            CacheValue::Product(product) => Ok(*product),
            _ => Err(cache_mismatch(&key)),
        }
    }

    /// Products matching category, availability and size filters
    /// (`POST /products/filters`). Not cached.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn filter_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, ApiError> {
        let payload: ProductsPayload = self
            .send_json(
                Method::POST,
                &["products", "filters"],
                Auth::Public,
                Some(filter),
            )
            .await?;
        Ok(payload.into())
    }

    /// Products whose title or description contains `query`, ignoring case.
    ///
    /// Matches against the cached product list; a blank query returns nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the product list cannot be fetched.
    #[instrument(skip(self))]
    pub async fn search_products(&self, query: &str) -> Result<Vec<Product>, ApiError> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }
        let matches: Vec<Product> = self
            .products()
            .await?
            .into_iter()
            .filter(|product| product.matches(&needle))
            .collect();
        debug!(count = matches.len(), "search matched");
        Ok(matches)
    }

    /// Products in one category, for the category page.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn category_products(&self, id: &CategoryId) -> Result<Vec<Product>, ApiError> {
        self.filter_products(&ProductFilter {
            category: Some(id.clone()),
            ..ProductFilter::default()
        })
        .await
    }

    // =========================================================================
    // Category reads
    // =========================================================================

    /// All categories (`GET /categories`).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        let key = CacheKey::Categories;
        let value = self
            .cached(key.clone(), async {
                let categories: Vec<Category> = self
                    .send_json::<_, ()>(Method::GET, &["categories"], Auth::Public, None)
                    .await?;
                Ok(CacheValue::Categories(Arc::new(categories)))
            })
            .await?;

        match value {
            CacheValue::Categories(categories) => Ok(categories.as_ref().clone()),
            _ => Err(cache_mismatch(&key)),
        }
    }

    /// One category (`GET /categories/:id`).
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the category does not exist, or another
    /// error if the request fails.
    #[instrument(skip(self), fields(category_id = %id))]
    pub async fn category(&self, id: &CategoryId) -> Result<Category, ApiError> {
        let key = CacheKey::Category(id.clone());
        let value = self
            .cached(key.clone(), async {
                let category: Category = self
                    .send_json::<_, ()>(
                        Method::GET,
                        &["categories", id.as_str()],
                        Auth::Public,
                        None,
                    )
                    .await?;
                Ok(CacheValue::Category(Box::new(category)))
            })
            .await?;

        match value {
            CacheValue::Category(category) => Ok(*category),
            _ => Err(cache_mismatch(&key)),
        }
    }

    // =========================================================================
    // Admin mutations
    // =========================================================================

    /// Create a product (`POST /products`).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the session is rejected.
    #[instrument(skip(self, input), fields(title = %input.title))]
    pub async fn create_product(&self, input: &ProductInput) -> Result<Product, ApiError> {
        let product = self
            .send_json(Method::POST, &["products"], Auth::Bearer, Some(input))
            .await?;
        self.invalidate_catalog();
        Ok(product)
    }

    /// Update a product (`PATCH /products/:id`).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the session is rejected.
    #[instrument(skip(self, input), fields(product_id = %id))]
    pub async fn update_product(
        &self,
        id: &ProductId,
        input: &ProductInput,
    ) -> Result<Product, ApiError> {
        let product = self
            .send_json(
                Method::PATCH,
                &["products", id.as_str()],
                Auth::Bearer,
                Some(input),
            )
            .await?;
        self.invalidate_catalog();
        Ok(product)
    }

    /// Delete a product (`DELETE /products/:id`).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the session is rejected.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete_product(&self, id: &ProductId) -> Result<(), ApiError> {
        self.send_unit::<()>(Method::DELETE, &["products", id.as_str()], Auth::Bearer, None)
            .await?;
        self.invalidate_catalog();
        Ok(())
    }

    /// Create a category (`POST /categories`).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the session is rejected.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_category(&self, input: &CategoryInput) -> Result<Category, ApiError> {
        let category = self
            .send_json(Method::POST, &["categories"], Auth::Bearer, Some(input))
            .await?;
        self.invalidate_catalog();
        Ok(category)
    }

    /// Update a category (`PATCH /categories/:id`).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the session is rejected.
    #[instrument(skip(self, input), fields(category_id = %id))]
    pub async fn update_category(
        &self,
        id: &CategoryId,
        input: &CategoryInput,
    ) -> Result<Category, ApiError> {
        let category = self
            .send_json(
                Method::PATCH,
                &["categories", id.as_str()],
                Auth::Bearer,
                Some(input),
            )
            .await?;
        self.invalidate_catalog();
        Ok(category)
    }

    /// Delete a category (`DELETE /categories/:id`).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the session is rejected.
    #[instrument(skip(self), fields(category_id = %id))]
    pub async fn delete_category(&self, id: &CategoryId) -> Result<(), ApiError> {
        self.send_unit::<()>(
            Method::DELETE,
            &["categories", id.as_str()],
            Auth::Bearer,
            None,
        )
        .await?;
        self.invalidate_catalog();
        Ok(())
    }
}
