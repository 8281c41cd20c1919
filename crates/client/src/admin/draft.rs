//! Text drafts behind the admin product and category forms.
//!
//! Fields hold exactly what was typed. Validation only checks what the form
//! inputs would: required fields are non-blank and numeric fields parse.
//! Business rules (non-negative prices, stock limits) belong to the backend.

use tryla_core::{CategoryId, Price};

use crate::error::ValidationError;
use crate::types::{Category, CategoryInput, Product, ProductInput};

/// Product form contents. List fields are comma-separated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductDraft {
    pub title: String,
    pub description: String,
    /// Rupees, e.g. `"499.00"`.
    pub price: String,
    pub stock: String,
    pub category: String,
    pub images: String,
    pub sizes: String,
    pub features: String,
    pub care: String,
    pub fit: String,
    pub material: String,
}

impl ProductDraft {
    /// Build the request body.
    ///
    /// # Errors
    ///
    /// Returns the first blank required field or unparsable number.
    pub fn validate(&self) -> Result<ProductInput, ValidationError> {
        let title = required("Title", &self.title)?;
        let price = required("Price", &self.price)?;
        let price = Price::parse_major(price).map_err(|_| ValidationError::NotANumber {
            field: "Price",
            value: price.to_string(),
        })?;
        let stock = required("Stock", &self.stock)?;
        let stock = stock.parse::<i64>().map_err(|_| ValidationError::NotANumber {
            field: "Stock",
            value: stock.to_string(),
        })?;
        let category = required("Category", &self.category)?;

        Ok(ProductInput {
            title: title.to_string(),
            description: self.description.trim().to_string(),
            price,
            stock,
            category: CategoryId::new(category),
            images: split_list(&self.images),
            sizes: split_list(&self.sizes),
            features: split_list(&self.features),
            care: optional(&self.care),
            fit: optional(&self.fit),
            material: optional(&self.material),
        })
    }
}

impl From<&Product> for ProductDraft {
    fn from(product: &Product) -> Self {
        Self {
            title: product.title.clone(),
            description: product.description.clone(),
            price: product.price.major_units().to_string(),
            stock: product.stock.to_string(),
            category: product
                .category_id()
                .map(ToString::to_string)
                .unwrap_or_default(),
            images: product.images.join(", "),
            sizes: product.sizes.join(", "),
            features: product.features.join(", "),
            care: product.care.clone().unwrap_or_default(),
            fit: product.fit.clone().unwrap_or_default(),
            material: product.material.clone().unwrap_or_default(),
        }
    }
}

/// Category form contents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryDraft {
    pub name: String,
    pub description: String,
    pub image: String,
}

impl CategoryDraft {
    /// Build the request body.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::MissingField` for a blank name.
    pub fn validate(&self) -> Result<CategoryInput, ValidationError> {
        Ok(CategoryInput {
            name: required("Name", &self.name)?.to_string(),
            description: optional(&self.description),
            image: optional(&self.image),
        })
    }
}

impl From<&Category> for CategoryDraft {
    fn from(category: &Category) -> Self {
        Self {
            name: category.name.clone(),
            description: category.description.clone().unwrap_or_default(),
            image: category.image.clone().unwrap_or_default(),
        }
    }
}

fn required<'a>(field: &'static str, value: &'a str) -> Result<&'a str, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(value)
}

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn kurta() -> ProductDraft {
        ProductDraft {
            title: " Cotton Kurta ".to_string(),
            price: "1299.50".to_string(),
            stock: "12".to_string(),
            category: "c1".to_string(),
            sizes: "S, M,, L ".to_string(),
            ..ProductDraft::default()
        }
    }

    #[test]
    fn test_product_draft_builds_input() {
        let input = kurta().validate().unwrap();
        assert_eq!(input.title, "Cotton Kurta");
        assert_eq!(input.price, Price::from_minor(129_950));
        assert_eq!(input.stock, 12);
        assert_eq!(input.category, CategoryId::new("c1"));
        assert_eq!(input.sizes, vec!["S", "M", "L"]);
        assert!(input.images.is_empty());
        assert_eq!(input.care, None);
    }

    #[test]
    fn test_product_draft_required_fields() {
        let draft = ProductDraft {
            title: "  ".to_string(),
            ..kurta()
        };
        assert_eq!(
            draft.validate().unwrap_err(),
            ValidationError::MissingField("Title")
        );

        let draft = ProductDraft {
            category: String::new(),
            ..kurta()
        };
        assert_eq!(
            draft.validate().unwrap_err(),
            ValidationError::MissingField("Category")
        );
    }

    #[test]
    fn test_product_draft_rejects_huge_price() {
        let draft = ProductDraft {
            price: "79228162514264337593543950335".to_string(),
            ..kurta()
        };
        assert!(matches!(
            draft.validate(),
            Err(ValidationError::NotANumber { field: "Price", .. })
        ));
    }

    #[test]
    fn test_product_draft_numbers_must_parse() {
        let draft = ProductDraft {
            price: "twelve".to_string(),
            ..kurta()
        };
        assert_eq!(
            draft.validate().unwrap_err(),
            ValidationError::NotANumber {
                field: "Price",
                value: "twelve".to_string()
            }
        );

        let draft = ProductDraft {
            stock: "1.5".to_string(),
            ..kurta()
        };
        assert!(matches!(
            draft.validate(),
            Err(ValidationError::NotANumber { field: "Stock", .. })
        ));
    }

    #[test]
    fn test_negative_price_is_not_rejected() {
        let draft = ProductDraft {
            price: "-10".to_string(),
            ..kurta()
        };
        assert_eq!(draft.validate().unwrap().price, Price::from_minor(-1000));
    }

    #[test]
    fn test_category_draft() {
        let draft = CategoryDraft {
            name: "Sarees".to_string(),
            description: "  ".to_string(),
            image: "https://cdn.tryla.in/sarees.jpg".to_string(),
        };
        let input = draft.validate().unwrap();
        assert_eq!(input.name, "Sarees");
        assert_eq!(input.description, None);
        assert_eq!(input.image.as_deref(), Some("https://cdn.tryla.in/sarees.jpg"));

        assert_eq!(
            CategoryDraft::default().validate().unwrap_err(),
            ValidationError::MissingField("Name")
        );
    }
}
