//! Catalog records: categories, brands, and products.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use soko_core::{BrandId, CategoryId, ProductId};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub parent_id: Option<CategoryId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryInput {
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub parent_id: Option<CategoryId>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Brand {
    pub id: BrandId,
    pub name: String,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BrandInput {
    pub name: String,
    pub description: Option<String>,
    pub logo_url: Option<String>,
}

/// A product joined with its category and brand names.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub short_description: Option<String>,
    /// Price in KES.
    pub price: Decimal,
    /// Pre-discount price in KES, shown struck through when present.
    pub original_price: Option<Decimal>,
    pub sku: Option<String>,
    pub stock_quantity: i32,
    pub category_id: Option<CategoryId>,
    pub category_name: Option<String>,
    pub brand_id: Option<BrandId>,
    pub brand_name: Option<String>,
    pub images: Vec<String>,
    pub features: Vec<String>,
    pub specifications: serde_json::Value,
    pub is_active: bool,
    pub is_featured: bool,
    pub weight: Option<Decimal>,
    pub dimensions: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock_quantity > 0
    }
}

/// Fields accepted when creating or replacing a product.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductInput {
    pub name: String,
    pub description: Option<String>,
    pub short_description: Option<String>,
    pub price: Decimal,
    pub original_price: Option<Decimal>,
    pub sku: Option<String>,
    #[serde(default)]
    pub stock_quantity: i32,
    pub category_id: Option<CategoryId>,
    pub brand_id: Option<BrandId>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default = "empty_object")]
    pub specifications: serde_json::Value,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_featured: bool,
    pub weight: Option<Decimal>,
    pub dimensions: Option<serde_json::Value>,
}

impl ProductInput {
    /// Check the field constraints enforced before a row is written.
    ///
    /// # Errors
    ///
    /// Returns a human-readable message for the first violated constraint.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Product name is required".to_owned());
        }
        if self.price.is_sign_negative() {
            return Err("Price must be zero or greater".to_owned());
        }
        if self.original_price.is_some_and(|p| p.is_sign_negative()) {
            return Err("Original price must be zero or greater".to_owned());
        }
        if self.stock_quantity < 0 {
            return Err("Stock quantity must be zero or greater".to_owned());
        }
        if !self.specifications.is_object() {
            return Err("Specifications must be a JSON object".to_owned());
        }
        Ok(())
    }
}

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

const fn default_true() -> bool {
    true
}

/// Storefront listing filter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductFilter {
    /// Category name; `All` or empty means every category.
    pub category: Option<String>,
    /// Case-insensitive match against name and descriptions.
    pub search: Option<String>,
    pub featured: Option<bool>,
    /// Brand name.
    pub brand: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ProductFilter {
    pub const DEFAULT_LIMIT: i64 = 24;
    pub const MAX_LIMIT: i64 = 100;

    /// Category name to filter by, if any.
    #[must_use]
    pub fn category_name(&self) -> Option<&str> {
        self.category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case("all"))
    }

    /// `ILIKE` pattern for the search term, if any.
    #[must_use]
    pub fn search_pattern(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                let escaped = s
                    .replace('\\', "\\\\")
                    .replace('%', "\\%")
                    .replace('_', "\\_");
                format!("%{escaped}%")
            })
    }

    #[must_use]
    pub fn brand_name(&self) -> Option<&str> {
        self.brand.as_deref().map(str::trim).filter(|b| !b.is_empty())
    }

    #[must_use]
    pub fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .clamp(1, Self::MAX_LIMIT)
    }

    #[must_use]
    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}
