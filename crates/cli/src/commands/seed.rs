//! Catalog seeding from YAML.
//!
//! Rows are matched by name, so running the same file twice updates
//! instead of duplicating. Categories are applied first, then brands,
//! then products. A category's `parent` and a product's `category` and
//! `brand` refer to names, either earlier in the file or already in the
//! database.
//!
//! ```yaml
//! categories:
//!   - name: Kitchen
//!   - name: Cookware
//!     parent: Kitchen
//! brands:
//!   - name: Jikoni
//! products:
//!   - name: Cast Iron Skillet
//!     price: "3499.00"
//!     category: Cookware
//!     brand: Jikoni
//!     stock_quantity: 40
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use sqlx::PgPool;
use thiserror::Error;

use soko_backend::RepositoryError;
use soko_backend::db::{BrandRepository, CategoryRepository, ProductRepository};
use soko_backend::models::{BrandInput, CategoryInput, ProductInput};

use super::DATABASE_URL;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Cannot read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid catalog file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid product {name:?}: {reason}")]
    InvalidProduct { name: String, reason: String },

    #[error("Blank {0} name")]
    BlankName(&'static str),

    #[error("Unknown {kind} {name:?}")]
    UnknownReference { kind: &'static str, name: String },

    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogFile {
    #[serde(default)]
    pub categories: Vec<SeedCategory>,
    #[serde(default)]
    pub brands: Vec<BrandInput>,
    #[serde(default)]
    pub products: Vec<SeedProduct>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedCategory {
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    /// Name of the parent category.
    pub parent: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SeedProduct {
    /// Category name. Takes precedence over `category_id`.
    pub category: Option<String>,
    /// Brand name. Takes precedence over `brand_id`.
    pub brand: Option<String>,
    #[serde(flatten)]
    pub fields: ProductInput,
}

/// Rows touched by one seed run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub categories: usize,
    pub brands: usize,
    pub products_created: usize,
    pub products_updated: usize,
}

impl CatalogFile {
    /// Read and parse a catalog file.
    ///
    /// # Errors
    ///
    /// Returns `SeedError::Read` or `SeedError::Parse`.
    pub fn load(path: &Path) -> Result<Self, SeedError> {
        let text = std::fs::read_to_string(path).map_err(|source| SeedError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Parse catalog YAML.
    ///
    /// # Errors
    ///
    /// Returns `SeedError::Parse` for malformed YAML or unknown fields.
    pub fn parse(text: &str) -> Result<Self, SeedError> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Check every row before anything is written.
    ///
    /// # Errors
    ///
    /// Returns the first blank name or product constraint violation.
    pub fn validate(&self) -> Result<(), SeedError> {
        if self.categories.iter().any(|c| c.name.trim().is_empty()) {
            return Err(SeedError::BlankName("category"));
        }
        if self.brands.iter().any(|b| b.name.trim().is_empty()) {
            return Err(SeedError::BlankName("brand"));
        }
        for product in &self.products {
            product
                .fields
                .validate()
                .map_err(|reason| SeedError::InvalidProduct {
                    name: product.fields.name.clone(),
                    reason,
                })?;
        }
        Ok(())
    }
}

/// Look up an optional name, failing if it is given but unknown.
fn resolve<T: Copy>(
    names: &HashMap<String, T>,
    name: Option<&str>,
    kind: &'static str,
) -> Result<Option<T>, SeedError> {
    name.map(|name| {
        names
            .get(name.trim())
            .copied()
            .ok_or_else(|| SeedError::UnknownReference {
                kind,
                name: name.to_owned(),
            })
    })
    .transpose()
}

/// Load a catalog file into the database.
///
/// # Errors
///
/// Returns `SeedError` if the file is invalid, a reference is unknown, or a write fails.
pub async fn catalog(path: &Path) -> Result<(), SeedError> {
    let file = CatalogFile::load(path)?;
    file.validate()?;

    let pool = super::connect()
        .await
        .ok_or(SeedError::MissingEnvVar(DATABASE_URL))??;

    let report = apply(&pool, file).await?;
    tracing::info!(
        categories = report.categories,
        brands = report.brands,
        products_created = report.products_created,
        products_updated = report.products_updated,
        "Catalog seeded from {}",
        path.display()
    );
    Ok(())
}

/// Upsert a validated catalog.
///
/// # Errors
///
/// Returns `SeedError` on an unknown reference or a failed write.
pub async fn apply(pool: &PgPool, file: CatalogFile) -> Result<SeedReport, SeedError> {
    let categories = CategoryRepository::new(pool);
    let brands = BrandRepository::new(pool);
    let products = ProductRepository::new(pool);
    let mut report = SeedReport::default();

    let mut category_ids: HashMap<_, _> = categories
        .list()
        .await?
        .into_iter()
        .map(|c| (c.name, c.id))
        .collect();

    for seed in file.categories {
        let input = CategoryInput {
            parent_id: resolve(&category_ids, seed.parent.as_deref(), "parent category")?,
            name: seed.name,
            description: seed.description,
            image_url: seed.image_url,
        };
        let category = categories.upsert_by_name(&input).await?;
        category_ids.insert(category.name, category.id);
        report.categories += 1;
    }

    let mut brand_ids: HashMap<_, _> = brands
        .list()
        .await?
        .into_iter()
        .map(|b| (b.name, b.id))
        .collect();

    for input in file.brands {
        let brand = brands.upsert_by_name(&input).await?;
        brand_ids.insert(brand.name, brand.id);
        report.brands += 1;
    }

    for seed in file.products {
        let mut input = seed.fields;
        if seed.category.is_some() {
            input.category_id = resolve(&category_ids, seed.category.as_deref(), "category")?;
        }
        if seed.brand.is_some() {
            input.brand_id = resolve(&brand_ids, seed.brand.as_deref(), "brand")?;
        }

        match products.find_id_by_name(input.name.trim()).await? {
            Some(id) => {
                products.update(id, &input).await?;
                report.products_updated += 1;
            }
            None => {
                products.create(&input).await?;
                report.products_created += 1;
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    const SAMPLE: &str = include_str!("../../seed/catalog.yaml");

    #[test]
    fn test_sample_catalog_is_valid() {
        let file = CatalogFile::parse(SAMPLE).unwrap();
        file.validate().unwrap();
        assert!(!file.categories.is_empty());
        assert!(!file.brands.is_empty());
        assert!(!file.products.is_empty());
    }

    #[test]
    fn test_product_references_by_name() {
        let file = CatalogFile::parse(
            r#"
products:
  - name: Kettle
    price: "2500.00"
    category: Kitchen
    brand: Jikoni
"#,
        )
        .unwrap();
        let product = &file.products[0];
        assert_eq!(product.category.as_deref(), Some("Kitchen"));
        assert_eq!(product.brand.as_deref(), Some("Jikoni"));
        assert_eq!(product.fields.price, Decimal::new(250_000, 2));
        assert!(product.fields.is_active);
        assert_eq!(product.fields.stock_quantity, 0);
    }

    #[test]
    fn test_unknown_top_level_key_is_rejected() {
        let err = CatalogFile::parse("produts: []\n").unwrap_err();
        assert!(matches!(err, SeedError::Parse(_)));
    }

    #[test]
    fn test_invalid_product_is_reported_by_name() {
        let file = CatalogFile::parse(
            r#"
products:
  - name: Free Lunch
    price: "-1"
"#,
        )
        .unwrap();
        let err = file.validate().unwrap_err();
        assert!(matches!(err, SeedError::InvalidProduct { ref name, .. } if name == "Free Lunch"));
    }

    #[test]
    fn test_blank_brand_name() {
        let file = CatalogFile::parse("brands:\n  - name: \"  \"\n").unwrap();
        assert!(matches!(file.validate(), Err(SeedError::BlankName("brand"))));
    }

    #[test]
    fn test_resolve() {
        let names = HashMap::from([("Kitchen".to_owned(), 7_u32)]);
        assert_eq!(resolve(&names, None, "category").unwrap(), None);
        assert_eq!(resolve(&names, Some(" Kitchen "), "category").unwrap(), Some(7));
        assert!(matches!(
            resolve(&names, Some("Garden"), "category"),
            Err(SeedError::UnknownReference { kind: "category", .. })
        ));
    }
}
