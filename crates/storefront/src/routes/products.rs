//! Product catalog route handlers.

use axum::extract::State;
use serde::Deserialize;
use tracing::instrument;

use soko_backend::db::ProductRepository;
use soko_backend::models::{Brand, Category, Product, ProductFilter};
use soko_core::ProductId;

use crate::error::{AppError, Result};
use crate::extract::{Json, Path, Query};
use crate::state::AppState;

/// Query parameters for `GET /api/products`.
#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    pub featured: Option<bool>,
    pub brand: Option<String>,
    /// 1-based page number.
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl From<ProductQuery> for ProductFilter {
    fn from(query: ProductQuery) -> Self {
        let mut filter = Self {
            category: query.category,
            search: query.search,
            featured: query.featured,
            brand: query.brand,
            limit: query.limit,
            offset: None,
        };
        let page = query.page.unwrap_or(1).max(1);
        filter.offset = Some((page - 1).saturating_mul(filter.limit()));
        filter
    }
}

/// `GET /api/products`
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<Vec<Product>>> {
    let filter = ProductFilter::from(query);
    let products = ProductRepository::new(state.pool())
        .list_active(&filter)
        .await?;
    Ok(Json(products))
}

/// `GET /api/products/{id}`
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    let product = ProductRepository::new(state.pool())
        .get_active(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;
    Ok(Json(product))
}

/// `GET /api/categories`
#[instrument(skip(state))]
pub async fn categories(State(state): State<AppState>) -> Result<Json<Vec<Category>>> {
    let categories = state.catalog().categories(state.pool()).await?;
    Ok(Json(categories.as_ref().clone()))
}

/// `GET /api/brands`
#[instrument(skip(state))]
pub async fn brands(State(state): State<AppState>) -> Result<Json<Vec<Brand>>> {
    let brands = state.catalog().brands(state.pool()).await?;
    Ok(Json(brands.as_ref().clone()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_page_becomes_offset() {
        let filter = ProductFilter::from(ProductQuery {
            page: Some(3),
            limit: Some(10),
            ..ProductQuery::default()
        });
        assert_eq!(filter.offset(), 20);
        assert_eq!(filter.limit(), 10);
    }

    #[test]
    fn test_missing_or_zero_page_is_first_page() {
        let filter = ProductFilter::from(ProductQuery {
            page: Some(0),
            ..ProductQuery::default()
        });
        assert_eq!(filter.offset(), 0);
        assert_eq!(ProductFilter::from(ProductQuery::default()).offset(), 0);
    }
}
