//! Product repository.

use std::sync::Arc;

use crate::entities::{Product, product};
use gofarm_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect,
    sea_query::{Expr, Func},
};

/// Listing filter for products.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    /// Exact seller ID.
    pub seller_id: Option<String>,
    /// Exact category.
    pub category: Option<String>,
}

/// Product repository for database operations.
#[derive(Clone)]
pub struct ProductRepository {
    db: Arc<DatabaseConnection>,
}

impl ProductRepository {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a product by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<product::Model>> {
        Product::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a product by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<product::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::ProductNotFound(id.to_string()))
    }

    /// Create a new product.
    pub async fn create(&self, model: product::ActiveModel) -> AppResult<product::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a product.
    pub async fn update(&self, model: product::ActiveModel) -> AppResult<product::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a product. Fails with `ProductNotFound` when no row was
    /// removed, so only one of two racing deletes succeeds.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let result = Product::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        if result.rows_affected == 0 {
            return Err(AppError::ProductNotFound(id.to_string()));
        }
        Ok(())
    }

    /// List products matching the filter, newest first.
    pub async fn find_filtered(
        &self,
        filter: &ProductFilter,
        limit: u64,
    ) -> AppResult<Vec<product::Model>> {
        let mut condition = Condition::all();

        if let Some(seller_id) = &filter.seller_id {
            condition = condition.add(product::Column::SellerId.eq(seller_id.as_str()));
        }

        if let Some(category) = &filter.category {
            condition = condition.add(product::Column::Category.eq(category.as_str()));
        }

        Product::find()
            .filter(condition)
            .order_by_desc(product::Column::Id)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Search products by name, case-insensitively, newest first.
    pub async fn search_by_name(&self, query: &str, limit: u64) -> AppResult<Vec<product::Model>> {
        let pattern = format!(
            "%{}%",
            query
                .to_lowercase()
                .replace('\\', "\\\\")
                .replace('%', "\\%")
                .replace('_', "\\_")
        );

        Product::find()
            .filter(Expr::expr(Func::lower(Expr::col(product::Column::Name))).like(pattern))
            .order_by_desc(product::Column::Id)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
