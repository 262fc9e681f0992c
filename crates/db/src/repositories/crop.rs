//! Crop repository.

use std::sync::Arc;

use crate::entities::{Crop, CropStatus, crop};
use gofarm_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect,
};

/// Crop repository for database operations.
#[derive(Clone)]
pub struct CropRepository {
    db: Arc<DatabaseConnection>,
}

impl CropRepository {
    /// Create a new crop repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a crop by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<crop::Model>> {
        Crop::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a crop by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<crop::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::CropNotFound(id.to_string()))
    }

    /// Find a crop owned by the given farmer.
    pub async fn find_owned(&self, id: &str, farmer_id: &str) -> AppResult<Option<crop::Model>> {
        Crop::find_by_id(id)
            .filter(crop::Column::FarmerId.eq(farmer_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new crop.
    pub async fn create(&self, model: crop::ActiveModel) -> AppResult<crop::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a crop.
    pub async fn update(&self, model: crop::ActiveModel) -> AppResult<crop::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a crop.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Crop::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// List crops, newest first, optionally filtered by status and category.
    pub async fn find_filtered(
        &self,
        status: Option<CropStatus>,
        category: Option<&str>,
        limit: u64,
    ) -> AppResult<Vec<crop::Model>> {
        let mut condition = Condition::all();

        if let Some(status) = status {
            condition = condition.add(crop::Column::Status.eq(status));
        }

        if let Some(category) = category {
            condition = condition.add(crop::Column::Category.eq(category));
        }

        Crop::find()
            .filter(condition)
            .order_by_desc(crop::Column::Id)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
