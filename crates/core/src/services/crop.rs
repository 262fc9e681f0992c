//! Crop service.
//!
//! Crop listings are owner-scoped: a crop that belongs to someone else is
//! reported as not found on update and delete.

use chrono::Utc;
use gofarm_common::{AppError, AppResult, IdGenerator};
use gofarm_db::{
    entities::{CropStatus, crop},
    repositories::{CropRepository, UserRepository},
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

use super::view::{Authors, CropView};

const DEFAULT_LIST_LIMIT: u64 = 100;

/// Input for creating a crop listing.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCropInput {
    #[validate(length(min = 1, max = 200))]
    pub name: String,

    #[validate(length(max = 5000))]
    pub description: Option<String>,

    #[validate(length(max = 100))]
    pub category: Option<String>,

    #[serde(default)]
    pub status: CropStatus,

    #[validate(range(min = 0.0))]
    pub quantity: Option<f64>,

    #[validate(length(max = 32))]
    pub unit: Option<String>,
}

/// Input for updating a crop listing.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateCropInput {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,

    #[validate(length(max = 5000))]
    pub description: Option<String>,

    #[validate(length(max = 100))]
    pub category: Option<String>,

    pub status: Option<CropStatus>,

    #[validate(range(min = 0.0))]
    pub quantity: Option<f64>,

    #[validate(length(max = 32))]
    pub unit: Option<String>,
}

/// Crop service for business logic.
#[derive(Clone)]
pub struct CropService {
    crop_repo: CropRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl CropService {
    /// Create a new crop service.
    #[must_use]
    pub const fn new(crop_repo: CropRepository, user_repo: UserRepository) -> Self {
        Self {
            crop_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    async fn view(&self, crop: &crop::Model) -> AppResult<CropView> {
        let authors = Authors::load(&self.user_repo, [crop.farmer_id.clone()]).await?;
        Ok(CropView::build(crop, &authors))
    }

    async fn committed_view(&self, crop: &crop::Model) -> CropView {
        let authors = Authors::load_or_unknown(&self.user_repo, [crop.farmer_id.clone()]).await;
        CropView::build(crop, &authors)
    }

    async fn owned(&self, crop_id: &str, farmer_id: &str) -> AppResult<crop::Model> {
        self.crop_repo
            .find_owned(crop_id, farmer_id)
            .await?
            .ok_or_else(|| AppError::CropNotFound(crop_id.to_string()))
    }

    /// Create a crop listing owned by `farmer_id`.
    pub async fn create(&self, farmer_id: &str, input: CreateCropInput) -> AppResult<CropView> {
        input.validate()?;
        if input.name.trim().is_empty() {
            return Err(AppError::Validation("Crop name is required".to_string()));
        }

        let now = Utc::now();
        let model = crop::ActiveModel {
            id: Set(self.id_gen.generate()),
            farmer_id: Set(farmer_id.to_string()),
            name: Set(input.name.trim().to_string()),
            description: Set(input.description),
            category: Set(input.category),
            status: Set(input.status),
            quantity: Set(input.quantity),
            unit: Set(input.unit),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let created = self.crop_repo.create(model).await?;
        tracing::info!(crop_id = %created.id, farmer_id = %farmer_id, "Created crop");

        Ok(self.committed_view(&created).await)
    }

    /// Get a crop by ID.
    pub async fn get(&self, crop_id: &str) -> AppResult<CropView> {
        let crop = self.crop_repo.get_by_id(crop_id).await?;
        self.view(&crop).await
    }

    /// List crops, newest first.
    pub async fn list(
        &self,
        status: Option<CropStatus>,
        category: Option<&str>,
    ) -> AppResult<Vec<CropView>> {
        let crops = self
            .crop_repo
            .find_filtered(status, category, DEFAULT_LIST_LIMIT)
            .await?;

        let authors = Authors::load(&self.user_repo, crops.iter().map(|c| c.farmer_id.clone())).await?;
        Ok(crops.iter().map(|c| CropView::build(c, &authors)).collect())
    }

    /// Update a crop owned by `farmer_id`.
    pub async fn update(
        &self,
        crop_id: &str,
        farmer_id: &str,
        input: UpdateCropInput,
    ) -> AppResult<CropView> {
        input.validate()?;
        let crop = self.owned(crop_id, farmer_id).await?;

        let mut active: crop::ActiveModel = crop.into();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(description) = input.description {
            active.description = Set(Some(description));
        }
        if let Some(category) = input.category {
            active.category = Set(Some(category));
        }
        if let Some(status) = input.status {
            active.status = Set(status);
        }
        if let Some(quantity) = input.quantity {
            active.quantity = Set(Some(quantity));
        }
        if let Some(unit) = input.unit {
            active.unit = Set(Some(unit));
        }
        active.updated_at = Set(Utc::now().into());

        let updated = self.crop_repo.update(active).await?;
        Ok(self.committed_view(&updated).await)
    }

    /// Delete a crop owned by `farmer_id`.
    pub async fn delete(&self, crop_id: &str, farmer_id: &str) -> AppResult<()> {
        let crop = self.owned(crop_id, farmer_id).await?;
        self.crop_repo.delete(&crop.id).await?;
        tracing::info!(crop_id = %crop_id, "Deleted crop");
        Ok(())
    }
}
