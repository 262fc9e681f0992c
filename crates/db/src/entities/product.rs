//! Product entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::embedded::{Review, StoredMedia, decode_list};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "product")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Seller user ID
    #[sea_orm(indexed)]
    pub seller_id: String,

    pub name: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    pub price: f64,

    #[sea_orm(nullable, indexed)]
    pub category: Option<String>,

    /// Product images (`[{url, filename}]`)
    #[sea_orm(column_type = "JsonBinary")]
    pub images: Json,

    /// Product videos (`[{url, filename}]`)
    #[sea_orm(column_type = "JsonBinary")]
    pub videos: Json,

    #[sea_orm(column_type = "JsonBinary")]
    pub reviews: Json,

    /// Mean of review ratings, 0 without reviews
    #[sea_orm(default_value = 0.0)]
    pub rating: f64,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

impl Model {
    #[must_use]
    pub fn image_list(&self) -> Vec<StoredMedia> {
        decode_list(&self.images)
    }

    #[must_use]
    pub fn video_list(&self) -> Vec<StoredMedia> {
        decode_list(&self.videos)
    }

    #[must_use]
    pub fn review_list(&self) -> Vec<Review> {
        decode_list(&self.reviews)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::SellerId",
        to = "super::user::Column::Id"
    )]
    Seller,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Seller.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
