//! Crop entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Growth status of a crop listing.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum CropStatus {
    #[sea_orm(string_value = "planned")]
    Planned,
    #[default]
    #[sea_orm(string_value = "growing")]
    Growing,
    #[sea_orm(string_value = "harvested")]
    Harvested,
    #[sea_orm(string_value = "sold")]
    Sold,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "crop")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Owning farmer's user ID
    #[sea_orm(indexed)]
    pub farmer_id: String,

    pub name: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    #[sea_orm(nullable, indexed)]
    pub category: Option<String>,

    pub status: CropStatus,

    #[sea_orm(nullable)]
    pub quantity: Option<f64>,

    /// e.g. "kg", "quintal"
    #[sea_orm(nullable)]
    pub unit: Option<String>,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::FarmerId",
        to = "super::user::Column::Id"
    )]
    Farmer,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Farmer.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
