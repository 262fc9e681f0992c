//! User entity.
//!
//! Accounts are provisioned outside this service; rows are only read here to
//! authenticate requests and to populate author/seller summaries.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Marketplace role of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[sea_orm(string_value = "farmer")]
    Farmer,
    #[sea_orm(string_value = "retailer")]
    Retailer,
    #[sea_orm(string_value = "consumer")]
    Consumer,
    #[sea_orm(string_value = "admin")]
    Admin,
}

impl UserRole {
    /// Whether accounts with this role may list products for sale.
    #[must_use]
    pub const fn can_sell(self) -> bool {
        matches!(self, Self::Farmer | Self::Retailer)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Display name
    pub name: String,

    #[sea_orm(unique)]
    pub email: String,

    pub role: UserRole,

    /// API access token
    #[sea_orm(unique, nullable)]
    #[serde(skip_serializing)]
    pub token: Option<String>,

    /// Avatar URL
    #[sea_orm(nullable)]
    pub avatar_url: Option<String>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::post::Entity")]
    Posts,

    #[sea_orm(has_many = "super::product::Entity")]
    Products,

    #[sea_orm(has_many = "super::crop::Entity")]
    Crops,
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Posts.def()
    }
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Products.def()
    }
}

impl Related<super::crop::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Crops.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_farmers_and_retailers_sell() {
        assert!(UserRole::Farmer.can_sell());
        assert!(UserRole::Retailer.can_sell());
        assert!(!UserRole::Consumer.can_sell());
        assert!(!UserRole::Admin.can_sell());
    }
}
