//! Post entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::embedded::{Comment, StoredMedia, decode_list};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "post")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Author user ID
    #[sea_orm(indexed)]
    pub user_id: String,

    #[sea_orm(column_type = "Text")]
    pub content: String,

    /// Attached images (`[{url, filename}]`)
    #[sea_orm(column_type = "JsonBinary")]
    pub images: Json,

    /// IDs of users who liked this post
    #[sea_orm(column_type = "JsonBinary")]
    pub likes: Json,

    /// Comments in insertion order
    #[sea_orm(column_type = "JsonBinary")]
    pub comments: Json,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

impl Model {
    #[must_use]
    pub fn image_list(&self) -> Vec<StoredMedia> {
        decode_list(&self.images)
    }

    #[must_use]
    pub fn like_list(&self) -> Vec<String> {
        decode_list(&self.likes)
    }

    #[must_use]
    pub fn comment_list(&self) -> Vec<Comment> {
        decode_list(&self.comments)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
