//! User directory entity for SeaORM. Rows are written by the auth provider sync.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub username: String,
    pub profile_image_url: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::post::Entity")]
    Post,
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Post.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for kwootter_core::domain::User {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            profile_image_url: model.profile_image_url,
        }
    }
}

impl From<kwootter_core::domain::User> for ActiveModel {
    fn from(user: kwootter_core::domain::User) -> Self {
        Self {
            id: Set(user.id),
            username: Set(user.username),
            profile_image_url: Set(user.profile_image_url),
            created_at: Set(chrono::Utc::now().into()),
        }
    }
}
