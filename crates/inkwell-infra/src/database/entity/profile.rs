//! Profile entity for SeaORM. One row per user, keyed by the user id.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "profiles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: i64,
    #[sea_orm(column_type = "Text")]
    pub bio: String,
    pub image: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for inkwell_core::domain::Profile {
    fn from(model: Model) -> Self {
        Self {
            user_id: model.user_id,
            bio: model.bio,
            image: model.image,
        }
    }
}

impl From<inkwell_core::domain::Profile> for ActiveModel {
    fn from(profile: inkwell_core::domain::Profile) -> Self {
        Self {
            user_id: Set(profile.user_id),
            bio: Set(profile.bio),
            image: Set(profile.image),
        }
    }
}
