use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;

use crate::models::{TeamMember, User};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,
    pub username: String,
    pub team_name: String,
    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::teams::Entity",
        from = "Column::TeamName",
        to = "super::teams::Column::TeamName"
    )]
    Team,
}

impl Related<super::teams::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Team.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for User {
    fn from(model: Model) -> Self {
        Self {
            user_id: model.user_id,
            username: model.username,
            team_name: model.team_name,
            is_active: model.is_active,
        }
    }
}

impl From<Model> for TeamMember {
    fn from(model: Model) -> Self {
        Self {
            user_id: model.user_id,
            username: model.username,
            is_active: model.is_active,
        }
    }
}

impl From<&User> for ActiveModel {
    fn from(user: &User) -> Self {
        ActiveModel {
            user_id: Set(user.user_id.clone()),
            username: Set(user.username.clone()),
            team_name: Set(user.team_name.clone()),
            is_active: Set(user.is_active),
        }
    }
}
