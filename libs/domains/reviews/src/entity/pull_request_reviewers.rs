use sea_orm::entity::prelude::*;

use crate::models::PullRequestReviewer;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "pull_request_reviewers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub pull_request_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::pull_requests::Entity",
        from = "Column::PullRequestId",
        to = "super::pull_requests::Column::PullRequestId"
    )]
    PullRequest,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::UserId"
    )]
    User,
}

impl Related<super::pull_requests::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PullRequest.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for PullRequestReviewer {
    fn from(model: Model) -> Self {
        Self {
            pull_request_id: model.pull_request_id,
            user_id: model.user_id,
        }
    }
}
