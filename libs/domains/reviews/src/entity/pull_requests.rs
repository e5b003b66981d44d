use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;

use crate::models::{PullRequest, PullRequestStatus};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "pull_requests")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub pull_request_id: String,
    pub pull_request_name: String,
    pub author_id: String,
    pub status: PullRequestStatus,
    pub created_at: DateTimeWithTimeZone,
    pub merged_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::AuthorId",
        to = "super::users::Column::UserId"
    )]
    Author,
    #[sea_orm(has_many = "super::pull_request_reviewers::Entity")]
    Reviewers,
}

impl Related<super::pull_request_reviewers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reviewers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for PullRequest {
    fn from(model: Model) -> Self {
        Self {
            pull_request_id: model.pull_request_id,
            pull_request_name: model.pull_request_name,
            author_id: model.author_id,
            status: model.status,
            created_at: model.created_at.into(),
            merged_at: model.merged_at.map(Into::into),
        }
    }
}

impl From<&PullRequest> for ActiveModel {
    fn from(pr: &PullRequest) -> Self {
        ActiveModel {
            pull_request_id: Set(pr.pull_request_id.clone()),
            pull_request_name: Set(pr.pull_request_name.clone()),
            author_id: Set(pr.author_id.clone()),
            status: Set(pr.status),
            created_at: Set(pr.created_at.into()),
            merged_at: Set(pr.merged_at.map(Into::into)),
        }
    }
}
