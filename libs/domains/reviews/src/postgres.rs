use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    IsolationLevel, QueryFilter, QueryOrder, QuerySelect, SqlErr, TransactionTrait,
};

use crate::{
    entity::{pull_request_reviewers, pull_requests, teams, users},
    error::{ReviewError, ReviewResult},
    models::{PullRequest, PullRequestReviewer, Team, TeamMember, User},
    repository::{
        PullRequestRepository, TeamRepository, TransactionScope, UnitOfWork, UserRepository,
    },
};

/// PostgreSQL unit of work. Each scope is one database transaction.
#[derive(Clone)]
pub struct PgUnitOfWork {
    db: DatabaseConnection,
    isolation_level: IsolationLevel,
}

impl PgUnitOfWork {
    pub fn new(db: DatabaseConnection) -> Self {
        Self::with_isolation_level(db, IsolationLevel::ReadCommitted)
    }

    pub fn with_isolation_level(db: DatabaseConnection, isolation_level: IsolationLevel) -> Self {
        Self {
            db,
            isolation_level,
        }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    type Scope = PgScope;

    async fn begin(&self) -> ReviewResult<PgScope> {
        let txn = self
            .db
            .begin_with_config(Some(self.isolation_level), None)
            .await
            .map_err(database_error)?;
        Ok(PgScope { txn })
    }
}

/// Repositories bound to an open transaction. Dropping it rolls back.
pub struct PgScope {
    txn: DatabaseTransaction,
}

#[async_trait]
impl TransactionScope for PgScope {
    async fn commit(self) -> ReviewResult<()> {
        self.txn.commit().await.map_err(database_error)
    }

    async fn rollback(self) -> ReviewResult<()> {
        self.txn.rollback().await.map_err(database_error)
    }
}

fn database_error(err: DbErr) -> ReviewError {
    tracing::error!(error = %err, "Database error");
    ReviewError::from(err)
}

/// Maps a unique-key violation to `on_conflict`, anything else to `Internal`.
fn conflict_or_internal(err: DbErr, on_conflict: impl FnOnce() -> ReviewError) -> ReviewError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => on_conflict(),
        _ => database_error(err),
    }
}

#[async_trait]
impl TeamRepository for PgScope {
    async fn add_team(&self, team: &Team) -> ReviewResult<()> {
        let model = teams::ActiveModel {
            team_name: sea_orm::ActiveValue::Set(team.team_name.clone()),
        };
        teams::Entity::insert(model)
            .exec_without_returning(&self.txn)
            .await
            .map_err(|e| conflict_or_internal(e, || ReviewError::TeamExists(team.team_name.clone())))?;
        Ok(())
    }

    async fn add_member(&self, team_name: &str, member: &TeamMember) -> ReviewResult<()> {
        let model = users::ActiveModel::from(&User::from_member(team_name, member));
        users::Entity::insert(model)
            .exec_without_returning(&self.txn)
            .await
            .map_err(|e| conflict_or_internal(e, || ReviewError::UserExists(member.user_id.clone())))?;
        Ok(())
    }

    async fn get_team(&self, team_name: &str) -> ReviewResult<Option<Team>> {
        let model = teams::Entity::find_by_id(team_name.to_string())
            .one(&self.txn)
            .await
            .map_err(database_error)?;
        Ok(model.map(Into::into))
    }

    async fn get_members(&self, team_name: &str) -> ReviewResult<Vec<TeamMember>> {
        let models = users::Entity::find()
            .filter(users::Column::TeamName.eq(team_name))
            .order_by_asc(users::Column::UserId)
            .all(&self.txn)
            .await
            .map_err(database_error)?;
        Ok(models.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl UserRepository for PgScope {
    async fn get_user(&self, user_id: &str) -> ReviewResult<Option<User>> {
        let model = users::Entity::find_by_id(user_id.to_string())
            .one(&self.txn)
            .await
            .map_err(database_error)?;
        Ok(model.map(Into::into))
    }

    async fn update_user(&self, user: &User) -> ReviewResult<()> {
        match users::ActiveModel::from(user).update(&self.txn).await {
            Ok(_) => Ok(()),
            Err(DbErr::RecordNotUpdated) => Err(ReviewError::user_not_found(&user.user_id)),
            Err(e) => Err(database_error(e)),
        }
    }

    async fn get_active_by_team(&self, team_name: &str) -> ReviewResult<Vec<User>> {
        let models = users::Entity::find()
            .filter(users::Column::TeamName.eq(team_name))
            .filter(users::Column::IsActive.eq(true))
            .order_by_asc(users::Column::UserId)
            .all(&self.txn)
            .await
            .map_err(database_error)?;
        Ok(models.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl PullRequestRepository for PgScope {
    async fn add_pull_request(&self, pr: &PullRequest) -> ReviewResult<()> {
        pull_requests::Entity::insert(pull_requests::ActiveModel::from(pr))
            .exec_without_returning(&self.txn)
            .await
            .map_err(|e| {
                conflict_or_internal(e, || ReviewError::PrExists(pr.pull_request_id.clone()))
            })?;
        Ok(())
    }

    async fn get_pull_request(&self, pull_request_id: &str) -> ReviewResult<Option<PullRequest>> {
        let model = pull_requests::Entity::find_by_id(pull_request_id.to_string())
            .one(&self.txn)
            .await
            .map_err(database_error)?;
        Ok(model.map(Into::into))
    }

    async fn get_pull_request_for_update(
        &self,
        pull_request_id: &str,
    ) -> ReviewResult<Option<PullRequest>> {
        let model = pull_requests::Entity::find_by_id(pull_request_id.to_string())
            .lock_exclusive()
            .one(&self.txn)
            .await
            .map_err(database_error)?;
        Ok(model.map(Into::into))
    }

    async fn update_pull_request(&self, pr: &PullRequest) -> ReviewResult<()> {
        match pull_requests::ActiveModel::from(pr).update(&self.txn).await {
            Ok(_) => Ok(()),
            Err(DbErr::RecordNotUpdated) => {
                Err(ReviewError::pull_request_not_found(&pr.pull_request_id))
            }
            Err(e) => Err(database_error(e)),
        }
    }

    async fn add_reviewer(&self, pull_request_id: &str, user_id: &str) -> ReviewResult<()> {
        let model = pull_request_reviewers::ActiveModel {
            pull_request_id: sea_orm::ActiveValue::Set(pull_request_id.to_string()),
            user_id: sea_orm::ActiveValue::Set(user_id.to_string()),
        };
        pull_request_reviewers::Entity::insert(model)
            .exec_without_returning(&self.txn)
            .await
            .map_err(database_error)?;
        Ok(())
    }

    async fn remove_reviewer(&self, pull_request_id: &str, user_id: &str) -> ReviewResult<()> {
        let result = pull_request_reviewers::Entity::delete_many()
            .filter(pull_request_reviewers::Column::PullRequestId.eq(pull_request_id))
            .filter(pull_request_reviewers::Column::UserId.eq(user_id))
            .exec(&self.txn)
            .await
            .map_err(database_error)?;

        if result.rows_affected == 0 {
            return Err(ReviewError::NotAssigned {
                pull_request_id: pull_request_id.to_string(),
                user_id: user_id.to_string(),
            });
        }
        Ok(())
    }

    async fn get_reviewers(&self, pull_request_id: &str) -> ReviewResult<Vec<PullRequestReviewer>> {
        let models = pull_request_reviewers::Entity::find()
            .filter(pull_request_reviewers::Column::PullRequestId.eq(pull_request_id))
            .order_by_asc(pull_request_reviewers::Column::UserId)
            .all(&self.txn)
            .await
            .map_err(database_error)?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn get_assigned_to_user(&self, user_id: &str) -> ReviewResult<Vec<PullRequest>> {
        let models = pull_requests::Entity::find()
            .inner_join(pull_request_reviewers::Entity)
            .filter(pull_request_reviewers::Column::UserId.eq(user_id))
            .order_by_desc(pull_requests::Column::CreatedAt)
            .order_by_asc(pull_requests::Column::PullRequestId)
            .all(&self.txn)
            .await
            .map_err(database_error)?;
        Ok(models.into_iter().map(Into::into).collect())
    }
}
