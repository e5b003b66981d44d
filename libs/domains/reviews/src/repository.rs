use async_trait::async_trait;
use std::future::Future;
use std::pin::Pin;

use crate::error::ReviewResult;
use crate::models::{PullRequest, PullRequestReviewer, Team, TeamMember, User};

/// Team persistence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TeamRepository: Send + Sync {
    /// Fails with `TeamExists` if the name is taken.
    async fn add_team(&self, team: &Team) -> ReviewResult<()>;

    /// Registers a user under `team_name`. Fails with `UserExists` if the
    /// user ID is taken in any team.
    async fn add_member(&self, team_name: &str, member: &TeamMember) -> ReviewResult<()>;

    async fn get_team(&self, team_name: &str) -> ReviewResult<Option<Team>>;

    /// Members ordered by ascending user ID.
    async fn get_members(&self, team_name: &str) -> ReviewResult<Vec<TeamMember>>;
}

/// User persistence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get_user(&self, user_id: &str) -> ReviewResult<Option<User>>;

    /// Full replace. Fails with `NotFound` if the user does not exist.
    async fn update_user(&self, user: &User) -> ReviewResult<()>;

    /// Active users of a team ordered by ascending user ID.
    async fn get_active_by_team(&self, team_name: &str) -> ReviewResult<Vec<User>>;
}

/// Pull request and reviewer-membership persistence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PullRequestRepository: Send + Sync {
    /// Fails with `PrExists` if the ID is taken.
    async fn add_pull_request(&self, pr: &PullRequest) -> ReviewResult<()>;

    async fn get_pull_request(&self, pull_request_id: &str) -> ReviewResult<Option<PullRequest>>;

    /// Like [`get_pull_request`](Self::get_pull_request) but holds the row
    /// until the surrounding unit of work ends.
    async fn get_pull_request_for_update(
        &self,
        pull_request_id: &str,
    ) -> ReviewResult<Option<PullRequest>>;

    /// Full replace. Fails with `NotFound` if the pull request does not exist.
    async fn update_pull_request(&self, pr: &PullRequest) -> ReviewResult<()>;

    async fn add_reviewer(&self, pull_request_id: &str, user_id: &str) -> ReviewResult<()>;

    /// Fails with `NotAssigned` if the pair does not exist.
    async fn remove_reviewer(&self, pull_request_id: &str, user_id: &str) -> ReviewResult<()>;

    /// Reviewers ordered by ascending user ID.
    async fn get_reviewers(&self, pull_request_id: &str) -> ReviewResult<Vec<PullRequestReviewer>>;

    /// Pull requests the user reviews, newest first, ties by ascending ID.
    async fn get_assigned_to_user(&self, user_id: &str) -> ReviewResult<Vec<PullRequest>>;
}

/// The repository set bound to one open unit of work.
///
/// Every call made through a scope sees the scope's own uncommitted writes.
/// Dropping a scope without calling [`commit`](Self::commit) discards them.
#[async_trait]
pub trait TransactionScope:
    TeamRepository + UserRepository + PullRequestRepository + Sized
{
    async fn commit(self) -> ReviewResult<()>;

    async fn rollback(self) -> ReviewResult<()>;
}

/// Opens atomic scopes over a store.
#[async_trait]
pub trait UnitOfWork: Send + Sync + 'static {
    type Scope: TransactionScope + 'static;

    async fn begin(&self) -> ReviewResult<Self::Scope>;
}

/// Future returned by a [`transact`] operation, borrowing the scope.
pub type ScopedFuture<'s, T> = Pin<Box<dyn Future<Output = ReviewResult<T>> + Send + 's>>;

/// Runs `operation` inside a fresh scope. Commits on `Ok`, rolls back on `Err`.
///
/// ```ignore
/// let team = transact(uow.as_ref(), |tx| {
///     Box::pin(async move { tx.get_team("backend").await })
/// })
/// .await?;
/// ```
pub async fn transact<U, T, F>(uow: &U, operation: F) -> ReviewResult<T>
where
    U: UnitOfWork + ?Sized,
    T: Send,
    F: for<'s> FnOnce(&'s U::Scope) -> ScopedFuture<'s, T> + Send,
{
    let scope = uow.begin().await?;
    let result = operation(&scope).await;

    match result {
        Ok(value) => {
            scope.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = scope.rollback().await {
                tracing::error!(error = %rollback_err, "Rollback failed");
            }
            Err(err)
        }
    }
}
