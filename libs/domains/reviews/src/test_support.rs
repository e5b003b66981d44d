//! Mock-backed unit of work for service unit tests.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::{ReviewError, ReviewResult};
use crate::models::{PullRequest, PullRequestReviewer, Team, TeamMember, User};
use crate::repository::{
    MockPullRequestRepository, MockTeamRepository, MockUserRepository, PullRequestRepository,
    TeamRepository, TransactionScope, UnitOfWork, UserRepository,
};

/// Expectations for one scope. Set them, then call [`unit_of_work`](Self::unit_of_work).
pub struct ScopeFixture {
    pub teams: MockTeamRepository,
    pub users: MockUserRepository,
    pub pull_requests: MockPullRequestRepository,
}

impl ScopeFixture {
    pub fn new() -> Self {
        Self {
            teams: MockTeamRepository::new(),
            users: MockUserRepository::new(),
            pull_requests: MockPullRequestRepository::new(),
        }
    }

    pub fn unit_of_work(self) -> FixtureUnitOfWork {
        let outcome = Arc::new(Outcome::default());
        let scope = MockScope {
            teams: self.teams,
            users: self.users,
            pull_requests: self.pull_requests,
            outcome: outcome.clone(),
        };
        FixtureUnitOfWork {
            scope: Mutex::new(Some(scope)),
            outcome,
        }
    }
}

#[derive(Default)]
struct Outcome {
    committed: AtomicBool,
    rolled_back: AtomicBool,
}

/// Hands out its single scope once and records how it ended.
pub struct FixtureUnitOfWork {
    scope: Mutex<Option<MockScope>>,
    outcome: Arc<Outcome>,
}

impl FixtureUnitOfWork {
    pub fn committed(&self) -> bool {
        self.outcome.committed.load(Ordering::SeqCst)
    }

    pub fn rolled_back(&self) -> bool {
        self.outcome.rolled_back.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UnitOfWork for FixtureUnitOfWork {
    type Scope = MockScope;

    async fn begin(&self) -> ReviewResult<MockScope> {
        self.scope
            .lock()
            .map_err(|e| ReviewError::Internal(e.to_string()))?
            .take()
            .ok_or_else(|| ReviewError::Internal("fixture scope already used".into()))
    }
}

pub struct MockScope {
    teams: MockTeamRepository,
    users: MockUserRepository,
    pull_requests: MockPullRequestRepository,
    outcome: Arc<Outcome>,
}

#[async_trait]
impl TeamRepository for MockScope {
    async fn add_team(&self, team: &Team) -> ReviewResult<()> {
        self.teams.add_team(team).await
    }

    async fn add_member(&self, team_name: &str, member: &TeamMember) -> ReviewResult<()> {
        self.teams.add_member(team_name, member).await
    }

    async fn get_team(&self, team_name: &str) -> ReviewResult<Option<Team>> {
        self.teams.get_team(team_name).await
    }

    async fn get_members(&self, team_name: &str) -> ReviewResult<Vec<TeamMember>> {
        self.teams.get_members(team_name).await
    }
}

#[async_trait]
impl UserRepository for MockScope {
    async fn get_user(&self, user_id: &str) -> ReviewResult<Option<User>> {
        self.users.get_user(user_id).await
    }

    async fn update_user(&self, user: &User) -> ReviewResult<()> {
        self.users.update_user(user).await
    }

    async fn get_active_by_team(&self, team_name: &str) -> ReviewResult<Vec<User>> {
        self.users.get_active_by_team(team_name).await
    }
}

#[async_trait]
impl PullRequestRepository for MockScope {
    async fn add_pull_request(&self, pr: &PullRequest) -> ReviewResult<()> {
        self.pull_requests.add_pull_request(pr).await
    }

    async fn get_pull_request(&self, pull_request_id: &str) -> ReviewResult<Option<PullRequest>> {
        self.pull_requests.get_pull_request(pull_request_id).await
    }

    async fn get_pull_request_for_update(
        &self,
        pull_request_id: &str,
    ) -> ReviewResult<Option<PullRequest>> {
        self.pull_requests
            .get_pull_request_for_update(pull_request_id)
            .await
    }

    async fn update_pull_request(&self, pr: &PullRequest) -> ReviewResult<()> {
        self.pull_requests.update_pull_request(pr).await
    }

    async fn add_reviewer(&self, pull_request_id: &str, user_id: &str) -> ReviewResult<()> {
        self.pull_requests.add_reviewer(pull_request_id, user_id).await
    }

    async fn remove_reviewer(&self, pull_request_id: &str, user_id: &str) -> ReviewResult<()> {
        self.pull_requests
            .remove_reviewer(pull_request_id, user_id)
            .await
    }

    async fn get_reviewers(&self, pull_request_id: &str) -> ReviewResult<Vec<PullRequestReviewer>> {
        self.pull_requests.get_reviewers(pull_request_id).await
    }

    async fn get_assigned_to_user(&self, user_id: &str) -> ReviewResult<Vec<PullRequest>> {
        self.pull_requests.get_assigned_to_user(user_id).await
    }
}

#[async_trait]
impl TransactionScope for MockScope {
    async fn commit(self) -> ReviewResult<()> {
        self.outcome.committed.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn rollback(self) -> ReviewResult<()> {
        self.outcome.rolled_back.store(true, Ordering::SeqCst);
        Ok(())
    }
}

pub fn user(user_id: &str, team_name: &str, is_active: bool) -> User {
    User {
        user_id: user_id.to_string(),
        username: format!("{user_id}-name"),
        team_name: team_name.to_string(),
        is_active,
    }
}
