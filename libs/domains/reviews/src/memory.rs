use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

use crate::error::{ReviewError, ReviewResult};
use crate::models::{PullRequest, PullRequestReviewer, Team, TeamMember, User};
use crate::repository::{
    PullRequestRepository, TeamRepository, TransactionScope, UnitOfWork, UserRepository,
};

#[derive(Debug, Default, Clone)]
struct StoreState {
    teams: BTreeSet<String>,
    users: BTreeMap<String, User>,
    pull_requests: BTreeMap<String, PullRequest>,
    /// `(pull_request_id, user_id)`
    reviewers: BTreeSet<(String, String)>,
}

/// In-memory store (for development/testing).
///
/// A scope holds the store lock for its whole lifetime, so units of work
/// run one at a time. Writes go to a staged copy that replaces the store
/// on commit.
#[derive(Debug, Default, Clone)]
pub struct InMemoryStore {
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UnitOfWork for InMemoryStore {
    type Scope = InMemoryScope;

    async fn begin(&self) -> ReviewResult<InMemoryScope> {
        let guard = self.state.clone().lock_owned().await;
        let staged = guard.clone();
        Ok(InMemoryScope {
            guard,
            staged: RwLock::new(staged),
        })
    }
}

pub struct InMemoryScope {
    guard: OwnedMutexGuard<StoreState>,
    staged: RwLock<StoreState>,
}

#[async_trait]
impl TransactionScope for InMemoryScope {
    async fn commit(self) -> ReviewResult<()> {
        let mut guard = self.guard;
        *guard = self.staged.into_inner();
        Ok(())
    }

    async fn rollback(self) -> ReviewResult<()> {
        Ok(())
    }
}

#[async_trait]
impl TeamRepository for InMemoryScope {
    async fn add_team(&self, team: &Team) -> ReviewResult<()> {
        let mut state = self.staged.write().await;
        if !state.teams.insert(team.team_name.clone()) {
            return Err(ReviewError::TeamExists(team.team_name.clone()));
        }
        Ok(())
    }

    async fn add_member(&self, team_name: &str, member: &TeamMember) -> ReviewResult<()> {
        let mut state = self.staged.write().await;
        if state.users.contains_key(&member.user_id) {
            return Err(ReviewError::UserExists(member.user_id.clone()));
        }
        state
            .users
            .insert(member.user_id.clone(), User::from_member(team_name, member));
        Ok(())
    }

    async fn get_team(&self, team_name: &str) -> ReviewResult<Option<Team>> {
        let state = self.staged.read().await;
        Ok(state.teams.get(team_name).map(|name| Team {
            team_name: name.clone(),
        }))
    }

    async fn get_members(&self, team_name: &str) -> ReviewResult<Vec<TeamMember>> {
        let state = self.staged.read().await;
        Ok(state
            .users
            .values()
            .filter(|u| u.team_name == team_name)
            .cloned()
            .map(TeamMember::from)
            .collect())
    }
}

#[async_trait]
impl UserRepository for InMemoryScope {
    async fn get_user(&self, user_id: &str) -> ReviewResult<Option<User>> {
        let state = self.staged.read().await;
        Ok(state.users.get(user_id).cloned())
    }

    async fn update_user(&self, user: &User) -> ReviewResult<()> {
        let mut state = self.staged.write().await;
        match state.users.get_mut(&user.user_id) {
            Some(existing) => {
                *existing = user.clone();
                Ok(())
            }
            None => Err(ReviewError::user_not_found(&user.user_id)),
        }
    }

    async fn get_active_by_team(&self, team_name: &str) -> ReviewResult<Vec<User>> {
        let state = self.staged.read().await;
        Ok(state
            .users
            .values()
            .filter(|u| u.team_name == team_name && u.is_active)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl PullRequestRepository for InMemoryScope {
    async fn add_pull_request(&self, pr: &PullRequest) -> ReviewResult<()> {
        let mut state = self.staged.write().await;
        if state.pull_requests.contains_key(&pr.pull_request_id) {
            return Err(ReviewError::PrExists(pr.pull_request_id.clone()));
        }
        state
            .pull_requests
            .insert(pr.pull_request_id.clone(), pr.clone());
        Ok(())
    }

    async fn get_pull_request(&self, pull_request_id: &str) -> ReviewResult<Option<PullRequest>> {
        let state = self.staged.read().await;
        Ok(state.pull_requests.get(pull_request_id).cloned())
    }

    async fn get_pull_request_for_update(
        &self,
        pull_request_id: &str,
    ) -> ReviewResult<Option<PullRequest>> {
        // The scope already holds the store exclusively.
        self.get_pull_request(pull_request_id).await
    }

    async fn update_pull_request(&self, pr: &PullRequest) -> ReviewResult<()> {
        let mut state = self.staged.write().await;
        match state.pull_requests.get_mut(&pr.pull_request_id) {
            Some(existing) => {
                *existing = pr.clone();
                Ok(())
            }
            None => Err(ReviewError::pull_request_not_found(&pr.pull_request_id)),
        }
    }

    async fn add_reviewer(&self, pull_request_id: &str, user_id: &str) -> ReviewResult<()> {
        let mut state = self.staged.write().await;
        if !state.pull_requests.contains_key(pull_request_id) {
            return Err(ReviewError::pull_request_not_found(pull_request_id));
        }
        if !state.users.contains_key(user_id) {
            return Err(ReviewError::user_not_found(user_id));
        }
        if !state
            .reviewers
            .insert((pull_request_id.to_string(), user_id.to_string()))
        {
            return Err(ReviewError::Internal(format!(
                "reviewer {user_id} already assigned to {pull_request_id}"
            )));
        }
        Ok(())
    }

    async fn remove_reviewer(&self, pull_request_id: &str, user_id: &str) -> ReviewResult<()> {
        let mut state = self.staged.write().await;
        if !state
            .reviewers
            .remove(&(pull_request_id.to_string(), user_id.to_string()))
        {
            return Err(ReviewError::NotAssigned {
                pull_request_id: pull_request_id.to_string(),
                user_id: user_id.to_string(),
            });
        }
        Ok(())
    }

    async fn get_reviewers(&self, pull_request_id: &str) -> ReviewResult<Vec<PullRequestReviewer>> {
        let state = self.staged.read().await;
        Ok(state
            .reviewers
            .iter()
            .filter(|(pr_id, _)| pr_id == pull_request_id)
            .map(|(pr_id, user_id)| PullRequestReviewer {
                pull_request_id: pr_id.clone(),
                user_id: user_id.clone(),
            })
            .collect())
    }

    async fn get_assigned_to_user(&self, user_id: &str) -> ReviewResult<Vec<PullRequest>> {
        let state = self.staged.read().await;
        let mut assigned: Vec<PullRequest> = state
            .reviewers
            .iter()
            .filter(|(_, reviewer)| reviewer == user_id)
            .filter_map(|(pr_id, _)| state.pull_requests.get(pr_id).cloned())
            .collect();

        assigned.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.pull_request_id.cmp(&b.pull_request_id))
        });
        Ok(assigned)
    }
}
