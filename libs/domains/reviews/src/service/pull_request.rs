use std::sync::Arc;

use crate::error::{ReviewError, ReviewResult};
use crate::models::{
    CreatePullRequest, MAX_REVIEWERS, PullRequest, PullRequestDetails, ReassignOutcome, User, now,
};
use crate::repository::{PullRequestRepository, UnitOfWork, UserRepository, transact};

/// Reviewer assignment and the pull request lifecycle.
pub struct PullRequestService<U: UnitOfWork> {
    uow: Arc<U>,
}

/// First `limit` users, in the given order, whose ID is not in `excluded`.
///
/// Create and reassign both pick through this so they agree on who is
/// eligible and in what order.
fn pick_reviewers<'a>(active: &'a [User], excluded: &[&str], limit: usize) -> Vec<&'a User> {
    active
        .iter()
        .filter(|u| !excluded.contains(&u.user_id.as_str()))
        .take(limit)
        .collect()
}

impl<U: UnitOfWork> PullRequestService<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    /// Opens a pull request and assigns up to two active teammates of the
    /// author. Fewer are assigned when the team is short; that is not an error.
    #[tracing::instrument(skip(self))]
    pub async fn create(&self, request: CreatePullRequest) -> ReviewResult<PullRequestDetails> {
        let CreatePullRequest {
            pull_request_id,
            pull_request_name,
            author_id,
        } = request;

        let details = transact(self.uow.as_ref(), |tx| {
            Box::pin(async move {
                if tx.get_pull_request(&pull_request_id).await?.is_some() {
                    return Err(ReviewError::PrExists(pull_request_id));
                }
                let author = tx
                    .get_user(&author_id)
                    .await?
                    .ok_or_else(|| ReviewError::user_not_found(&author_id))?;

                let pr = PullRequest::open(pull_request_id, pull_request_name, author_id, now());
                tx.add_pull_request(&pr).await?;

                let active = tx.get_active_by_team(&author.team_name).await?;
                let picked = pick_reviewers(&active, &[pr.author_id.as_str()], MAX_REVIEWERS);

                let mut reviewers = Vec::with_capacity(picked.len());
                for reviewer in picked {
                    tx.add_reviewer(&pr.pull_request_id, &reviewer.user_id)
                        .await?;
                    reviewers.push(reviewer.user_id.clone());
                }

                Ok(PullRequestDetails {
                    assigned_reviewers: reviewers,
                    ..PullRequestDetails::new(pr, Vec::new())
                })
            })
        })
        .await?;

        tracing::info!(
            pull_request_id = %details.pull_request_id,
            reviewers = ?details.assigned_reviewers,
            "Opened pull request"
        );
        Ok(details)
    }

    /// Marks the pull request merged. Merging a merged pull request returns
    /// it unchanged.
    #[tracing::instrument(skip(self))]
    pub async fn merge(&self, pull_request_id: &str) -> ReviewResult<PullRequestDetails> {
        let pull_request_id = pull_request_id.to_string();

        transact(self.uow.as_ref(), |tx| {
            Box::pin(async move {
                let mut pr = tx
                    .get_pull_request_for_update(&pull_request_id)
                    .await?
                    .ok_or_else(|| ReviewError::pull_request_not_found(&pull_request_id))?;

                if pr.merge(now()) {
                    tx.update_pull_request(&pr).await?;
                    tracing::info!(pull_request_id = %pr.pull_request_id, "Merged pull request");
                }

                let reviewers = tx.get_reviewers(&pr.pull_request_id).await?;
                Ok(PullRequestDetails::new(pr, reviewers))
            })
        })
        .await
    }

    /// Swaps `old_user_id` for the first eligible active teammate of the
    /// author.
    #[tracing::instrument(skip(self))]
    pub async fn reassign(
        &self,
        pull_request_id: &str,
        old_user_id: &str,
    ) -> ReviewResult<ReassignOutcome> {
        let pull_request_id = pull_request_id.to_string();
        let old_user_id = old_user_id.to_string();

        let outcome = transact(self.uow.as_ref(), |tx| {
            Box::pin(async move {
                let pr = tx
                    .get_pull_request_for_update(&pull_request_id)
                    .await?
                    .ok_or_else(|| ReviewError::pull_request_not_found(&pull_request_id))?;

                if pr.is_merged() {
                    return Err(ReviewError::PrMerged(pull_request_id));
                }

                let reviewers = tx.get_reviewers(&pull_request_id).await?;
                if !reviewers.iter().any(|r| r.user_id == old_user_id) {
                    return Err(ReviewError::NotAssigned {
                        pull_request_id,
                        user_id: old_user_id,
                    });
                }

                let author = tx
                    .get_user(&pr.author_id)
                    .await?
                    .ok_or_else(|| ReviewError::user_not_found(&pr.author_id))?;

                let active = tx.get_active_by_team(&author.team_name).await?;
                let mut excluded: Vec<&str> = vec![pr.author_id.as_str(), old_user_id.as_str()];
                excluded.extend(reviewers.iter().map(|r| r.user_id.as_str()));

                let replacement = pick_reviewers(&active, &excluded, 1)
                    .first()
                    .map(|u| u.user_id.clone())
                    .ok_or_else(|| ReviewError::NoCandidate(pull_request_id.clone()))?;

                tx.remove_reviewer(&pull_request_id, &old_user_id).await?;
                tx.add_reviewer(&pull_request_id, &replacement).await?;

                let reviewers = tx.get_reviewers(&pull_request_id).await?;
                Ok(ReassignOutcome {
                    pr: PullRequestDetails::new(pr, reviewers),
                    replaced_by: replacement,
                })
            })
        })
        .await?;

        tracing::info!(
            pull_request_id = %outcome.pr.pull_request_id,
            replaced_by = %outcome.replaced_by,
            "Reassigned reviewer"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PullRequestReviewer, PullRequestStatus};
    use crate::test_support::{ScopeFixture, user};

    fn open_pr() -> PullRequest {
        PullRequest::open("pr-1", "Add search", "alice", now())
    }

    fn reviewers(ids: &[&str]) -> Vec<PullRequestReviewer> {
        ids.iter()
            .map(|id| PullRequestReviewer {
                pull_request_id: "pr-1".into(),
                user_id: id.to_string(),
            })
            .collect()
    }

    fn create_request() -> CreatePullRequest {
        CreatePullRequest {
            pull_request_id: "pr-1".into(),
            pull_request_name: "Add search".into(),
            author_id: "alice".into(),
        }
    }

    #[test]
    fn test_pick_reviewers_skips_excluded_and_caps() {
        let active = vec![
            user("alice", "t", true),
            user("bob", "t", true),
            user("dave", "t", true),
            user("erin", "t", true),
        ];

        let picked = pick_reviewers(&active, &["alice"], 2);
        let ids: Vec<_> = picked.iter().map(|u| u.user_id.as_str()).collect();
        assert_eq!(ids, ["bob", "dave"]);

        let picked = pick_reviewers(&active, &["alice", "bob", "dave"], 1);
        assert_eq!(picked[0].user_id, "erin");

        assert!(pick_reviewers(&active, &["alice", "bob", "dave", "erin"], 1).is_empty());
    }

    #[tokio::test]
    async fn test_create_assigns_two_non_author_reviewers() {
        let mut fixture = ScopeFixture::new();
        fixture
            .pull_requests
            .expect_get_pull_request()
            .returning(|_| Ok(None));
        fixture
            .users
            .expect_get_user()
            .returning(|id| Ok(Some(user(id, "backend", true))));
        fixture
            .pull_requests
            .expect_add_pull_request()
            .withf(|pr| pr.status == PullRequestStatus::Open && pr.merged_at.is_none())
            .times(1)
            .returning(|_| Ok(()));
        fixture.users.expect_get_active_by_team().returning(|team| {
            Ok(vec![
                user("alice", team, true),
                user("bob", team, true),
                user("carol", team, true),
                user("dave", team, true),
            ])
        });
        fixture
            .pull_requests
            .expect_add_reviewer()
            .withf(|_, reviewer| reviewer == "bob" || reviewer == "carol")
            .times(2)
            .returning(|_, _| Ok(()));
        let uow = Arc::new(fixture.unit_of_work());

        let pr = PullRequestService::new(uow.clone())
            .create(create_request())
            .await
            .unwrap();

        assert_eq!(pr.assigned_reviewers, ["bob", "carol"]);
        assert!(uow.committed());
    }

    #[tokio::test]
    async fn test_create_with_author_alone_assigns_nobody() {
        let mut fixture = ScopeFixture::new();
        fixture
            .pull_requests
            .expect_get_pull_request()
            .returning(|_| Ok(None));
        fixture
            .users
            .expect_get_user()
            .returning(|id| Ok(Some(user(id, "solo", true))));
        fixture
            .pull_requests
            .expect_add_pull_request()
            .returning(|_| Ok(()));
        fixture
            .users
            .expect_get_active_by_team()
            .returning(|team| Ok(vec![user("alice", team, true)]));
        fixture.pull_requests.expect_add_reviewer().never();
        let uow = Arc::new(fixture.unit_of_work());

        let pr = PullRequestService::new(uow)
            .create(create_request())
            .await
            .unwrap();

        assert!(pr.assigned_reviewers.is_empty());
    }

    #[tokio::test]
    async fn test_create_existing_pull_request() {
        let mut fixture = ScopeFixture::new();
        fixture
            .pull_requests
            .expect_get_pull_request()
            .returning(|_| Ok(Some(open_pr())));
        fixture.pull_requests.expect_add_pull_request().never();
        let uow = Arc::new(fixture.unit_of_work());

        let err = PullRequestService::new(uow.clone())
            .create(create_request())
            .await
            .unwrap_err();

        assert_eq!(err.code(), "PR_EXISTS");
        assert!(uow.rolled_back());
    }

    #[tokio::test]
    async fn test_create_unknown_author() {
        let mut fixture = ScopeFixture::new();
        fixture
            .pull_requests
            .expect_get_pull_request()
            .returning(|_| Ok(None));
        fixture.users.expect_get_user().returning(|_| Ok(None));
        fixture.pull_requests.expect_add_pull_request().never();
        let uow = Arc::new(fixture.unit_of_work());

        let err = PullRequestService::new(uow)
            .create(create_request())
            .await
            .unwrap_err();

        assert_eq!(err, ReviewError::user_not_found("alice"));
    }

    #[tokio::test]
    async fn test_merge_already_merged_skips_update() {
        let mut merged = open_pr();
        merged.merge(now());
        let expected_at = merged.merged_at;

        let mut fixture = ScopeFixture::new();
        fixture
            .pull_requests
            .expect_get_pull_request_for_update()
            .returning(move |_| Ok(Some(merged.clone())));
        fixture.pull_requests.expect_update_pull_request().never();
        fixture
            .pull_requests
            .expect_get_reviewers()
            .returning(|_| Ok(reviewers(&["bob"])));
        let uow = Arc::new(fixture.unit_of_work());

        let pr = PullRequestService::new(uow.clone())
            .merge("pr-1")
            .await
            .unwrap();

        assert_eq!(pr.status, PullRequestStatus::Merged);
        assert_eq!(pr.merged_at, expected_at);
        assert!(uow.committed());
    }

    #[tokio::test]
    async fn test_merge_open_pull_request() {
        let mut fixture = ScopeFixture::new();
        fixture
            .pull_requests
            .expect_get_pull_request_for_update()
            .returning(|_| Ok(Some(open_pr())));
        fixture
            .pull_requests
            .expect_update_pull_request()
            .withf(|pr| pr.is_merged() && pr.merged_at.is_some())
            .times(1)
            .returning(|_| Ok(()));
        fixture
            .pull_requests
            .expect_get_reviewers()
            .returning(|_| Ok(vec![]));
        let uow = Arc::new(fixture.unit_of_work());

        let pr = PullRequestService::new(uow).merge("pr-1").await.unwrap();

        assert_eq!(pr.status, PullRequestStatus::Merged);
        assert!(pr.merged_at.is_some());
    }

    #[tokio::test]
    async fn test_reassign_merged_pull_request() {
        let mut merged = open_pr();
        merged.merge(now());

        let mut fixture = ScopeFixture::new();
        fixture
            .pull_requests
            .expect_get_pull_request_for_update()
            .returning(move |_| Ok(Some(merged.clone())));
        fixture.pull_requests.expect_remove_reviewer().never();
        let uow = Arc::new(fixture.unit_of_work());

        let err = PullRequestService::new(uow.clone())
            .reassign("pr-1", "bob")
            .await
            .unwrap_err();

        assert_eq!(err.code(), "PR_MERGED");
        assert!(uow.rolled_back());
    }

    #[tokio::test]
    async fn test_reassign_unassigned_user() {
        let mut fixture = ScopeFixture::new();
        fixture
            .pull_requests
            .expect_get_pull_request_for_update()
            .returning(|_| Ok(Some(open_pr())));
        fixture
            .pull_requests
            .expect_get_reviewers()
            .returning(|_| Ok(reviewers(&["bob"])));
        let uow = Arc::new(fixture.unit_of_work());

        let err = PullRequestService::new(uow)
            .reassign("pr-1", "carol")
            .await
            .unwrap_err();

        assert_eq!(err.code(), "NOT_ASSIGNED");
    }

    #[tokio::test]
    async fn test_reassign_skips_author_old_and_current_reviewers() {
        let mut fixture = ScopeFixture::new();
        fixture
            .pull_requests
            .expect_get_pull_request_for_update()
            .returning(|_| Ok(Some(open_pr())));
        let mut reads = 0;
        fixture
            .pull_requests
            .expect_get_reviewers()
            .times(2)
            .returning(move |_| {
                reads += 1;
                match reads {
                    1 => Ok(reviewers(&["bob", "carol"])),
                    _ => Ok(reviewers(&["carol", "dave"])),
                }
            });
        fixture
            .users
            .expect_get_user()
            .returning(|id| Ok(Some(user(id, "backend", true))));
        fixture.users.expect_get_active_by_team().returning(|team| {
            Ok(vec![
                user("alice", team, true),
                user("bob", team, true),
                user("carol", team, true),
                user("dave", team, true),
            ])
        });
        fixture
            .pull_requests
            .expect_remove_reviewer()
            .withf(|pr, old| pr == "pr-1" && old == "bob")
            .times(1)
            .returning(|_, _| Ok(()));
        fixture
            .pull_requests
            .expect_add_reviewer()
            .withf(|pr, new| pr == "pr-1" && new == "dave")
            .times(1)
            .returning(|_, _| Ok(()));
        let uow = Arc::new(fixture.unit_of_work());

        let outcome = PullRequestService::new(uow.clone())
            .reassign("pr-1", "bob")
            .await
            .unwrap();

        assert_eq!(outcome.replaced_by, "dave");
        assert_eq!(outcome.pr.assigned_reviewers, ["carol", "dave"]);
        assert!(uow.committed());
    }

    #[tokio::test]
    async fn test_reassign_without_candidate() {
        let mut fixture = ScopeFixture::new();
        fixture
            .pull_requests
            .expect_get_pull_request_for_update()
            .returning(|_| Ok(Some(open_pr())));
        fixture
            .pull_requests
            .expect_get_reviewers()
            .returning(|_| Ok(reviewers(&["bob"])));
        fixture
            .users
            .expect_get_user()
            .returning(|id| Ok(Some(user(id, "backend", true))));
        fixture
            .users
            .expect_get_active_by_team()
            .returning(|team| Ok(vec![user("alice", team, true), user("bob", team, true)]));
        fixture.pull_requests.expect_remove_reviewer().never();
        fixture.pull_requests.expect_add_reviewer().never();
        let uow = Arc::new(fixture.unit_of_work());

        let err = PullRequestService::new(uow.clone())
            .reassign("pr-1", "bob")
            .await
            .unwrap_err();

        assert_eq!(err, ReviewError::NoCandidate("pr-1".into()));
        assert!(uow.rolled_back());
    }
}
