//! Integration tests for the reviews domain
//!
//! These tests use real PostgreSQL via testcontainers to ensure:
//! - Entities match the migrated schema
//! - Failed units of work leave no rows behind
//! - Row locks serialize concurrent reassignments
//!
//! Run with `cargo test -p domain_reviews -- --ignored` (needs Docker).

use domain_reviews::models::{AddTeamRequest, CreatePullRequest, SetIsActiveRequest, TeamMember};
use domain_reviews::*;
use sea_orm::IsolationLevel;
use std::sync::Arc;
use test_utils::{TestDataBuilder, TestDatabase, assertions::*};

fn members(builder: &TestDataBuilder, active: &[bool]) -> Vec<TeamMember> {
    active
        .iter()
        .enumerate()
        .map(|(i, is_active)| TeamMember {
            user_id: builder.id("u", i + 1),
            username: builder.name("user", &i.to_string()),
            is_active: *is_active,
        })
        .collect()
}

async fn seed(uow: &Arc<PgUnitOfWork>, builder: &TestDataBuilder, active: &[bool]) -> String {
    let team_name = builder.name("team", "main");
    TeamService::new(uow.clone())
        .add_team(AddTeamRequest {
            team_name: team_name.clone(),
            members: members(builder, active),
        })
        .await
        .unwrap();
    team_name
}

fn create(builder: &TestDataBuilder, index: usize, author: usize) -> CreatePullRequest {
    CreatePullRequest {
        pull_request_id: builder.id("pr", index),
        pull_request_name: builder.name("pr", &index.to_string()),
        author_id: builder.id("u", author),
    }
}

// ============================================================================
// Team and user
// ============================================================================

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_add_and_get_team() {
    let db = TestDatabase::new().await;
    let uow = Arc::new(PgUnitOfWork::new(db.connection()));
    let builder = TestDataBuilder::from_test_name("add_and_get_team");

    let team_name = seed(&uow, &builder, &[true, false, true]).await;
    let team = TeamService::new(uow.clone())
        .get_team(&team_name)
        .await
        .unwrap();

    assert_eq!(team.members.len(), 3);
    assert_eq!(team.members[0].user_id, builder.id("u", 1));
    assert!(!team.members[1].is_active);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_colliding_member_rolls_back_team() {
    let db = TestDatabase::new().await;
    let uow = Arc::new(PgUnitOfWork::new(db.connection()));
    let builder = TestDataBuilder::from_test_name("colliding_member");
    seed(&uow, &builder, &[true]).await;

    let other = builder.name("team", "other");
    let err = assert_err(
        TeamService::new(uow.clone())
            .add_team(AddTeamRequest {
                team_name: other.clone(),
                members: members(&builder, &[true]),
            })
            .await,
        "member id already registered",
    );

    assert_eq!(err.code(), "USER_EXISTS");
    let missing = TeamService::new(uow.clone()).get_team(&other).await;
    assert_eq!(assert_err(missing, "team rolled back").code(), "NOT_FOUND");
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_set_is_active_round_trips() {
    let db = TestDatabase::new().await;
    let uow = Arc::new(PgUnitOfWork::new(db.connection()));
    let builder = TestDataBuilder::from_test_name("set_is_active");
    let team_name = seed(&uow, &builder, &[true]).await;

    let user = UserService::new(uow.clone())
        .set_is_active(SetIsActiveRequest {
            user_id: builder.id("u", 1),
            is_active: false,
        })
        .await
        .unwrap();

    assert_eq!(user.team_name, team_name);
    let team = TeamService::new(uow).get_team(&team_name).await.unwrap();
    assert!(!team.members[0].is_active);
}

// ============================================================================
// Pull requests
// ============================================================================

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_create_merge_and_timestamps() {
    let db = TestDatabase::new().await;
    let uow = Arc::new(PgUnitOfWork::new(db.connection()));
    let builder = TestDataBuilder::from_test_name("create_merge");
    seed(&uow, &builder, &[true, true, false]).await;
    let service = PullRequestService::new(uow.clone());

    let created = service.create(create(&builder, 1, 1)).await.unwrap();
    assert_eq!(created.assigned_reviewers, [builder.id("u", 2)]);

    let merged = service.merge(&created.pull_request_id).await.unwrap();
    let again = service.merge(&created.pull_request_id).await.unwrap();

    assert_eq!(merged.created_at, created.created_at);
    assert_eq!(merged.status, PullRequestStatus::Merged);
    assert_eq!(merged, again);

    let err = service
        .reassign(&created.pull_request_id, &builder.id("u", 2))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "PR_MERGED");
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_duplicate_pull_request_id() {
    let db = TestDatabase::new().await;
    let uow = Arc::new(PgUnitOfWork::new(db.connection()));
    let builder = TestDataBuilder::from_test_name("duplicate_pr");
    seed(&uow, &builder, &[true, true]).await;
    let service = PullRequestService::new(uow);

    service.create(create(&builder, 1, 1)).await.unwrap();
    let err = service.create(create(&builder, 1, 2)).await.unwrap_err();

    assert_eq!(err.code(), "PR_EXISTS");
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_reassign_and_review_lists() {
    let db = TestDatabase::new().await;
    let uow = Arc::new(PgUnitOfWork::new(db.connection()));
    let builder = TestDataBuilder::from_test_name("reassign");
    seed(&uow, &builder, &[true, true, true, true]).await;
    let service = PullRequestService::new(uow.clone());
    let users = UserService::new(uow.clone());

    let first = service.create(create(&builder, 1, 1)).await.unwrap();
    service.create(create(&builder, 2, 1)).await.unwrap();
    assert_eq!(
        first.assigned_reviewers,
        [builder.id("u", 2), builder.id("u", 3)]
    );

    let outcome = service
        .reassign(&first.pull_request_id, &builder.id("u", 2))
        .await
        .unwrap();
    assert_eq!(outcome.replaced_by, builder.id("u", 4));

    let u2 = users.get_reviews(&builder.id("u", 2)).await.unwrap();
    let ids: Vec<_> = u2.pull_requests.iter().map(|p| p.pull_request_id.clone()).collect();
    assert_eq!(ids, [builder.id("pr", 2)]);

    let u3 = users.get_reviews(&builder.id("u", 3)).await.unwrap();
    let ids: Vec<_> = u3.pull_requests.iter().map(|p| p.pull_request_id.clone()).collect();
    assert_eq!(ids, [builder.id("pr", 2), builder.id("pr", 1)]);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_concurrent_reassign_serializes_on_row_lock() {
    let db = TestDatabase::new().await;
    let uow = Arc::new(PgUnitOfWork::with_isolation_level(
        db.connection(),
        IsolationLevel::ReadCommitted,
    ));
    let builder = TestDataBuilder::from_test_name("concurrent_reassign");
    seed(&uow, &builder, &[true, true, true, true, true]).await;
    let service = Arc::new(PullRequestService::new(uow.clone()));
    let pr = service.create(create(&builder, 1, 1)).await.unwrap();

    let old = builder.id("u", 2);
    let a = {
        let (service, id, old) = (service.clone(), pr.pull_request_id.clone(), old.clone());
        tokio::spawn(async move { service.reassign(&id, &old).await })
    };
    let b = {
        let (service, id, old) = (service.clone(), pr.pull_request_id.clone(), old.clone());
        tokio::spawn(async move { service.reassign(&id, &old).await })
    };
    let results = [a.await.unwrap(), b.await.unwrap()];

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    let loser = results.iter().find_map(|r| r.as_ref().err()).unwrap();
    assert_eq!(loser.code(), "NOT_ASSIGNED");

    let merged = service.merge(&pr.pull_request_id).await.unwrap();
    assert_eq!(merged.assigned_reviewers.len(), 2);
    assert!(!merged.assigned_reviewers.contains(&old));
}
