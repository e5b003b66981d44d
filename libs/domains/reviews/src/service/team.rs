use std::sync::Arc;

use crate::error::{ReviewError, ReviewResult};
use crate::models::{AddTeamRequest, Team, TeamDetails};
use crate::repository::{TeamRepository, UnitOfWork, UserRepository, transact};

pub struct TeamService<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> TeamService<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    /// Creates the team and registers every member in it, or nothing at all.
    #[tracing::instrument(skip(self, request), fields(team_name = %request.team_name))]
    pub async fn add_team(&self, request: AddTeamRequest) -> ReviewResult<TeamDetails> {
        let AddTeamRequest { team_name, members } = request;

        let team = transact(self.uow.as_ref(), |tx| {
            Box::pin(async move {
                if tx.get_team(&team_name).await?.is_some() {
                    return Err(ReviewError::TeamExists(team_name));
                }
                tx.add_team(&Team {
                    team_name: team_name.clone(),
                })
                .await?;

                for member in &members {
                    if tx.get_user(&member.user_id).await?.is_some() {
                        return Err(ReviewError::UserExists(member.user_id.clone()));
                    }
                    tx.add_member(&team_name, member).await?;
                }

                Ok(TeamDetails { team_name, members })
            })
        })
        .await?;

        tracing::info!(members = team.members.len(), "Created team");
        Ok(team)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_team(&self, team_name: &str) -> ReviewResult<TeamDetails> {
        let team_name = team_name.to_string();

        transact(self.uow.as_ref(), |tx| {
            Box::pin(async move {
                let team = tx
                    .get_team(&team_name)
                    .await?
                    .ok_or_else(|| ReviewError::team_not_found(&team_name))?;
                let members = tx.get_members(&team.team_name).await?;
                Ok(TeamDetails {
                    team_name: team.team_name,
                    members,
                })
            })
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TeamMember;
    use crate::test_support::{ScopeFixture, user};

    fn request(members: &[&str]) -> AddTeamRequest {
        AddTeamRequest {
            team_name: "backend".into(),
            members: members
                .iter()
                .map(|id| TeamMember {
                    user_id: id.to_string(),
                    username: id.to_uppercase(),
                    is_active: true,
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_add_team_rejects_existing_team_before_writing() {
        let mut fixture = ScopeFixture::new();
        fixture
            .teams
            .expect_get_team()
            .returning(|name| Ok(Some(Team { team_name: name.to_string() })));
        fixture.teams.expect_add_team().never();
        fixture.teams.expect_add_member().never();
        let uow = Arc::new(fixture.unit_of_work());

        let err = TeamService::new(uow.clone())
            .add_team(request(&["u1"]))
            .await
            .unwrap_err();

        assert_eq!(err, ReviewError::TeamExists("backend".into()));
        assert!(uow.rolled_back());
    }

    #[tokio::test]
    async fn test_add_team_stops_at_registered_user() {
        let mut fixture = ScopeFixture::new();
        fixture.teams.expect_get_team().returning(|_| Ok(None));
        fixture.teams.expect_add_team().times(1).returning(|_| Ok(()));
        fixture
            .users
            .expect_get_user()
            .returning(|id| Ok((id == "u2").then(|| user("u2", "frontend", true))));
        fixture
            .teams
            .expect_add_member()
            .withf(|team, member| team == "backend" && member.user_id == "u1")
            .times(1)
            .returning(|_, _| Ok(()));
        let uow = Arc::new(fixture.unit_of_work());

        let err = TeamService::new(uow.clone())
            .add_team(request(&["u1", "u2", "u3"]))
            .await
            .unwrap_err();

        assert_eq!(err, ReviewError::UserExists("u2".into()));
        assert!(uow.rolled_back());
        assert!(!uow.committed());
    }

    #[tokio::test]
    async fn test_add_team_echoes_members_in_request_order() {
        let mut fixture = ScopeFixture::new();
        fixture.teams.expect_get_team().returning(|_| Ok(None));
        fixture.teams.expect_add_team().returning(|_| Ok(()));
        fixture.users.expect_get_user().returning(|_| Ok(None));
        fixture
            .teams
            .expect_add_member()
            .times(2)
            .returning(|_, _| Ok(()));
        let uow = Arc::new(fixture.unit_of_work());

        let team = TeamService::new(uow.clone())
            .add_team(request(&["u9", "u1"]))
            .await
            .unwrap();

        let ids: Vec<_> = team.members.iter().map(|m| m.user_id.as_str()).collect();
        assert_eq!(ids, ["u9", "u1"]);
        assert!(uow.committed());
    }

    #[tokio::test]
    async fn test_get_team_not_found() {
        let mut fixture = ScopeFixture::new();
        fixture.teams.expect_get_team().returning(|_| Ok(None));
        fixture.teams.expect_get_members().never();
        let uow = Arc::new(fixture.unit_of_work());

        let err = TeamService::new(uow).get_team("ghost").await.unwrap_err();

        assert_eq!(err.code(), "NOT_FOUND");
    }
}
