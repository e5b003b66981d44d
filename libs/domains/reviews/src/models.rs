use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashSet;
use strum::Display;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

/// Upper bound on reviewers picked when a pull request is opened.
pub const MAX_REVIEWERS: usize = 2;

/// Current UTC time at the precision PostgreSQL stores.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Pull request lifecycle. Only `Open -> Merged` is allowed.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    Default,
    DeriveActiveEnum,
    EnumIter,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "pull_request_status")]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum PullRequestStatus {
    #[default]
    #[sea_orm(string_value = "OPEN")]
    Open,
    #[sea_orm(string_value = "MERGED")]
    Merged,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Team {
    pub team_name: String,
}

/// A user as listed under a team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
pub struct TeamMember {
    #[validate(custom(function = "not_blank", message = "user_id is required"))]
    pub user_id: String,
    #[validate(custom(function = "not_blank", message = "username is required"))]
    pub username: String,
    #[serde(default)]
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub user_id: String,
    pub username: String,
    pub team_name: String,
    pub is_active: bool,
}

impl User {
    pub fn from_member(team_name: &str, member: &TeamMember) -> Self {
        Self {
            user_id: member.user_id.clone(),
            username: member.username.clone(),
            team_name: team_name.to_string(),
            is_active: member.is_active,
        }
    }
}

impl From<User> for TeamMember {
    fn from(user: User) -> Self {
        Self {
            user_id: user.user_id,
            username: user.username,
            is_active: user.is_active,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    pub pull_request_id: String,
    pub pull_request_name: String,
    pub author_id: String,
    pub status: PullRequestStatus,
    pub created_at: DateTime<Utc>,
    pub merged_at: Option<DateTime<Utc>>,
}

impl PullRequest {
    pub fn open(
        pull_request_id: impl Into<String>,
        pull_request_name: impl Into<String>,
        author_id: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            pull_request_id: pull_request_id.into(),
            pull_request_name: pull_request_name.into(),
            author_id: author_id.into(),
            status: PullRequestStatus::Open,
            created_at,
            merged_at: None,
        }
    }

    pub fn is_merged(&self) -> bool {
        self.status == PullRequestStatus::Merged
    }

    /// Returns `false` (and leaves the record untouched) if already merged.
    pub fn merge(&mut self, at: DateTime<Utc>) -> bool {
        if self.is_merged() {
            return false;
        }
        self.status = PullRequestStatus::Merged;
        self.merged_at = Some(at);
        true
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PullRequestReviewer {
    pub pull_request_id: String,
    pub user_id: String,
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct AddTeamRequest {
    #[validate(custom(function = "not_blank", message = "team_name is required"))]
    pub team_name: String,
    #[validate(
        length(min = 1, message = "team must have at least one member"),
        custom(function = "unique_user_ids")
    )]
    #[validate(nested)]
    pub members: Vec<TeamMember>,
}

#[derive(Debug, Clone, Deserialize, Validate, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct TeamQuery {
    #[validate(custom(function = "not_blank", message = "team_name is required"))]
    pub team_name: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SetIsActiveRequest {
    #[validate(custom(function = "not_blank", message = "user_id is required"))]
    pub user_id: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, Deserialize, Validate, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct UserQuery {
    #[validate(custom(function = "not_blank", message = "user_id is required"))]
    pub user_id: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreatePullRequest {
    #[validate(custom(function = "not_blank", message = "pull_request_id is required"))]
    pub pull_request_id: String,
    #[validate(custom(function = "not_blank", message = "pull_request_name is required"))]
    pub pull_request_name: String,
    #[validate(custom(function = "not_blank", message = "author_id is required"))]
    pub author_id: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct MergePullRequest {
    #[validate(custom(function = "not_blank", message = "pull_request_id is required"))]
    pub pull_request_id: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ReassignReviewer {
    #[validate(custom(function = "not_blank", message = "pull_request_id is required"))]
    pub pull_request_id: String,
    #[validate(custom(function = "not_blank", message = "old_user_id is required"))]
    pub old_user_id: String,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

fn unique_user_ids(members: &[TeamMember]) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for member in members {
        if !seen.insert(member.user_id.as_str()) {
            let mut err = ValidationError::new("duplicate");
            err.message = Some(format!("duplicate user_id: {}", member.user_id).into());
            return Err(err);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// A team with its members, ordered by `user_id` when read back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TeamDetails {
    pub team_name: String,
    pub members: Vec<TeamMember>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TeamResponse {
    pub team: TeamDetails,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub user: User,
}

/// Full pull request view with its reviewers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PullRequestDetails {
    pub pull_request_id: String,
    pub pull_request_name: String,
    pub author_id: String,
    pub status: PullRequestStatus,
    pub assigned_reviewers: Vec<String>,
    #[serde(rename = "createdAt", with = "rfc3339_seconds")]
    pub created_at: DateTime<Utc>,
    #[serde(
        rename = "mergedAt",
        with = "rfc3339_seconds::option",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub merged_at: Option<DateTime<Utc>>,
}

/// Whole-second RFC 3339 (`2025-11-01T10:00:00Z`) on the wire. Stored values
/// keep microseconds.
mod rfc3339_seconds {
    use super::*;

    pub fn serialize<S: Serializer>(at: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&at.to_rfc3339_opts(SecondsFormat::Secs, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        DateTime::<Utc>::deserialize(d)
    }

    pub mod option {
        use super::*;

        pub fn serialize<S: Serializer>(
            at: &Option<DateTime<Utc>>,
            s: S,
        ) -> Result<S::Ok, S::Error> {
            match at {
                Some(at) => super::serialize(at, s),
                None => s.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            d: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            Option::<DateTime<Utc>>::deserialize(d)
        }
    }
}

impl PullRequestDetails {
    pub fn new(pr: PullRequest, reviewers: Vec<PullRequestReviewer>) -> Self {
        Self {
            pull_request_id: pr.pull_request_id,
            pull_request_name: pr.pull_request_name,
            author_id: pr.author_id,
            status: pr.status,
            assigned_reviewers: reviewers.into_iter().map(|r| r.user_id).collect(),
            created_at: pr.created_at,
            merged_at: pr.merged_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PullRequestResponse {
    pub pr: PullRequestDetails,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ReassignOutcome {
    pub pr: PullRequestDetails,
    pub replaced_by: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PullRequestShort {
    pub pull_request_id: String,
    pub pull_request_name: String,
    pub author_id: String,
    pub status: PullRequestStatus,
}

impl From<PullRequest> for PullRequestShort {
    fn from(pr: PullRequest) -> Self {
        Self {
            pull_request_id: pr.pull_request_id,
            pull_request_name: pr.pull_request_name,
            author_id: pr.author_id,
            status: pr.status,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserReviews {
    pub user_id: String,
    pub pull_requests: Vec<PullRequestShort>,
}
