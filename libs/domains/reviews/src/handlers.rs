use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use axum_helpers::{
    ValidatedJson, ValidatedQuery,
    errors::responses::{
        BadRequestResponse, ConflictResponse, InternalServerErrorResponse, NotFoundResponse,
    },
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::ReviewResult;
use crate::models::{
    AddTeamRequest, CreatePullRequest, MergePullRequest, PullRequestDetails, PullRequestResponse,
    PullRequestShort, PullRequestStatus, ReassignOutcome, ReassignReviewer, SetIsActiveRequest,
    TeamDetails, TeamMember, TeamQuery, TeamResponse, User, UserQuery, UserResponse, UserReviews,
};
use crate::repository::UnitOfWork;
use crate::service::{PullRequestService, TeamService, UserService};

const TEAMS_TAG: &str = "Teams";
const USERS_TAG: &str = "Users";
const PULL_REQUESTS_TAG: &str = "PullRequests";

/// OpenAPI documentation for the reviewer assignment API
#[derive(OpenApi)]
#[openapi(
    paths(
        add_team,
        get_team,
        set_is_active,
        get_review,
        create_pull_request,
        merge_pull_request,
        reassign_reviewer,
    ),
    components(
        schemas(
            AddTeamRequest,
            TeamMember,
            TeamDetails,
            TeamResponse,
            SetIsActiveRequest,
            User,
            UserResponse,
            UserReviews,
            PullRequestShort,
            PullRequestStatus,
            CreatePullRequest,
            MergePullRequest,
            ReassignReviewer,
            PullRequestDetails,
            PullRequestResponse,
            ReassignOutcome,
        ),
        responses(
            BadRequestResponse,
            NotFoundResponse,
            ConflictResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = TEAMS_TAG, description = "Teams and their members"),
        (name = USERS_TAG, description = "User activity and review load"),
        (name = PULL_REQUESTS_TAG, description = "Pull requests and reviewer assignment")
    )
)]
pub struct ApiDoc;

/// All reviewer-assignment routes over one unit of work.
pub fn router<U: UnitOfWork>(uow: Arc<U>) -> Router {
    let teams = Router::new()
        .route("/team/add", post(add_team::<U>))
        .route("/team/get", get(get_team::<U>))
        .with_state(Arc::new(TeamService::new(uow.clone())));

    let users = Router::new()
        .route("/users/setIsActive", post(set_is_active::<U>))
        .route("/users/getReview", get(get_review::<U>))
        .with_state(Arc::new(UserService::new(uow.clone())));

    let pull_requests = Router::new()
        .route("/pullRequest/create", post(create_pull_request::<U>))
        .route("/pullRequest/merge", post(merge_pull_request::<U>))
        .route("/pullRequest/reassign", post(reassign_reviewer::<U>))
        .with_state(Arc::new(PullRequestService::new(uow)));

    teams.merge(users).merge(pull_requests)
}

/// Create a team with its members
#[utoipa::path(
    post,
    path = "/team/add",
    tag = TEAMS_TAG,
    request_body = AddTeamRequest,
    responses(
        (status = 201, description = "Team created", body = TeamResponse),
        (status = 400, response = BadRequestResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn add_team<U: UnitOfWork>(
    State(service): State<Arc<TeamService<U>>>,
    ValidatedJson(request): ValidatedJson<AddTeamRequest>,
) -> ReviewResult<impl IntoResponse> {
    let team = service.add_team(request).await?;
    Ok((StatusCode::CREATED, Json(TeamResponse { team })))
}

/// Get a team with its current members
#[utoipa::path(
    get,
    path = "/team/get",
    tag = TEAMS_TAG,
    params(TeamQuery),
    responses(
        (status = 200, description = "Team found", body = TeamDetails),
        (status = 400, response = BadRequestResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_team<U: UnitOfWork>(
    State(service): State<Arc<TeamService<U>>>,
    ValidatedQuery(query): ValidatedQuery<TeamQuery>,
) -> ReviewResult<Json<TeamDetails>> {
    let team = service.get_team(&query.team_name).await?;
    Ok(Json(team))
}

/// Activate or deactivate a user
#[utoipa::path(
    post,
    path = "/users/setIsActive",
    tag = USERS_TAG,
    request_body = SetIsActiveRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, response = BadRequestResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn set_is_active<U: UnitOfWork>(
    State(service): State<Arc<UserService<U>>>,
    ValidatedJson(request): ValidatedJson<SetIsActiveRequest>,
) -> ReviewResult<Json<UserResponse>> {
    let user = service.set_is_active(request).await?;
    Ok(Json(UserResponse { user }))
}

/// Pull requests the user is reviewing
#[utoipa::path(
    get,
    path = "/users/getReview",
    tag = USERS_TAG,
    params(UserQuery),
    responses(
        (status = 200, description = "Assigned pull requests, newest first", body = UserReviews),
        (status = 400, response = BadRequestResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_review<U: UnitOfWork>(
    State(service): State<Arc<UserService<U>>>,
    ValidatedQuery(query): ValidatedQuery<UserQuery>,
) -> ReviewResult<Json<UserReviews>> {
    let reviews = service.get_reviews(&query.user_id).await?;
    Ok(Json(reviews))
}

/// Open a pull request and auto-assign reviewers
#[utoipa::path(
    post,
    path = "/pullRequest/create",
    tag = PULL_REQUESTS_TAG,
    request_body = CreatePullRequest,
    responses(
        (status = 201, description = "Pull request created", body = PullRequestResponse),
        (status = 400, response = BadRequestResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_pull_request<U: UnitOfWork>(
    State(service): State<Arc<PullRequestService<U>>>,
    ValidatedJson(request): ValidatedJson<CreatePullRequest>,
) -> ReviewResult<impl IntoResponse> {
    let pr = service.create(request).await?;
    Ok((StatusCode::CREATED, Json(PullRequestResponse { pr })))
}

/// Merge a pull request (idempotent)
#[utoipa::path(
    post,
    path = "/pullRequest/merge",
    tag = PULL_REQUESTS_TAG,
    request_body = MergePullRequest,
    responses(
        (status = 200, description = "Pull request merged", body = PullRequestResponse),
        (status = 400, response = BadRequestResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn merge_pull_request<U: UnitOfWork>(
    State(service): State<Arc<PullRequestService<U>>>,
    ValidatedJson(request): ValidatedJson<MergePullRequest>,
) -> ReviewResult<Json<PullRequestResponse>> {
    let pr = service.merge(&request.pull_request_id).await?;
    Ok(Json(PullRequestResponse { pr }))
}

/// Replace one reviewer with another active teammate
#[utoipa::path(
    post,
    path = "/pullRequest/reassign",
    tag = PULL_REQUESTS_TAG,
    request_body = ReassignReviewer,
    responses(
        (status = 200, description = "Reviewer replaced", body = ReassignOutcome),
        (status = 400, response = BadRequestResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn reassign_reviewer<U: UnitOfWork>(
    State(service): State<Arc<PullRequestService<U>>>,
    ValidatedJson(request): ValidatedJson<ReassignReviewer>,
) -> ReviewResult<Json<ReassignOutcome>> {
    let outcome = service
        .reassign(&request.pull_request_id, &request.old_user_id)
        .await?;
    Ok(Json(outcome))
}
