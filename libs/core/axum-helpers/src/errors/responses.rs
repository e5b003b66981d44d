//! Reusable OpenAPI response definitions for the error envelope.

use super::ErrorResponse;
#[allow(unused_imports)]
use serde_json::json;
use utoipa::ToResponse;

#[derive(ToResponse)]
#[response(
    description = "Malformed body or failed validation",
    content_type = "application/json",
    example = json!({
        "error": {
            "code": "VALIDATION_ERROR",
            "message": "team_name: must not be blank"
        }
    })
)]
pub struct BadRequestResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Resource not found",
    content_type = "application/json",
    example = json!({
        "error": { "code": "NOT_FOUND", "message": "resource not found" }
    })
)]
pub struct NotFoundResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Request conflicts with the current state",
    content_type = "application/json",
    example = json!({
        "error": { "code": "PR_MERGED", "message": "PR is already merged" }
    })
)]
pub struct ConflictResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Internal Server Error",
    content_type = "application/json",
    example = json!({
        "error": { "code": "INTERNAL_ERROR", "message": "internal server error" }
    })
)]
pub struct InternalServerErrorResponse(pub ErrorResponse);
