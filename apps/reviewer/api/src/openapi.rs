use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    components(schemas(axum_helpers::ErrorResponse)),
    info(
        title = "Reviewer API",
        version = "0.1.0",
        description = "Teams, users and pull requests with automatic reviewer assignment"
    )
)]
struct ServiceDoc;

/// Service info plus every domain operation.
pub struct ApiDoc;

impl OpenApi for ApiDoc {
    fn openapi() -> utoipa::openapi::OpenApi {
        let mut doc = ServiceDoc::openapi();
        doc.merge(domain_reviews::ApiDoc::openapi());
        doc
    }
}
