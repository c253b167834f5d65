use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    components(schemas(axum_helpers::ErrorResponse)),
    info(
        title = "Tags API",
        version = "0.1.0",
        description = "Get-or-create tags, prefix search, and ordered entity-to-tag links"
    ),
    servers((url = "/api", description = "API base path")),
    nest((path = "/tag", api = domain_tags::ApiDoc))
)]
pub struct ApiDoc;
