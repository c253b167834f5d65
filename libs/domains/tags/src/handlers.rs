use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use axum_helpers::{ErrorResponse, ValidatedJson, ValidatedQuery};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::TagResult;
use crate::index::TagIndex;
use crate::models::{
    CreateTagRequest, CreateTagResponse, EntityTagsQuery, EntityTagsResponse,
    LinkEntityTagRequest, LinkEntityTagResponse, SearchTagsQuery, SearchTagsResponse, Tag,
};
use crate::repository::TagStore;
use crate::service::TagService;

pub const TAG: &str = "tags";

/// OpenAPI documentation for the Tags API
#[derive(OpenApi)]
#[openapi(
    paths(create_tag, search_tags, link_entity_tag, list_entity_tags),
    components(schemas(
        Tag,
        CreateTagRequest,
        CreateTagResponse,
        SearchTagsResponse,
        LinkEntityTagRequest,
        LinkEntityTagResponse,
        EntityTagsResponse,
        ErrorResponse,
    )),
    tags((name = TAG, description = "Tag creation, prefix search and entity linking"))
)]
pub struct ApiDoc;

/// Tag endpoints, meant to be nested at `/tag`.
pub fn router<S, I>(service: Arc<TagService<S, I>>) -> Router
where
    S: TagStore + 'static,
    I: TagIndex + 'static,
{
    Router::new()
        .route("/", post(create_tag::<S, I>))
        .route("/search", get(search_tags::<S, I>))
        .route("/link_entity", post(link_entity_tag::<S, I>))
        .route("/entity_tags", get(list_entity_tags::<S, I>))
        .with_state(service)
}

/// Get or create a tag by name
#[utoipa::path(
    post,
    path = "",
    tag = TAG,
    request_body = CreateTagRequest,
    responses(
        (status = 200, description = "Existing or newly created tag ID", body = CreateTagResponse),
        (status = 400, description = "Empty or over-long name", body = ErrorResponse),
        (status = 503, description = "Tag store unavailable", body = ErrorResponse)
    )
)]
async fn create_tag<S: TagStore, I: TagIndex + 'static>(
    State(service): State<Arc<TagService<S, I>>>,
    ValidatedJson(input): ValidatedJson<CreateTagRequest>,
) -> TagResult<Json<CreateTagResponse>> {
    let tag_id = service.create_tag(&input.name).await?;
    Ok(Json(CreateTagResponse { tag_id }))
}

/// Search tags by case-insensitive name prefix
#[utoipa::path(
    get,
    path = "/search",
    tag = TAG,
    params(SearchTagsQuery),
    responses(
        (status = 200, description = "Matching tags in relevance order", body = SearchTagsResponse),
        (status = 400, description = "Missing or empty keyword", body = ErrorResponse),
        (status = 503, description = "Search backend unavailable", body = ErrorResponse)
    )
)]
async fn search_tags<S: TagStore, I: TagIndex + 'static>(
    State(service): State<Arc<TagService<S, I>>>,
    ValidatedQuery(query): ValidatedQuery<SearchTagsQuery>,
) -> TagResult<Json<SearchTagsResponse>> {
    let matches = service.search_tags(&query.keyword).await?;
    Ok(Json(SearchTagsResponse { matches }))
}

/// Link an entity to an existing tag
#[utoipa::path(
    post,
    path = "/link_entity",
    tag = TAG,
    request_body = LinkEntityTagRequest,
    responses(
        (status = 200, description = "Existing or newly created link ID", body = LinkEntityTagResponse),
        (status = 400, description = "Zero entity or tag ID", body = ErrorResponse),
        (status = 404, description = "Tag does not exist", body = ErrorResponse),
        (status = 503, description = "Tag store unavailable", body = ErrorResponse)
    )
)]
async fn link_entity_tag<S: TagStore, I: TagIndex + 'static>(
    State(service): State<Arc<TagService<S, I>>>,
    ValidatedJson(input): ValidatedJson<LinkEntityTagRequest>,
) -> TagResult<Json<LinkEntityTagResponse>> {
    let link_id = service
        .link_entity_tag(input.entity_id, input.tag_id)
        .await?;
    Ok(Json(LinkEntityTagResponse { link_id }))
}

/// List an entity's tags in the order they were linked
#[utoipa::path(
    get,
    path = "/entity_tags",
    tag = TAG,
    params(EntityTagsQuery),
    responses(
        (status = 200, description = "Linked tags in link order", body = EntityTagsResponse),
        (status = 400, description = "Missing or zero entity ID", body = ErrorResponse),
        (status = 503, description = "Tag store unavailable", body = ErrorResponse)
    )
)]
async fn list_entity_tags<S: TagStore, I: TagIndex + 'static>(
    State(service): State<Arc<TagService<S, I>>>,
    ValidatedQuery(query): ValidatedQuery<EntityTagsQuery>,
) -> TagResult<Json<EntityTagsResponse>> {
    let tags = service.list_entity_tags(query.entity_id).await?;
    Ok(Json(EntityTagsResponse { tags }))
}
