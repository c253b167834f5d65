use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Longest tag name the store accepts, matching the `tags.name` column.
pub const MAX_TAG_NAME_LEN: usize = 255;

/// A tag as returned to callers and stored in the search index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Tag {
    pub tag_id: i64,
    pub name: String,
}

impl Tag {
    pub fn new(tag_id: i64, name: impl Into<String>) -> Self {
        Self {
            tag_id,
            name: name.into(),
        }
    }
}

/// Association between an external entity and a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct EntityTagLink {
    pub link_id: i64,
    pub entity_id: i64,
    pub tag_id: i64,
}

/// Outcome of an insert-if-absent: the row ID and whether this call created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Upserted {
    pub id: i64,
    pub created: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct CreateTagRequest {
    /// Surrounding whitespace is trimmed before storing
    #[validate(length(min = 1, message = "Tag name is required"))]
    #[schema(example = "food street")]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateTagResponse {
    pub tag_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct SearchTagsQuery {
    /// Leading prefix of the tag name, case-insensitive
    pub keyword: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SearchTagsResponse {
    pub matches: Vec<Tag>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct LinkEntityTagRequest {
    pub entity_id: i64,
    pub tag_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LinkEntityTagResponse {
    pub link_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct EntityTagsQuery {
    pub entity_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EntityTagsResponse {
    pub tags: Vec<Tag>,
}
