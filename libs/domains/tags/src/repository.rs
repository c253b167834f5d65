use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::TagResult;
use crate::models::{EntityTagLink, Tag, Upserted};

/// Persistence contract for tags and entity links.
///
/// The two `*_if_absent` operations must be atomic: concurrent callers with
/// the same key all observe the same row ID and exactly one sees `created`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TagStore: Send + Sync {
    async fn find_tag_by_name(&self, name: &str) -> TagResult<Option<Tag>>;

    async fn insert_tag_if_absent(&self, name: &str) -> TagResult<Upserted>;

    async fn find_tag_by_id(&self, tag_id: i64) -> TagResult<Option<Tag>>;

    async fn find_link(&self, entity_id: i64, tag_id: i64) -> TagResult<Option<EntityTagLink>>;

    async fn insert_link_if_absent(&self, entity_id: i64, tag_id: i64) -> TagResult<Upserted>;

    /// Links for an entity in creation order (ascending link ID).
    async fn list_links_by_entity(&self, entity_id: i64) -> TagResult<Vec<EntityTagLink>>;

    /// Tags for the given IDs in any order; unknown IDs are skipped.
    async fn find_tags_by_ids(&self, tag_ids: &[i64]) -> TagResult<Vec<Tag>>;
}

#[derive(Debug, Default)]
struct State {
    next_tag_id: i64,
    next_link_id: i64,
    tags: HashMap<i64, Tag>,
    tag_ids_by_name: HashMap<String, i64>,
    links: HashMap<i64, EntityTagLink>,
    link_ids_by_pair: HashMap<(i64, i64), i64>,
}

/// In-memory implementation of TagStore (for development/testing)
///
/// IDs start at 1 and increase monotonically. Name comparison is
/// case-sensitive, like the Postgres store.
#[derive(Debug, Default, Clone)]
pub struct InMemoryTagStore {
    state: Arc<RwLock<State>>,
}

impl InMemoryTagStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a link row without checking that the tag exists.
    ///
    /// Lets tests reproduce a link whose tag has gone missing.
    pub async fn insert_dangling_link(&self, entity_id: i64, tag_id: i64) -> i64 {
        let mut state = self.state.write().await;
        state.next_link_id += 1;
        let link_id = state.next_link_id;
        state.links.insert(
            link_id,
            EntityTagLink {
                link_id,
                entity_id,
                tag_id,
            },
        );
        state.link_ids_by_pair.insert((entity_id, tag_id), link_id);
        link_id
    }
}

#[async_trait]
impl TagStore for InMemoryTagStore {
    async fn find_tag_by_name(&self, name: &str) -> TagResult<Option<Tag>> {
        let state = self.state.read().await;
        Ok(state
            .tag_ids_by_name
            .get(name)
            .and_then(|id| state.tags.get(id))
            .cloned())
    }

    async fn insert_tag_if_absent(&self, name: &str) -> TagResult<Upserted> {
        let mut state = self.state.write().await;

        if let Some(&id) = state.tag_ids_by_name.get(name) {
            return Ok(Upserted { id, created: false });
        }

        state.next_tag_id += 1;
        let id = state.next_tag_id;
        state.tags.insert(id, Tag::new(id, name));
        state.tag_ids_by_name.insert(name.to_string(), id);

        tracing::debug!(tag_id = id, "Inserted tag");
        Ok(Upserted { id, created: true })
    }

    async fn find_tag_by_id(&self, tag_id: i64) -> TagResult<Option<Tag>> {
        let state = self.state.read().await;
        Ok(state.tags.get(&tag_id).cloned())
    }

    async fn find_link(&self, entity_id: i64, tag_id: i64) -> TagResult<Option<EntityTagLink>> {
        let state = self.state.read().await;
        Ok(state
            .link_ids_by_pair
            .get(&(entity_id, tag_id))
            .and_then(|id| state.links.get(id))
            .copied())
    }

    async fn insert_link_if_absent(&self, entity_id: i64, tag_id: i64) -> TagResult<Upserted> {
        let mut state = self.state.write().await;

        if let Some(&id) = state.link_ids_by_pair.get(&(entity_id, tag_id)) {
            return Ok(Upserted { id, created: false });
        }

        state.next_link_id += 1;
        let id = state.next_link_id;
        state.links.insert(
            id,
            EntityTagLink {
                link_id: id,
                entity_id,
                tag_id,
            },
        );
        state.link_ids_by_pair.insert((entity_id, tag_id), id);

        tracing::debug!(link_id = id, entity_id, tag_id, "Inserted entity link");
        Ok(Upserted { id, created: true })
    }

    async fn list_links_by_entity(&self, entity_id: i64) -> TagResult<Vec<EntityTagLink>> {
        let state = self.state.read().await;
        let mut links: Vec<EntityTagLink> = state
            .links
            .values()
            .filter(|l| l.entity_id == entity_id)
            .copied()
            .collect();
        links.sort_by_key(|l| l.link_id);
        Ok(links)
    }

    async fn find_tags_by_ids(&self, tag_ids: &[i64]) -> TagResult<Vec<Tag>> {
        let state = self.state.read().await;
        Ok(tag_ids
            .iter()
            .filter_map(|id| state.tags.get(id))
            .cloned()
            .collect())
    }
}
