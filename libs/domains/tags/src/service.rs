use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, instrument, warn};

use crate::config::TagServiceConfig;
use crate::error::{TagError, TagResult};
use crate::index::TagIndex;
use crate::models::{EntityTagLink, MAX_TAG_NAME_LEN, Tag};
use crate::publisher::IndexPublisher;
use crate::repository::TagStore;

/// Service layer for tag creation, search and entity linking
pub struct TagService<S: TagStore, I: TagIndex> {
    store: Arc<S>,
    index: Arc<I>,
    publisher: Arc<IndexPublisher>,
    store_timeout: Duration,
}

impl<S: TagStore, I: TagIndex> Clone for TagService<S, I> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            index: self.index.clone(),
            publisher: self.publisher.clone(),
            store_timeout: self.store_timeout,
        }
    }
}

impl<S, I> TagService<S, I>
where
    S: TagStore,
    I: TagIndex + 'static,
{
    /// Build the service and start its index publisher.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(store: Arc<S>, index: Arc<I>, config: &TagServiceConfig) -> Self {
        let publisher = Arc::new(IndexPublisher::spawn(index.clone(), config.publish_queue));
        Self {
            store,
            index,
            publisher,
            store_timeout: config.store_timeout,
        }
    }

    pub fn publisher(&self) -> &Arc<IndexPublisher> {
        &self.publisher
    }

    pub fn index(&self) -> &Arc<I> {
        &self.index
    }

    /// Get-or-create a tag by name and return its ID.
    ///
    /// Only a newly created tag is handed to the index publisher.
    #[instrument(skip(self))]
    pub async fn create_tag(&self, name: &str) -> TagResult<i64> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TagError::InvalidArgument("Tag name cannot be empty".to_string()));
        }
        if name.chars().count() > MAX_TAG_NAME_LEN {
            return Err(TagError::InvalidArgument(format!(
                "Tag name cannot exceed {} characters",
                MAX_TAG_NAME_LEN
            )));
        }

        if let Some(existing) = self
            .with_timeout("find_tag_by_name", self.store.find_tag_by_name(name))
            .await?
        {
            return Ok(existing.tag_id);
        }

        let upserted = self
            .with_timeout("insert_tag_if_absent", self.store.insert_tag_if_absent(name))
            .await?;

        if upserted.created {
            self.publisher.publish(Tag::new(upserted.id, name));
        }

        Ok(upserted.id)
    }

    /// Tags whose name starts with `keyword`, in index relevance order.
    #[instrument(skip(self))]
    pub async fn search_tags(&self, keyword: &str) -> TagResult<Vec<Tag>> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(TagError::InvalidArgument("Keyword cannot be empty".to_string()));
        }

        self.index.prefix_search(keyword).await.map_err(|e| {
            warn!(error = %e, "Tag search failed");
            TagError::from(e)
        })
    }

    /// Link an entity to an existing tag and return the link ID.
    #[instrument(skip(self))]
    pub async fn link_entity_tag(&self, entity_id: i64, tag_id: i64) -> TagResult<i64> {
        if entity_id == 0 || tag_id == 0 {
            return Err(TagError::InvalidArgument(
                "entity_id and tag_id must be non-zero".to_string(),
            ));
        }

        if let Some(link) = self
            .with_timeout("find_link", self.store.find_link(entity_id, tag_id))
            .await?
        {
            return Ok(link.link_id);
        }

        if self
            .with_timeout("find_tag_by_id", self.store.find_tag_by_id(tag_id))
            .await?
            .is_none()
        {
            return Err(TagError::NotFound(tag_id));
        }

        let upserted = self
            .with_timeout(
                "insert_link_if_absent",
                self.store.insert_link_if_absent(entity_id, tag_id),
            )
            .await?;

        Ok(upserted.id)
    }

    /// Tags linked to an entity, in link creation order.
    #[instrument(skip(self))]
    pub async fn list_entity_tags(&self, entity_id: i64) -> TagResult<Vec<Tag>> {
        if entity_id == 0 {
            return Err(TagError::InvalidArgument("entity_id must be non-zero".to_string()));
        }

        let links = self
            .with_timeout("list_links_by_entity", self.store.list_links_by_entity(entity_id))
            .await?;
        if links.is_empty() {
            return Ok(Vec::new());
        }

        let tag_ids: Vec<i64> = links.iter().map(|l| l.tag_id).collect();
        let tags = self
            .with_timeout("find_tags_by_ids", self.store.find_tags_by_ids(&tag_ids))
            .await?;

        let (ordered, missing) = order_by_links(&links, tags);
        for tag_id in missing {
            let err = TagError::InternalInconsistency(format!(
                "entity {} links to missing tag {}",
                entity_id, tag_id
            ));
            error!(entity_id, tag_id, error = %err, "Dropping dangling entity link");
        }

        Ok(ordered)
    }

    async fn with_timeout<T, F>(&self, op: &'static str, fut: F) -> TagResult<T>
    where
        F: Future<Output = TagResult<T>>,
    {
        match tokio::time::timeout(self.store_timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                warn!(op, timeout = ?self.store_timeout, "Tag store call timed out");
                Err(TagError::StoreUnavailable(format!(
                    "{} timed out after {:?}",
                    op, self.store_timeout
                )))
            }
        }
    }
}

/// Reorders `tags` to follow `links` and reports link tag IDs with no tag.
///
/// Tags not referenced by any link are discarded.
pub fn order_by_links(links: &[EntityTagLink], mut tags: Vec<Tag>) -> (Vec<Tag>, Vec<i64>) {
    let positions: HashMap<i64, usize> = links
        .iter()
        .enumerate()
        .map(|(pos, link)| (link.tag_id, pos))
        .collect();

    tags.retain(|t| positions.contains_key(&t.tag_id));
    tags.sort_by_key(|t| positions.get(&t.tag_id).copied().unwrap_or(usize::MAX));

    let found: HashSet<i64> = tags.iter().map(|t| t.tag_id).collect();
    let missing = links
        .iter()
        .map(|l| l.tag_id)
        .filter(|id| !found.contains(id))
        .collect();

    (tags, missing)
}
