//! Service-level scenarios over the in-memory adapters.

use async_trait::async_trait;
use domain_tags::*;
use std::sync::Arc;
use std::time::Duration;

fn in_memory() -> TagService<InMemoryTagStore, InMemoryTagIndex> {
    TagService::new(
        Arc::new(InMemoryTagStore::new()),
        Arc::new(InMemoryTagIndex::new()),
        &TagServiceConfig::default(),
    )
}

#[tokio::test]
async fn test_end_to_end_scenario() {
    let service = in_memory();

    let tag_id = service.create_tag("食品").await.unwrap();
    assert_eq!(tag_id, 1);
    assert_eq!(service.create_tag("食品").await.unwrap(), 1);

    assert_eq!(service.link_entity_tag(1, tag_id).await.unwrap(), 1);
    assert_eq!(service.link_entity_tag(1, tag_id).await.unwrap(), 1);

    let tags = service.list_entity_tags(1).await.unwrap();
    assert_eq!(tags, vec![Tag::new(1, "食品")]);
}

#[tokio::test]
async fn test_search_is_eventually_consistent() {
    let service = in_memory();

    let id = service.create_tag("food festival").await.unwrap();
    service.publisher().flush().await;

    let matches = service.search_tags("food").await.unwrap();
    assert_eq!(matches, vec![Tag::new(id, "food festival")]);
    assert!(service.search_tags("festival").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_prefix_semantics() {
    let service = in_memory();
    for name in ["food", "food street", "food festival"] {
        service.create_tag(name).await.unwrap();
    }
    service.publisher().flush().await;

    assert_eq!(service.search_tags("food").await.unwrap().len(), 3);
    assert!(service.search_tags("street").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_create_succeeds_while_index_down() {
    let service = in_memory();
    service.index().set_available(false);

    let id = service.create_tag("resilient").await.unwrap();
    service.publisher().flush().await;

    assert_eq!(id, 1);
    let stats = service.publisher().stats();
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.published, 0);
}

#[tokio::test]
async fn test_existing_name_never_enqueues_publish() {
    let service = in_memory();

    service.create_tag("once").await.unwrap();
    service.create_tag("once").await.unwrap();
    service.create_tag(" once ").await.unwrap();
    service.publisher().flush().await;

    assert_eq!(service.publisher().stats().published, 1);
}

#[tokio::test]
async fn test_concurrent_creates_converge() {
    let service = Arc::new(in_memory());

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let service = service.clone();
            tokio::spawn(async move { service.create_tag("race").await.unwrap() })
        })
        .collect();

    let ids: Vec<i64> = futures::future::join_all(handles)
        .await
        .into_iter()
        .map(|r| r.unwrap())
        .collect();

    assert!(ids.iter().all(|id| *id == ids[0]));
    service.publisher().flush().await;
    assert_eq!(service.publisher().stats().published, 1);
}

#[tokio::test]
async fn test_list_skips_dangling_link() {
    let store = Arc::new(InMemoryTagStore::new());
    let service = TagService::new(
        store.clone(),
        Arc::new(InMemoryTagIndex::new()),
        &TagServiceConfig::default(),
    );

    let kept = service.create_tag("kept").await.unwrap();
    service.link_entity_tag(3, kept).await.unwrap();
    store.insert_dangling_link(3, 404).await;

    let tags = service.list_entity_tags(3).await.unwrap();
    assert_eq!(tags, vec![Tag::new(kept, "kept")]);
}

/// Store whose every call outlives any reasonable timeout.
struct HangingStore;

impl HangingStore {
    async fn hang<T>(&self) -> TagResult<T> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Err(TagError::StoreUnavailable("unreachable".to_string()))
    }
}

#[async_trait]
impl TagStore for HangingStore {
    async fn find_tag_by_name(&self, _name: &str) -> TagResult<Option<Tag>> {
        self.hang().await
    }

    async fn insert_tag_if_absent(&self, _name: &str) -> TagResult<Upserted> {
        self.hang().await
    }

    async fn find_tag_by_id(&self, _tag_id: i64) -> TagResult<Option<Tag>> {
        self.hang().await
    }

    async fn find_link(&self, _entity_id: i64, _tag_id: i64) -> TagResult<Option<EntityTagLink>> {
        self.hang().await
    }

    async fn insert_link_if_absent(&self, _entity_id: i64, _tag_id: i64) -> TagResult<Upserted> {
        self.hang().await
    }

    async fn list_links_by_entity(&self, _entity_id: i64) -> TagResult<Vec<EntityTagLink>> {
        self.hang().await
    }

    async fn find_tags_by_ids(&self, _tag_ids: &[i64]) -> TagResult<Vec<Tag>> {
        self.hang().await
    }
}

#[tokio::test]
async fn test_store_timeout_is_store_unavailable() {
    let config = TagServiceConfig {
        store_timeout: Duration::from_millis(20),
        ..Default::default()
    };
    let service = TagService::new(
        Arc::new(HangingStore),
        Arc::new(InMemoryTagIndex::new()),
        &config,
    );

    let result = service.create_tag("slow").await;
    assert!(matches!(result, Err(TagError::StoreUnavailable(ref m)) if m.contains("timed out")));

    assert!(matches!(
        service.list_entity_tags(1).await,
        Err(TagError::StoreUnavailable(_))
    ));
}
