//! Integration tests for the Postgres tag store
//!
//! Each test starts its own Postgres container via testcontainers, so the
//! upsert statements run against the real unique constraints.

use domain_tags::*;
use futures::future::join_all;
use std::sync::Arc;
use test_utils::assertions::assert_ids_in_order;
use test_utils::{TestDataBuilder, TestDatabase};

#[tokio::test]
async fn test_insert_tag_if_absent_reports_created_once() {
    let db = TestDatabase::new().await;
    let store = PgTagStore::new(db.connection());
    let builder = TestDataBuilder::from_test_name("insert_tag_created_once");
    let name = builder.tag_name("food");

    let first = store.insert_tag_if_absent(&name).await.unwrap();
    let second = store.insert_tag_if_absent(&name).await.unwrap();

    assert!(first.created);
    assert!(!second.created);
    assert_eq!(first.id, second.id);

    let found = store.find_tag_by_name(&name).await.unwrap().unwrap();
    assert_eq!(found, Tag::new(first.id, name));
}

#[tokio::test]
async fn test_concurrent_tag_upserts_create_one_row() {
    let db = TestDatabase::new().await;
    let store = Arc::new(PgTagStore::new(db.connection()));

    let handles: Vec<_> = (0..10)
        .map(|_| {
            let store = store.clone();
            tokio::spawn(async move { store.insert_tag_if_absent("concurrent").await.unwrap() })
        })
        .collect();

    let results: Vec<Upserted> = join_all(handles)
        .await
        .into_iter()
        .map(|r| r.unwrap())
        .collect();

    let id = results[0].id;
    assert!(results.iter().all(|r| r.id == id));
    assert_eq!(results.iter().filter(|r| r.created).count(), 1);
}

#[tokio::test]
async fn test_concurrent_link_upserts_create_one_row() {
    let db = TestDatabase::new().await;
    let store = Arc::new(PgTagStore::new(db.connection()));
    let tag_id = store.insert_tag_if_absent("linked").await.unwrap().id;

    let handles: Vec<_> = (0..10)
        .map(|_| {
            let store = store.clone();
            tokio::spawn(async move { store.insert_link_if_absent(1, tag_id).await.unwrap() })
        })
        .collect();

    let results: Vec<Upserted> = join_all(handles)
        .await
        .into_iter()
        .map(|r| r.unwrap())
        .collect();

    assert!(results.iter().all(|r| r.id == results[0].id));
    assert_eq!(results.iter().filter(|r| r.created).count(), 1);

    let link = store.find_link(1, tag_id).await.unwrap().unwrap();
    assert_eq!(link.link_id, results[0].id);
}

#[tokio::test]
async fn test_links_listed_in_creation_order() {
    let db = TestDatabase::new().await;
    let store = PgTagStore::new(db.connection());
    let builder = TestDataBuilder::from_test_name("links_in_creation_order");
    let entity_id = builder.entity_id(0);

    let a = store.insert_tag_if_absent("a").await.unwrap().id;
    let b = store.insert_tag_if_absent("b").await.unwrap().id;
    let c = store.insert_tag_if_absent("c").await.unwrap().id;

    for tag_id in [c, a, b] {
        store.insert_link_if_absent(entity_id, tag_id).await.unwrap();
    }
    store
        .insert_link_if_absent(builder.entity_id(1), a)
        .await
        .unwrap();

    let tag_ids: Vec<i64> = store
        .list_links_by_entity(entity_id)
        .await
        .unwrap()
        .into_iter()
        .map(|l| l.tag_id)
        .collect();
    assert_ids_in_order(&tag_ids, &[c, a, b], "links for entity");
}

#[tokio::test]
async fn test_find_tags_by_ids() {
    let db = TestDatabase::new().await;
    let store = PgTagStore::new(db.connection());

    let a = store.insert_tag_if_absent("a").await.unwrap().id;
    let b = store.insert_tag_if_absent("b").await.unwrap().id;

    let mut tags = store.find_tags_by_ids(&[b, a, 9999]).await.unwrap();
    tags.sort_by_key(|t| t.tag_id);
    assert_eq!(tags, vec![Tag::new(a, "a"), Tag::new(b, "b")]);

    assert!(store.find_tags_by_ids(&[]).await.unwrap().is_empty());
    assert!(store.find_tag_by_id(9999).await.unwrap().is_none());
}

#[tokio::test]
async fn test_service_over_postgres() {
    let db = TestDatabase::new().await;
    let service = TagService::new(
        Arc::new(PgTagStore::new(db.connection())),
        Arc::new(InMemoryTagIndex::new()),
        &TagServiceConfig::default(),
    );

    let tag_id = service.create_tag("食品").await.unwrap();
    assert_eq!(service.create_tag("食品").await.unwrap(), tag_id);

    let link_id = service.link_entity_tag(1, tag_id).await.unwrap();
    assert_eq!(service.link_entity_tag(1, tag_id).await.unwrap(), link_id);

    assert!(matches!(
        service.link_entity_tag(1, tag_id + 1000).await,
        Err(TagError::NotFound(_))
    ));

    let tags = service.list_entity_tags(1).await.unwrap();
    assert_eq!(tags, vec![Tag::new(tag_id, "食品")]);

    service.publisher().flush().await;
    assert!(service.index().contains(tag_id).await);
}

#[tokio::test]
async fn test_store_error_after_pool_closed() {
    let db = TestDatabase::new().await;
    let conn = db.connection();
    let store = PgTagStore::new(conn.clone());
    conn.close().await.unwrap();

    assert!(matches!(
        store.find_tag_by_name("anything").await,
        Err(TagError::StoreUnavailable(_))
    ));
}
