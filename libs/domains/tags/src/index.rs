use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

use crate::error::IndexError;
use crate::models::Tag;

/// Search-side contract for tag documents.
///
/// Matching rule: a tag matches when its name starts with the keyword,
/// compared case-insensitively. Mid-name matches are not returned.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TagIndex: Send + Sync {
    /// Insert or replace the document keyed by `tag_id`.
    async fn upsert_tag_document(&self, tag_id: i64, name: &str) -> Result<(), IndexError>;

    /// Matching tags in relevance order; empty when nothing matches.
    async fn prefix_search(&self, keyword: &str) -> Result<Vec<Tag>, IndexError>;

    async fn ping(&self) -> Result<(), IndexError>;
}

/// In-memory TagIndex for tests and local runs.
///
/// Results are ordered by name length, then tag ID, and capped at
/// `max_results`. [`set_available`](Self::set_available) simulates an outage.
#[derive(Debug, Clone)]
pub struct InMemoryTagIndex {
    docs: Arc<RwLock<BTreeMap<i64, String>>>,
    available: Arc<AtomicBool>,
    max_results: usize,
}

impl InMemoryTagIndex {
    pub fn new() -> Self {
        Self::with_max_results(50)
    }

    pub fn with_max_results(max_results: usize) -> Self {
        Self {
            docs: Arc::new(RwLock::new(BTreeMap::new())),
            available: Arc::new(AtomicBool::new(true)),
            max_results,
        }
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.docs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.docs.read().await.is_empty()
    }

    pub async fn contains(&self, tag_id: i64) -> bool {
        self.docs.read().await.contains_key(&tag_id)
    }

    fn check_available(&self) -> Result<(), IndexError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(IndexError::Unavailable("in-memory index disabled".to_string()))
        }
    }
}

impl Default for InMemoryTagIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TagIndex for InMemoryTagIndex {
    async fn upsert_tag_document(&self, tag_id: i64, name: &str) -> Result<(), IndexError> {
        self.check_available()?;
        self.docs.write().await.insert(tag_id, name.to_string());
        Ok(())
    }

    async fn prefix_search(&self, keyword: &str) -> Result<Vec<Tag>, IndexError> {
        self.check_available()?;

        let needle = keyword.to_lowercase();
        let docs = self.docs.read().await;

        let mut matches: Vec<Tag> = docs
            .iter()
            .filter(|(_, name)| name.to_lowercase().starts_with(&needle))
            .map(|(id, name)| Tag::new(*id, name.clone()))
            .collect();

        matches.sort_by_key(|t| (t.name.chars().count(), t.tag_id));
        matches.truncate(self.max_results);
        Ok(matches)
    }

    async fn ping(&self) -> Result<(), IndexError> {
        self.check_available()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded() -> InMemoryTagIndex {
        let index = InMemoryTagIndex::new();
        for (id, name) in [(1, "food street"), (2, "street food"), (3, "Food"), (4, "foodie")] {
            index.upsert_tag_document(id, name).await.unwrap();
        }
        index
    }

    #[tokio::test]
    async fn test_prefix_is_anchored_and_case_insensitive() {
        let index = seeded().await;

        let names: Vec<String> = index
            .prefix_search("food")
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();

        assert_eq!(names, vec!["Food", "foodie", "food street"]);
    }

    #[tokio::test]
    async fn test_upsert_replaces_document() {
        let index = seeded().await;
        index.upsert_tag_document(1, "fast food").await.unwrap();

        assert_eq!(index.len().await, 4);
        let hits = index.prefix_search("fast").await.unwrap();
        assert_eq!(hits, vec![Tag::new(1, "fast food")]);
    }

    #[tokio::test]
    async fn test_results_capped() {
        let index = InMemoryTagIndex::with_max_results(2);
        for id in 1..=5 {
            index.upsert_tag_document(id, &format!("tag{id}")).await.unwrap();
        }

        assert_eq!(index.prefix_search("tag").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_unavailable_index_errors() {
        let index = seeded().await;
        index.set_available(false);

        assert!(index.ping().await.is_err());
        assert!(index.prefix_search("food").await.is_err());
        assert!(index.upsert_tag_document(9, "x").await.is_err());
    }
}
