//! Best-effort background publishing of new tags to the search index.
//!
//! Callers enqueue with [`IndexPublisher::publish`], which never blocks and
//! never fails. One worker task drains the queue. Index failures and queue
//! overflow are logged and counted, then dropped; there are no retries.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{Mutex, mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::index::TagIndex;
use crate::models::Tag;

enum Job {
    Upsert(Tag),
    Flush(oneshot::Sender<()>),
    Shutdown(oneshot::Sender<()>),
}

#[derive(Debug, Default)]
struct Counters {
    published: AtomicU64,
    failed: AtomicU64,
    dropped: AtomicU64,
}

/// Snapshot of publisher outcomes since start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PublisherStats {
    pub published: u64,
    pub failed: u64,
    /// Rejected at enqueue time because the queue was full or closed
    pub dropped: u64,
}

pub struct IndexPublisher {
    tx: mpsc::Sender<Job>,
    counters: Arc<Counters>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl IndexPublisher {
    /// Start the worker on the current tokio runtime.
    pub fn spawn<I>(index: Arc<I>, capacity: usize) -> Self
    where
        I: TagIndex + ?Sized + 'static,
    {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let counters = Arc::new(Counters::default());
        let worker = tokio::spawn(run_worker(index, rx, counters.clone()));

        info!(capacity, "Index publisher started");

        Self {
            tx,
            counters,
            worker: Mutex::new(Some(worker)),
        }
    }

    /// Enqueue a tag for indexing without waiting.
    pub fn publish(&self, tag: Tag) {
        let tag_id = tag.tag_id;
        if let Err(e) = self.tx.try_send(Job::Upsert(tag)) {
            self.counters.dropped.fetch_add(1, Ordering::Relaxed);
            let reason = match e {
                mpsc::error::TrySendError::Full(_) => "queue full",
                mpsc::error::TrySendError::Closed(_) => "publisher stopped",
            };
            warn!(tag_id, reason, "Dropped search index publish");
        }
    }

    /// Resolve once every job enqueued before this call has been handled.
    pub async fn flush(&self) {
        let (ack, done) = oneshot::channel();
        if self.tx.send(Job::Flush(ack)).await.is_ok() {
            let _ = done.await;
        }
    }

    /// Handle the remaining queue, then stop the worker.
    ///
    /// Later `publish` calls are counted as dropped.
    pub async fn shutdown(&self) {
        let (ack, done) = oneshot::channel();
        if self.tx.send(Job::Shutdown(ack)).await.is_ok() {
            let _ = done.await;
        }

        if let Some(handle) = self.worker.lock().await.take() {
            if let Err(e) = handle.await {
                warn!(error = %e, "Index publisher worker ended abnormally");
            }
        }
    }

    pub fn stats(&self) -> PublisherStats {
        PublisherStats {
            published: self.counters.published.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
            dropped: self.counters.dropped.load(Ordering::Relaxed),
        }
    }
}

async fn run_worker<I>(index: Arc<I>, mut rx: mpsc::Receiver<Job>, counters: Arc<Counters>)
where
    I: TagIndex + ?Sized,
{
    while let Some(job) = rx.recv().await {
        match job {
            Job::Upsert(tag) => publish_one(index.as_ref(), &tag, &counters).await,
            Job::Flush(ack) => {
                let _ = ack.send(());
            }
            Job::Shutdown(ack) => {
                rx.close();
                while let Some(job) = rx.recv().await {
                    match job {
                        Job::Upsert(tag) => publish_one(index.as_ref(), &tag, &counters).await,
                        Job::Flush(ack) | Job::Shutdown(ack) => {
                            let _ = ack.send(());
                        }
                    }
                }
                let _ = ack.send(());
                break;
            }
        }
    }

    info!("Index publisher stopped");
}

async fn publish_one<I>(index: &I, tag: &Tag, counters: &Counters)
where
    I: TagIndex + ?Sized,
{
    match index.upsert_tag_document(tag.tag_id, &tag.name).await {
        Ok(()) => {
            counters.published.fetch_add(1, Ordering::Relaxed);
            debug!(tag_id = tag.tag_id, "Published tag to search index");
        }
        Err(e) => {
            counters.failed.fetch_add(1, Ordering::Relaxed);
            warn!(tag_id = tag.tag_id, error = %e, "Failed to publish tag to search index");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IndexError;
    use crate::index::{InMemoryTagIndex, MockTagIndex};

    #[tokio::test]
    async fn test_flush_waits_for_queued_publishes() {
        let index = Arc::new(InMemoryTagIndex::new());
        let publisher = IndexPublisher::spawn(index.clone(), 16);

        publisher.publish(Tag::new(1, "rust"));
        publisher.publish(Tag::new(2, "tokio"));
        publisher.flush().await;

        assert!(index.contains(1).await);
        assert!(index.contains(2).await);
        assert_eq!(publisher.stats().published, 2);
    }

    #[tokio::test]
    async fn test_index_failure_is_counted_and_dropped() {
        let mut mock = MockTagIndex::new();
        mock.expect_upsert_tag_document()
            .times(1)
            .returning(|_, _| Err(IndexError::Unavailable("down".to_string())));

        let publisher = IndexPublisher::spawn(Arc::new(mock), 4);
        publisher.publish(Tag::new(1, "rust"));
        publisher.flush().await;

        let stats = publisher.stats();
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.published, 0);
    }

    #[tokio::test]
    async fn test_publish_after_shutdown_is_dropped() {
        let index = Arc::new(InMemoryTagIndex::new());
        let publisher = IndexPublisher::spawn(index.clone(), 4);

        publisher.publish(Tag::new(1, "rust"));
        publisher.shutdown().await;
        assert!(index.contains(1).await);

        publisher.publish(Tag::new(2, "late"));
        assert_eq!(publisher.stats().dropped, 1);
        assert!(!index.contains(2).await);

        // Second shutdown is a no-op
        publisher.shutdown().await;
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_full_queue_drops_without_blocking() {
        let index = Arc::new(InMemoryTagIndex::new());
        let publisher = IndexPublisher::spawn(index, 1);

        // The worker cannot run until this task yields, so the second job overflows
        publisher.publish(Tag::new(1, "a"));
        publisher.publish(Tag::new(2, "b"));
        assert_eq!(publisher.stats().dropped, 1);

        publisher.flush().await;
        assert_eq!(publisher.stats().published, 1);
    }
}
