//! In-memory store used by tests and local development.

use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::Notify;
use tokio::time::timeout;

use crate::QueueStore;
use crate::error::{StoreError, StoreResult};

#[derive(Default)]
struct Inner {
    /// Ordered index of (score, key); ties break on the key, as a sorted set
    /// does.
    index: BTreeSet<(i64, String)>,
    payloads: HashMap<String, String>,
    /// Marker deadlines; an entry past its deadline counts as absent.
    markers: HashMap<String, Instant>,
}

/// Store double with the same observable semantics as [`crate::RedisStore`]:
/// an ordered index, plain payload entries, self-expiring markers, and a
/// blocking pop that hands each entry to exactly one caller.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    notify: Notify,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn try_pop(&self) -> Option<String> {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        let entry = inner.index.iter().next().cloned()?;
        inner.index.remove(&entry);
        Some(entry.1)
    }
}

#[async_trait]
impl QueueStore for MemoryStore {
    async fn upsert(
        &self,
        key: &str,
        record: &str,
        score: i64,
        ttl_seconds: u64,
    ) -> StoreResult<()> {
        {
            let mut inner = self.inner.lock().expect("store mutex poisoned");
            inner.index.retain(|(_, k)| k != key);
            inner.index.insert((score, key.to_string()));
            inner.payloads.insert(key.to_string(), record.to_string());
            if ttl_seconds > 0 {
                inner.markers.insert(
                    key.to_string(),
                    Instant::now() + Duration::from_secs(ttl_seconds),
                );
            }
            // ttl of 0 leaves any earlier marker to lapse on its own.
        }
        self.notify.notify_one();
        Ok(())
    }

    async fn pop_min_blocking(&self, timeout_seconds: u64) -> StoreResult<String> {
        let deadline =
            (timeout_seconds > 0).then(|| Instant::now() + Duration::from_secs(timeout_seconds));

        loop {
            // Register for a wakeup before checking, so a push landing
            // between the check and the await is not missed.
            let notified = self.notify.notified();

            if let Some(key) = self.try_pop() {
                return Ok(key);
            }

            match deadline {
                None => notified.await,
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return Err(StoreError::WaitTimeout);
                    }
                    if timeout(deadline - now, notified).await.is_err() {
                        return Err(StoreError::WaitTimeout);
                    }
                }
            }
        }
    }

    async fn read_marker_and_payload(&self, key: &str) -> StoreResult<(bool, Option<String>)> {
        let mut inner = self.inner.lock().expect("store mutex poisoned");

        let marker_present = match inner.markers.get(key) {
            Some(deadline) if *deadline > Instant::now() => true,
            Some(_) => {
                inner.markers.remove(key);
                false
            }
            None => false,
        };
        let payload = inner.payloads.get(key).cloned();

        Ok((marker_present, payload))
    }

    async fn delete_payload(&self, key: &str) -> StoreResult<()> {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        inner.payloads.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pop_returns_lowest_score_first() {
        let store = MemoryStore::new();
        store.upsert("b", "{}", 200, 0).await.unwrap();
        store.upsert("a", "{}", 100, 0).await.unwrap();

        assert_eq!(store.pop_min_blocking(1).await.unwrap(), "a");
        assert_eq!(store.pop_min_blocking(1).await.unwrap(), "b");
    }

    #[tokio::test]
    async fn test_upsert_replaces_index_position() {
        let store = MemoryStore::new();
        store.upsert("a", "v1", 100, 0).await.unwrap();
        store.upsert("a", "v2", 900, 0).await.unwrap();
        store.upsert("b", "{}", 500, 0).await.unwrap();

        assert_eq!(store.pop_min_blocking(1).await.unwrap(), "b");
        assert_eq!(store.pop_min_blocking(1).await.unwrap(), "a");
        let (_, payload) = store.read_marker_and_payload("a").await.unwrap();
        assert_eq!(payload.as_deref(), Some("v2"));
    }

    #[tokio::test]
    async fn test_bounded_pop_times_out_when_empty() {
        let store = MemoryStore::new();
        let err = store.pop_min_blocking(1).await.unwrap_err();
        assert!(matches!(err, StoreError::WaitTimeout));
    }

    #[tokio::test]
    async fn test_marker_lapses_after_ttl() {
        let store = MemoryStore::new();
        store.upsert("a", "{}", 100, 1).await.unwrap();

        let (present, _) = store.read_marker_and_payload("a").await.unwrap();
        assert!(present);

        tokio::time::sleep(Duration::from_millis(1100)).await;

        let (present, payload) = store.read_marker_and_payload("a").await.unwrap();
        assert!(!present);
        assert!(payload.is_some());
    }

    #[tokio::test]
    async fn test_blocked_pop_wakes_on_push() {
        let store = std::sync::Arc::new(MemoryStore::new());

        let waiter = {
            let store = store.clone();
            tokio::spawn(async move { store.pop_min_blocking(5).await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        store.upsert("a", "{}", 100, 0).await.unwrap();

        assert_eq!(waiter.await.unwrap().unwrap(), "a");
    }
}
