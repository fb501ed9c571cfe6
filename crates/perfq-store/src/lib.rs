//! Storage layer for the perfq job queue.
//!
//! Provides the [`QueueStore`] contract the queue engine is written against,
//! plus two implementations: [`RedisStore`] for production and [`MemoryStore`]
//! for tests and local development.

pub mod error;
pub mod memory;
pub mod redis;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use self::redis::RedisStore;

use async_trait::async_trait;

/// Default name of the ordered index.
pub const DEFAULT_QUEUE_KEY: &str = "perfq:queue";

/// Suffix of the expiry-marker key. The marker is stored apart from the
/// payload so its expiry never deletes job data.
pub const EXPIRY_SUFFIX: &str = ":expiry";

/// Key of the expiry marker belonging to `key`.
pub fn marker_key(key: &str) -> String {
    format!("{key}{EXPIRY_SUFFIX}")
}

/// Contract the queue engine needs from the backing store.
///
/// Each method is a single batched round trip. Individual writes are atomic
/// at the store; the three writes inside [`upsert`](QueueStore::upsert) are
/// issued together but are not cross-key transactional.
#[async_trait]
pub trait QueueStore: Send + Sync {
    /// Write the expiry marker (only when `ttl_seconds > 0`), the payload,
    /// and the index entry for `key` in one batch, superseding all previous
    /// state for that key. A `ttl_seconds` of 0 writes no marker; an existing
    /// marker is left to lapse on its own, never extended.
    async fn upsert(
        &self,
        key: &str,
        record: &str,
        score: i64,
        ttl_seconds: u64,
    ) -> StoreResult<()>;

    /// Atomically remove and return the key with the lowest score, suspending
    /// the caller until an entry appears or `timeout_seconds` elapses
    /// (0 = wait indefinitely). A bounded elapse fails with
    /// [`StoreError::WaitTimeout`].
    async fn pop_min_blocking(&self, timeout_seconds: u64) -> StoreResult<String>;

    /// One round trip returning whether the expiry marker for `key` is
    /// present, and the payload if any.
    async fn read_marker_and_payload(&self, key: &str) -> StoreResult<(bool, Option<String>)>;

    /// Remove the payload stored under `key`.
    async fn delete_payload(&self, key: &str) -> StoreResult<()>;
}
