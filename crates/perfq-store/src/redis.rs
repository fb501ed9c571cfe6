//! Redis-backed store.
//!
//! Layout: one sorted set mapping branch tag to score, a plain string key per
//! branch holding the serialized record, and a `<branch>:expiry` marker
//! written with `EX` when the push carries a ttl.

use async_trait::async_trait;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::{DEFAULT_QUEUE_KEY, QueueStore, marker_key};

/// Store implementation on a shared Redis instance.
///
/// The connection is opened once per process via [`RedisStore::connect`] and
/// injected into both the push and fetch paths; it is multiplexed and cheap
/// to clone. Note that a blocking pop occupies the connection for its whole
/// wait, so a consumer process should not share its store with other traffic.
#[derive(Clone)]
pub struct RedisStore {
    conn: ::redis::aio::MultiplexedConnection,
    queue_key: String,
}

impl RedisStore {
    /// Connect to Redis at `url` using the default index name.
    pub async fn connect(url: &str) -> StoreResult<Self> {
        Self::connect_with_queue_key(url, DEFAULT_QUEUE_KEY).await
    }

    /// Connect to Redis at `url`, keeping the ordered index under `queue_key`.
    pub async fn connect_with_queue_key(
        url: &str,
        queue_key: impl Into<String>,
    ) -> StoreResult<Self> {
        let client =
            ::redis::Client::open(url).map_err(|e| StoreError::Unavailable(e.to_string()))?;
        let conn = client
            .get_multiplexed_tokio_connection()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        let queue_key = queue_key.into();
        debug!(queue_key = %queue_key, "Connected to Redis");

        Ok(Self { conn, queue_key })
    }
}

#[async_trait]
impl QueueStore for RedisStore {
    async fn upsert(
        &self,
        key: &str,
        record: &str,
        score: i64,
        ttl_seconds: u64,
    ) -> StoreResult<()> {
        let mut conn = self.conn.clone();
        let mut pipe = ::redis::pipe();

        if ttl_seconds > 0 {
            pipe.cmd("SET")
                .arg(marker_key(key))
                .arg(1)
                .arg("EX")
                .arg(ttl_seconds)
                .ignore();
        }
        pipe.cmd("SET").arg(key).arg(record).ignore();
        pipe.cmd("ZADD")
            .arg(&self.queue_key)
            .arg(score)
            .arg(key)
            .ignore();

        pipe.query_async::<_, ()>(&mut conn)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }

    async fn pop_min_blocking(&self, timeout_seconds: u64) -> StoreResult<String> {
        let mut conn = self.conn.clone();

        // BZPOPMIN replies nil on a bounded timeout, (queue, member, score)
        // otherwise. A timeout of 0 blocks until an entry appears.
        let popped: Option<(String, String, f64)> = ::redis::cmd("BZPOPMIN")
            .arg(&self.queue_key)
            .arg(timeout_seconds)
            .query_async(&mut conn)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        match popped {
            Some((_, key, _)) => Ok(key),
            None => Err(StoreError::WaitTimeout),
        }
    }

    async fn read_marker_and_payload(&self, key: &str) -> StoreResult<(bool, Option<String>)> {
        let mut conn = self.conn.clone();

        ::redis::pipe()
            .cmd("EXISTS")
            .arg(marker_key(key))
            .cmd("GET")
            .arg(key)
            .query_async::<_, (bool, Option<String>)>(&mut conn)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }

    async fn delete_payload(&self, key: &str) -> StoreResult<()> {
        let mut conn = self.conn.clone();

        ::redis::cmd("DEL")
            .arg(key)
            .query_async::<_, ()>(&mut conn)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }
}
