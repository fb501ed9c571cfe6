//! Push and fetch against the shared store.

use std::sync::Arc;

use chrono::Utc;
use perfq_core::{JobPayload, JobRecord, Result};
use perfq_store::QueueStore;
use tracing::{debug, warn};

use crate::score::score;

/// Acknowledgment returned by a successful push.
#[derive(Debug, Clone)]
pub struct PushAck {
    pub key: String,
    pub score: i64,
}

/// Priority queue of branch jobs over a shared ordered index.
///
/// One live entry exists per branch tag: a later push for the same branch
/// supersedes the earlier one's payload, score, and expiry. The store
/// connection is injected, owned by the calling process, and is the only
/// coordination point between producers and consumers.
pub struct JobQueue {
    store: Arc<dyn QueueStore>,
    fetch_timeout_seconds: u64,
}

impl JobQueue {
    pub fn new(store: Arc<dyn QueueStore>, fetch_timeout_seconds: u64) -> Self {
        Self {
            store,
            fetch_timeout_seconds,
        }
    }

    /// Enqueue `job` at `weight`, expiring after `ttl_seconds` (0 = never).
    ///
    /// Two pushes for the same branch collapse into one entry positioned at
    /// the later push's score. A later push with `ttl_seconds` of 0 makes the
    /// job permanent even if an earlier marker is still pending expiry: the
    /// fetch loop trusts the record's own ttl, not marker absence.
    pub async fn push(&self, weight: u32, job: JobPayload, ttl_seconds: u64) -> Result<PushAck> {
        let enqueued_at = Utc::now();
        let score = score(weight, enqueued_at.timestamp_millis());
        let key = job.key().to_string();

        let record = JobRecord {
            job,
            ttl_seconds,
            enqueued_at,
        };
        let encoded = serde_json::to_string(&record)?;

        self.store.upsert(&key, &encoded, score, ttl_seconds).await?;
        debug!(key = %key, score, ttl_seconds, "Enqueued job");

        Ok(PushAck { key, score })
    }

    /// Block until the highest-priority valid job is available and return its
    /// payload.
    ///
    /// Expired entries encountered on the way are discarded and their
    /// payloads deleted; each pass removes one index entry, so the loop
    /// terminates once the index drains. A bounded wait on an empty queue
    /// fails with [`perfq_core::Error::WaitTimeout`]. There is no
    /// acknowledgment: once popped, a job is never redelivered, even if the
    /// consumer crashes before finishing it.
    pub async fn fetch(&self) -> Result<JobPayload> {
        loop {
            let key = self
                .store
                .pop_min_blocking(self.fetch_timeout_seconds)
                .await?;
            let (marker_present, payload) = self.store.read_marker_and_payload(&key).await?;

            let Some(payload) = payload else {
                debug!(key = %key, "Dropping queue entry with no payload");
                continue;
            };

            let record: JobRecord = match serde_json::from_str(&payload) {
                Ok(record) => record,
                Err(e) => {
                    warn!(key = %key, error = %e, "Purging undecodable payload");
                    self.store.delete_payload(&key).await?;
                    continue;
                }
            };

            // A record that asked for a ttl is valid only while its marker
            // lives; a ttl of 0 is valid forever, marker or not.
            if record.ttl_seconds > 0 && !marker_present {
                debug!(key = %key, "Dropping expired queue entry");
                self.store.delete_payload(&key).await?;
                continue;
            }

            self.store.delete_payload(&key).await?;
            return Ok(record.job);
        }
    }
}
