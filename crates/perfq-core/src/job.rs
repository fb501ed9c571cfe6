//! Job types shared by the queue, the API, and the worker.

use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Class of work a job represents. The class decides the priority weight and
/// which build script the worker runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
pub enum JobType {
    /// Build the branch image and warm its environment.
    #[display("warmup")]
    Warmup,
    /// Execute the performance run against a warmed environment.
    #[display("run")]
    Run,
}

/// The unit of work submitted by producers and executed by the worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPayload {
    /// Assigned at submission; used for log correlation.
    pub job_id: Uuid,
    #[serde(rename = "type")]
    pub job_type: JobType,
    /// Branch tag that separates runs. Doubles as the deduplication key.
    pub branch_tag: String,
    /// Image tag to warm with (warmup jobs only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_tag: Option<String>,
    /// Compose file variant the build scripts should use.
    pub compose_type: String,
}

impl JobPayload {
    /// Deduplication identity: at most one live queue entry exists per key.
    pub fn key(&self) -> &str {
        &self.branch_tag
    }
}

/// Persisted envelope around a payload.
///
/// `ttl_seconds` travels with the record so the fetch loop can tell a
/// never-expiring job apart from one whose expiry marker has lapsed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRecord {
    pub job: JobPayload,
    pub ttl_seconds: u64,
    pub enqueued_at: DateTime<Utc>,
}
