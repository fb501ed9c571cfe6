//! Error types for perfq.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A bounded fetch elapsed with the queue still empty. Expected; callers
    /// loop and try again.
    #[error("wait timed out")]
    WaitTimeout,

    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
