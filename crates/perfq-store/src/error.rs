//! Store error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A bounded blocking pop elapsed with no entry appearing.
    #[error("wait timed out")]
    WaitTimeout,

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

impl From<StoreError> for perfq_core::Error {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::WaitTimeout => perfq_core::Error::WaitTimeout,
            StoreError::Unavailable(msg) => perfq_core::Error::StoreUnavailable(msg),
        }
    }
}
