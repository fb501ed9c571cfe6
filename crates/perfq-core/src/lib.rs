//! Core domain types for the perfq job queue.
//!
//! This crate contains:
//! - Job payload and persisted record types
//! - The error taxonomy shared by producers and the consumer

pub mod error;
pub mod job;

pub use error::{Error, Result};
pub use job::{JobPayload, JobRecord, JobType};
