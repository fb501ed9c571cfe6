//! Runtime configuration for perfq.
//!
//! Settings are grouped per concern (queue, store, API, worker), each with
//! typed defaults and a `from_env` loader over `PERFQ_*` variables, so the
//! binaries load only the sections they need.

pub mod error;
pub mod settings;

pub use error::{ConfigError, ConfigResult};
pub use settings::{ApiSettings, PriorityTable, QueueSettings, RedisSettings, WorkerSettings};
