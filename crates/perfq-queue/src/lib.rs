//! Priority queue engine for perfq.
//!
//! Orders jobs by a composite priority/time score over a shared ordered
//! index, keeps one live entry per branch, expires stale entries, and drains
//! through a blocking fetch loop that reclaims expired entries on the way.

pub mod queue;
pub mod score;

pub use queue::{JobQueue, PushAck};
pub use score::score;
