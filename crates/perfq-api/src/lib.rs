//! Job submission API for perfq.
//!
//! Producers POST warmup and run tasks here; the handlers validate and
//! authenticate, then push onto the queue. The queue itself performs no
//! validation.

pub mod auth;
pub mod error;
pub mod routes;
pub mod state;
pub mod validate;

pub use state::AppState;
