//! Application state.

use std::sync::Arc;

use perfq_config::QueueSettings;
use perfq_queue::JobQueue;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub queue: Arc<JobQueue>,
    pub settings: QueueSettings,
    pub auth_token: String,
}

impl AppState {
    pub fn new(queue: Arc<JobQueue>, settings: QueueSettings, auth_token: String) -> Self {
        Self {
            queue,
            settings,
            auth_token,
        }
    }
}
