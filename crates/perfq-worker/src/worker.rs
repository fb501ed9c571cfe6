//! Worker loop that drains the queue.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use perfq_config::QueueSettings;
use perfq_core::{Error, JobPayload, JobType};
use perfq_queue::JobQueue;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::command::CommandBuilder;

/// Fetches and executes jobs, one at a time.
pub struct Worker {
    queue: Arc<JobQueue>,
    commands: CommandBuilder,
    settings: QueueSettings,
    stop: Arc<AtomicBool>,
}

impl Worker {
    pub fn new(
        queue: Arc<JobQueue>,
        commands: CommandBuilder,
        settings: QueueSettings,
        stop: Arc<AtomicBool>,
    ) -> Self {
        Self {
            queue,
            commands,
            settings,
            stop,
        }
    }

    /// Run until the stop flag is set. The flag is consulted only between
    /// iterations; an in-flight blocking wait is never interrupted.
    pub async fn run(&self) {
        info!("Worker started");

        while !self.stop.load(Ordering::Relaxed) {
            info!("Worker waiting for job...");
            match self.queue.fetch().await {
                Ok(job) => self.process(job).await,
                Err(Error::WaitTimeout) => {
                    debug!("Fetch wait timed out with the queue empty");
                }
                Err(e) => {
                    warn!(error = %e, "Fetch failed");
                    sleep(Duration::from_secs(5)).await;
                }
            }
        }

        info!("Worker stopped");
    }

    async fn process(&self, job: JobPayload) {
        info!(
            job_id = %job.job_id,
            job_type = %job.job_type,
            branch = %job.branch_tag,
            "Processing job"
        );

        match self.commands.run(&job).await {
            Ok(()) => {
                if job.job_type == JobType::Warmup {
                    self.queue_follow_up_run(&job).await;
                }
            }
            Err(e) => {
                error!(job_id = %job.job_id, error = %e, "Job execution failed");
            }
        }
    }

    /// A warmed branch is immediately queued for its performance run.
    async fn queue_follow_up_run(&self, warmup: &JobPayload) {
        let run = JobPayload {
            job_id: Uuid::now_v7(),
            job_type: JobType::Run,
            branch_tag: warmup.branch_tag.clone(),
            image_tag: None,
            compose_type: warmup.compose_type.clone(),
        };

        let weight = self.settings.priority.run;
        match self
            .queue
            .push(weight, run, self.settings.default_expire_seconds)
            .await
        {
            Ok(ack) => info!(key = %ack.key, score = ack.score, "Queued follow-up run job"),
            Err(e) => {
                error!(branch = %warmup.branch_tag, error = %e, "Failed to queue follow-up run job")
            }
        }
    }
}
