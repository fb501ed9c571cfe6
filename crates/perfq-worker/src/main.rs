//! perfq worker.
//!
//! Drains the shared queue and runs the build script each job maps to.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use perfq_config::{QueueSettings, RedisSettings, WorkerSettings};
use perfq_queue::JobQueue;
use perfq_store::RedisStore;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod command;
mod worker;

use command::CommandBuilder;
use worker::Worker;

#[derive(Parser)]
#[command(name = "perfq-worker")]
#[command(about = "perfq job worker", long_about = None)]
struct Args {
    /// Override the configured Redis URL
    #[arg(long)]
    redis_url: Option<String>,

    /// Override the configured build-scripts directory
    #[arg(long)]
    scripts_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let queue_settings = QueueSettings::from_env()?;
    let mut redis = RedisSettings::from_env()?;
    let mut worker_settings = WorkerSettings::from_env()?;
    if let Some(url) = args.redis_url {
        redis.url = url;
    }
    if let Some(dir) = args.scripts_dir {
        worker_settings.scripts_dir = dir;
    }

    info!(url = %redis.url, "Connecting to store...");
    let store = RedisStore::connect_with_queue_key(&redis.url, &redis.queue_key).await?;
    info!("Store connected");

    let queue = Arc::new(JobQueue::new(
        Arc::new(store),
        queue_settings.fetch_timeout_seconds,
    ));

    // Cooperative shutdown: flip the flag and let the current iteration
    // finish rather than cancelling an in-flight blocking wait.
    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = stop.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Shutdown requested; finishing current iteration");
                stop.store(true, Ordering::Relaxed);
            }
        });
    }

    let commands = CommandBuilder::new(&worker_settings);
    Worker::new(queue, commands, queue_settings, stop).run().await;

    Ok(())
}
