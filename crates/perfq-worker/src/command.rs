//! Build-script command construction and execution.
//!
//! Jobs map onto the checked-in build scripts:
//! - warmup: `warmer/build.sh --tag <branch> --image <repo>:<tag> --file warmer/docker-compose.<variant>.yml`
//! - run:    `runner/build.sh --tag <branch> --file runner/docker-compose.<variant>.yml`

use std::path::PathBuf;

use perfq_config::WorkerSettings;
use perfq_core::{JobPayload, JobType};
use thiserror::Error;
use tokio::process::Command;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("failed to launch build script: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("build script exited with status {code:?}")]
    Failed { code: Option<i32> },
}

/// Builds and runs the shell command a job maps to.
pub struct CommandBuilder {
    scripts_dir: PathBuf,
    image_repository: String,
}

impl CommandBuilder {
    pub fn new(settings: &WorkerSettings) -> Self {
        Self {
            scripts_dir: settings.scripts_dir.clone(),
            image_repository: settings.image_repository.clone(),
        }
    }

    /// Command line for `job`. Tags are validated at submission, so plain
    /// interpolation is safe here.
    pub fn command_line(&self, job: &JobPayload) -> String {
        let scripts = self.scripts_dir.display();
        match job.job_type {
            JobType::Warmup => {
                let image_tag = job.image_tag.as_deref().unwrap_or("latest");
                format!(
                    "{scripts}/warmer/build.sh --tag {tag} --image {repo}:{image_tag} --file {scripts}/warmer/docker-compose.{variant}.yml",
                    tag = job.branch_tag,
                    repo = self.image_repository,
                    variant = job.compose_type,
                )
            }
            JobType::Run => format!(
                "{scripts}/runner/build.sh --tag {tag} --file {scripts}/runner/docker-compose.{variant}.yml",
                tag = job.branch_tag,
                variant = job.compose_type,
            ),
        }
    }

    /// Execute the job's build script to completion, logging its output.
    pub async fn run(&self, job: &JobPayload) -> Result<(), CommandError> {
        let line = self.command_line(job);
        info!(command = %line, "Executing command");

        let output = Command::new("sh").arg("-c").arg(&line).output().await?;

        if !output.status.success() {
            warn!(
                code = ?output.status.code(),
                stderr = %String::from_utf8_lossy(&output.stderr),
                "Build script failed"
            );
            return Err(CommandError::Failed {
                code: output.status.code(),
            });
        }

        info!(stdout = %String::from_utf8_lossy(&output.stdout), "Build script finished");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn builder() -> CommandBuilder {
        CommandBuilder {
            scripts_dir: PathBuf::from("/opt/perfq"),
            image_repository: "perfq/bench-env".to_string(),
        }
    }

    #[test]
    fn test_warmup_command_line() {
        let job = JobPayload {
            job_id: Uuid::now_v7(),
            job_type: JobType::Warmup,
            branch_tag: "feature-9".to_string(),
            image_tag: Some("9.1.0".to_string()),
            compose_type: "default".to_string(),
        };

        assert_eq!(
            builder().command_line(&job),
            "/opt/perfq/warmer/build.sh --tag feature-9 \
             --image perfq/bench-env:9.1.0 \
             --file /opt/perfq/warmer/docker-compose.default.yml"
        );
    }

    #[test]
    fn test_run_command_line() {
        let job = JobPayload {
            job_id: Uuid::now_v7(),
            job_type: JobType::Run,
            branch_tag: "feature-9".to_string(),
            image_tag: None,
            compose_type: "default".to_string(),
        };

        assert_eq!(
            builder().command_line(&job),
            "/opt/perfq/runner/build.sh --tag feature-9 \
             --file /opt/perfq/runner/docker-compose.default.yml"
        );
    }
}
