//! Settings types and environment loading.

use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use perfq_core::JobType;
use serde::{Deserialize, Serialize};

use crate::{ConfigError, ConfigResult};

/// Priority weight per job class. Lower weight dequeues first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriorityTable {
    pub warmup: u32,
    pub run: u32,
}

impl Default for PriorityTable {
    fn default() -> Self {
        Self {
            warmup: 10,
            run: 100,
        }
    }
}

impl PriorityTable {
    pub fn weight_for(&self, job_type: JobType) -> u32 {
        match job_type {
            JobType::Warmup => self.warmup,
            JobType::Run => self.run,
        }
    }
}

/// Queue behavior shared by producers and the consumer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueSettings {
    pub priority: PriorityTable,
    /// Seconds before an unfetched job expires. 3 days by default.
    pub default_expire_seconds: u64,
    /// Blocking fetch timeout in seconds. 0 = wait indefinitely.
    pub fetch_timeout_seconds: u64,
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self {
            priority: PriorityTable::default(),
            default_expire_seconds: 259_200,
            fetch_timeout_seconds: 0,
        }
    }
}

impl QueueSettings {
    pub fn from_env() -> ConfigResult<Self> {
        let defaults = Self::default();
        Ok(Self {
            priority: PriorityTable {
                warmup: env_parse("PERFQ_WARMUP_WEIGHT")?.unwrap_or(defaults.priority.warmup),
                run: env_parse("PERFQ_RUN_WEIGHT")?.unwrap_or(defaults.priority.run),
            },
            default_expire_seconds: env_parse("PERFQ_DEFAULT_EXPIRE_SECONDS")?
                .unwrap_or(defaults.default_expire_seconds),
            fetch_timeout_seconds: env_parse("PERFQ_FETCH_TIMEOUT_SECONDS")?
                .unwrap_or(defaults.fetch_timeout_seconds),
        })
    }
}

/// Redis connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisSettings {
    pub url: String,
    /// Name of the ordered index.
    pub queue_key: String,
}

impl Default for RedisSettings {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            queue_key: "perfq:queue".to_string(),
        }
    }
}

impl RedisSettings {
    pub fn from_env() -> ConfigResult<Self> {
        let defaults = Self::default();
        Ok(Self {
            url: env_var("PERFQ_REDIS_URL").unwrap_or(defaults.url),
            queue_key: env_var("PERFQ_QUEUE_KEY").unwrap_or(defaults.queue_key),
        })
    }
}

/// API server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    pub bind: String,
    /// Bearer token every job route requires.
    pub auth_token: String,
}

impl ApiSettings {
    /// Load from the environment. The token has no default: starting an API
    /// that silently rejects every request is worse than failing fast.
    pub fn from_env() -> ConfigResult<Self> {
        Ok(Self {
            bind: env_var("PERFQ_API_BIND").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
            auth_token: env_var("PERFQ_API_TOKEN")
                .ok_or(ConfigError::MissingVar("PERFQ_API_TOKEN"))?,
        })
    }
}

/// Worker settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerSettings {
    /// Directory holding the `warmer/` and `runner/` build scripts.
    pub scripts_dir: PathBuf,
    /// Image repository warmup jobs pull tags from.
    pub image_repository: String,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            scripts_dir: PathBuf::from("./scripts"),
            image_repository: "perfq/bench-env".to_string(),
        }
    }
}

impl WorkerSettings {
    pub fn from_env() -> ConfigResult<Self> {
        let defaults = Self::default();
        Ok(Self {
            scripts_dir: env_var("PERFQ_SCRIPTS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.scripts_dir),
            image_repository: env_var("PERFQ_IMAGE_REPOSITORY")
                .unwrap_or(defaults.image_repository),
        })
    }
}

/// A set but empty variable counts as unset.
fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn env_parse<T>(name: &'static str) -> ConfigResult<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    match env_var(name) {
        None => Ok(None),
        Some(raw) => raw.parse().map(Some).map_err(|e: T::Err| {
            ConfigError::InvalidValue {
                var: name,
                message: e.to_string(),
            }
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Environment mutation is process-global; serialize the tests that do it.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_queue_defaults() {
        let _guard = ENV_LOCK.lock().unwrap();
        let settings = QueueSettings::from_env().unwrap();

        assert_eq!(settings.priority.warmup, 10);
        assert_eq!(settings.priority.run, 100);
        assert_eq!(settings.default_expire_seconds, 259_200);
        assert_eq!(settings.fetch_timeout_seconds, 0);
    }

    #[test]
    fn test_weight_for_maps_job_types() {
        let table = PriorityTable::default();
        assert_eq!(table.weight_for(JobType::Warmup), 10);
        assert_eq!(table.weight_for(JobType::Run), 100);
    }

    #[test]
    fn test_env_overrides_defaults() {
        let _guard = ENV_LOCK.lock().unwrap();
        unsafe {
            std::env::set_var("PERFQ_FETCH_TIMEOUT_SECONDS", "30");
        }

        let settings = QueueSettings::from_env().unwrap();
        assert_eq!(settings.fetch_timeout_seconds, 30);

        unsafe {
            std::env::remove_var("PERFQ_FETCH_TIMEOUT_SECONDS");
        }
    }

    #[test]
    fn test_invalid_env_value_is_rejected() {
        let _guard = ENV_LOCK.lock().unwrap();
        unsafe {
            std::env::set_var("PERFQ_RUN_WEIGHT", "not-a-number");
        }

        let err = QueueSettings::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { var, .. } if var == "PERFQ_RUN_WEIGHT"));

        unsafe {
            std::env::remove_var("PERFQ_RUN_WEIGHT");
        }
    }

    #[test]
    fn test_api_token_is_required() {
        let _guard = ENV_LOCK.lock().unwrap();
        unsafe {
            std::env::remove_var("PERFQ_API_TOKEN");
        }

        let err = ApiSettings::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar("PERFQ_API_TOKEN")));
    }
}
