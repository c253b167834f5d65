use core_config::{ConfigError, FromEnv, env_parse_or};
use std::time::Duration;

/// Tuning for [`TagService`](crate::service::TagService).
#[derive(Debug, Clone)]
pub struct TagServiceConfig {
    /// Upper bound on each store call
    pub store_timeout: Duration,
    /// Capacity of the index publisher queue
    pub publish_queue: usize,
}

impl Default for TagServiceConfig {
    fn default() -> Self {
        Self {
            store_timeout: Duration::from_millis(5000),
            publish_queue: 1024,
        }
    }
}

impl FromEnv for TagServiceConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Ok(Self {
            store_timeout: Duration::from_millis(env_parse_or(
                "TAG_STORE_TIMEOUT_MS",
                defaults.store_timeout.as_millis() as u64,
            )?),
            publish_queue: env_parse_or("TAG_PUBLISH_QUEUE", defaults.publish_queue)?,
        })
    }
}
