//! Runtime configuration
//!
//! Defaults match the storage-queue service assumptions: 30 second leases,
//! 200 ms pacing between resends and at most 32 messages per receive.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{CourierError, LibResult};

/// Service limit on messages per receive call
pub const MAX_BATCH_SIZE: usize = 32;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CourierConfig {
    /// Poison-queue requeue settings
    #[serde(default)]
    pub requeue: RequeueConfig,
}

/// Poison-queue requeue settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequeueConfig {
    /// How long received poison messages stay hidden from other receivers
    #[serde(with = "humantime_serde", default = "default_visibility_timeout")]
    pub visibility_timeout: Duration,

    /// Delay before each individual resend
    #[serde(with = "humantime_serde", default = "default_pacing")]
    pub pacing: Duration,

    /// Messages requested per receive, at most 32
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Suffix that turns a live queue name into its poison queue name
    #[serde(default = "default_poison_suffix")]
    pub poison_suffix: String,
}

// Default value functions for serde
fn default_visibility_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_pacing() -> Duration {
    Duration::from_millis(200)
}

fn default_batch_size() -> usize {
    MAX_BATCH_SIZE
}

fn default_poison_suffix() -> String {
    "-poison".to_string()
}

impl Default for RequeueConfig {
    fn default() -> Self {
        Self {
            visibility_timeout: default_visibility_timeout(),
            pacing: default_pacing(),
            batch_size: default_batch_size(),
            poison_suffix: default_poison_suffix(),
        }
    }
}

impl RequeueConfig {
    /// Check the settings against the queue service limits
    pub fn validate(&self) -> LibResult<()> {
        if self.batch_size == 0 || self.batch_size > MAX_BATCH_SIZE {
            return Err(CourierError::config(format!(
                "batch_size must be between 1 and {}, got {}",
                MAX_BATCH_SIZE, self.batch_size
            )));
        }
        if self.poison_suffix.is_empty() {
            return Err(CourierError::config("poison_suffix must not be empty"));
        }
        Ok(())
    }

    /// Defaults overridden by `COURIER_REQUEUE_*` / `COURIER_POISON_SUFFIX`
    pub fn from_env() -> LibResult<Self> {
        let mut config = Self::default();

        if let Some(secs) = env_parse::<u64>("COURIER_REQUEUE_VISIBILITY_TIMEOUT_SECS")? {
            config.visibility_timeout = Duration::from_secs(secs);
        }
        if let Some(millis) = env_parse::<u64>("COURIER_REQUEUE_PACING_MS")? {
            config.pacing = Duration::from_millis(millis);
        }
        if let Some(size) = env_parse::<usize>("COURIER_REQUEUE_BATCH_SIZE")? {
            config.batch_size = size;
        }
        if let Ok(suffix) = std::env::var("COURIER_POISON_SUFFIX") {
            config.poison_suffix = suffix;
        }

        config.validate()?;
        Ok(config)
    }
}

impl CourierConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> LibResult<Self> {
        Ok(Self {
            requeue: RequeueConfig::from_env()?,
        })
    }

    /// Load a YAML configuration file; missing fields take their defaults
    pub fn from_yaml_path(path: &Path) -> LibResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&contents)?;
        config.requeue.validate()?;
        Ok(config)
    }
}

fn env_parse<T>(name: &str) -> LibResult<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| CourierError::config(format!("{}={:?}: {}", name, raw, e))),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;
    use std::io::Write;

    const VARS: [&str; 4] = [
        "COURIER_REQUEUE_VISIBILITY_TIMEOUT_SECS",
        "COURIER_REQUEUE_PACING_MS",
        "COURIER_REQUEUE_BATCH_SIZE",
        "COURIER_POISON_SUFFIX",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_requeue_config_default() {
        let config = RequeueConfig::default();

        assert_eq!(config.visibility_timeout, Duration::from_secs(30));
        assert_eq!(config.pacing, Duration::from_millis(200));
        assert_eq!(config.batch_size, 32);
        assert_eq!(config.poison_suffix, "-poison");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_batch_size() {
        let mut config = RequeueConfig::default();
        config.batch_size = 0;
        assert!(config.validate().is_err());
        config.batch_size = 33;
        assert!(config.validate().is_err());
        config.batch_size = 1;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_suffix() {
        let config = RequeueConfig {
            poison_suffix: String::new(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(CourierError::Config(_))));
    }

    #[test]
    fn test_humantime_deserialization() {
        let config: CourierConfig = serde_yaml::from_str(
            "requeue:\n  visibility_timeout: 1m\n  pacing: 50ms\n",
        )
        .unwrap();
        assert_eq!(config.requeue.visibility_timeout, Duration::from_secs(60));
        assert_eq!(config.requeue.pacing, Duration::from_millis(50));
        assert_eq!(config.requeue.batch_size, 32);
    }

    #[test]
    fn test_from_yaml_path() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "requeue:\n  batch_size: 8\n  poison_suffix: -dead").unwrap();

        let config = CourierConfig::from_yaml_path(file.path()).unwrap();
        assert_eq!(config.requeue.batch_size, 8);
        assert_eq!(config.requeue.poison_suffix, "-dead");
        assert_eq!(config.requeue.pacing, Duration::from_millis(200));
    }

    #[test]
    fn test_from_yaml_path_validates() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "requeue:\n  batch_size: 100").unwrap();
        assert!(CourierConfig::from_yaml_path(file.path()).is_err());
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        clear_env();
        let config = CourierConfig::from_env().unwrap();
        assert_eq!(config, CourierConfig::default());
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        clear_env();
        env::set_var("COURIER_REQUEUE_VISIBILITY_TIMEOUT_SECS", "45");
        env::set_var("COURIER_REQUEUE_PACING_MS", "0");
        env::set_var("COURIER_REQUEUE_BATCH_SIZE", "16");
        env::set_var("COURIER_POISON_SUFFIX", "-dlq");

        let config = RequeueConfig::from_env().unwrap();
        assert_eq!(config.visibility_timeout, Duration::from_secs(45));
        assert_eq!(config.pacing, Duration::ZERO);
        assert_eq!(config.batch_size, 16);
        assert_eq!(config.poison_suffix, "-dlq");

        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_invalid_values() {
        clear_env();
        env::set_var("COURIER_REQUEUE_BATCH_SIZE", "lots");
        assert!(RequeueConfig::from_env().is_err());

        env::set_var("COURIER_REQUEUE_BATCH_SIZE", "64");
        assert!(RequeueConfig::from_env().is_err());

        clear_env();
    }
}
