use serde::{Deserialize, Deserializer};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::catalog::ValidationMode;

pub const DEFAULT_FEED_URL: &str =
    "https://celestrak.org/NORAD/elements/gp.php?GROUP=starlink&FORMAT=tle";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub live: LiveConfig,
    #[serde(default)]
    pub trajectory: TrajectoryConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub startup: StartupConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        WebConfig {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    #[serde(default = "default_feed_url")]
    pub url: String,
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
    #[serde(default = "default_feed_timeout", deserialize_with = "deserialize_duration")]
    pub timeout: Duration,
    #[serde(default)]
    pub strict_validation: bool,
    /// Re-ingest and recompute trajectories this often while serving. Off when absent.
    #[serde(default, deserialize_with = "deserialize_optional_duration")]
    pub refresh: Option<Duration>,
}

impl FeedConfig {
    pub fn validation_mode(&self) -> ValidationMode {
        if self.strict_validation {
            ValidationMode::Strict
        } else {
            ValidationMode::Permissive
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        FeedConfig {
            url: default_feed_url(),
            max_body_bytes: default_max_body_bytes(),
            timeout: default_feed_timeout(),
            strict_validation: false,
            refresh: None,
        }
    }
}

fn default_feed_url() -> String {
    DEFAULT_FEED_URL.to_string()
}

fn default_max_body_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_feed_timeout() -> Duration {
    Duration::from_secs(30)
}

#[derive(Debug, Clone, Deserialize)]
pub struct LiveConfig {
    #[serde(default = "default_live_period", deserialize_with = "deserialize_duration")]
    pub period: Duration,
    #[serde(default = "default_cache_ttl", deserialize_with = "deserialize_duration")]
    pub cache_ttl: Duration,
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl Default for LiveConfig {
    fn default() -> Self {
        LiveConfig {
            period: default_live_period(),
            cache_ttl: default_cache_ttl(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

fn default_live_period() -> Duration {
    Duration::from_secs(30)
}

fn default_cache_ttl() -> Duration {
    Duration::from_secs(45)
}

fn default_channel_capacity() -> usize {
    16
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrajectoryConfig {
    #[serde(default = "default_workers")]
    pub workers: usize,
}

impl Default for TrajectoryConfig {
    fn default() -> Self {
        TrajectoryConfig {
            workers: default_workers(),
        }
    }
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum StorageConfig {
    #[default]
    Memory,
    File { base_folder: PathBuf },
}

impl StorageConfig {
    /// Whether stored documents outlive the process.
    pub fn is_persistent(&self) -> bool {
        matches!(self, StorageConfig::File { .. })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StartupConfig {
    #[serde(default = "default_true")]
    pub ingest: bool,
    #[serde(default = "default_true")]
    pub trajectories: bool,
}

impl Default for StartupConfig {
    fn default() -> Self {
        StartupConfig {
            ingest: true,
            trajectories: true,
        }
    }
}

fn default_true() -> bool {
    true
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    humantime::parse_duration(s.trim()).map_err(serde::de::Error::custom)
}

fn deserialize_optional_duration<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = Option::<String>::deserialize(deserializer)?;
    s.map(|s| humantime::parse_duration(s.trim()).map_err(serde::de::Error::custom))
        .transpose()
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.live.period.is_zero() {
            return Err(ConfigError::Invalid("live.period must be positive".into()));
        }
        if self.live.cache_ttl.is_zero() {
            return Err(ConfigError::Invalid("live.cache_ttl must be positive".into()));
        }
        if self.live.channel_capacity == 0 {
            return Err(ConfigError::Invalid(
                "live.channel_capacity must be positive".into(),
            ));
        }
        if self.feed.refresh.is_some_and(|d| d.is_zero()) {
            return Err(ConfigError::Invalid("feed.refresh must be positive".into()));
        }
        if self.trajectory.workers == 0 {
            return Err(ConfigError::Invalid("trajectory.workers must be positive".into()));
        }
        Ok(())
    }
}
