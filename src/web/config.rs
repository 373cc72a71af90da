use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::feed::{FeedError, FeedSource, FileFeed, HttpFeed};
use crate::tracking::{LivenessPolicy, MotionConfig, ProjectionConfig, TrailConfig};
use crate::utils::deserialize_duration;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
    #[error("feed setup failed: {0}")]
    Feed(#[from] FeedError),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub feed: FeedConfig,
    pub projection: ProjectionConfig,
    pub trail: TrailConfig,
    pub liveness: LivenessPolicy,
    pub motion: MotionConfig,
    pub web: WebConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub url: Option<String>,
    pub file: Option<PathBuf>,
    #[serde(deserialize_with = "deserialize_duration")]
    pub poll_interval: Duration,
    #[serde(deserialize_with = "deserialize_duration")]
    pub timeout: Duration,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: None,
            file: None,
            poll_interval: Duration::from_secs(3),
            timeout: Duration::from_secs(10),
        }
    }
}

impl FeedConfig {
    pub fn source(&self) -> Result<Arc<dyn FeedSource>, ConfigError> {
        let source: Arc<dyn FeedSource> = match (&self.url, &self.file) {
            (Some(url), None) => Arc::new(HttpFeed::new(url.clone(), self.timeout)?),
            (None, Some(path)) => Arc::new(FileFeed::new(path.clone())),
            (Some(_), Some(_)) => {
                return Err(ConfigError::Invalid(
                    "feed.url and feed.file are mutually exclusive".into(),
                ))
            }
            (None, None) => {
                return Err(ConfigError::Invalid(
                    "one of feed.url or feed.file is required".into(),
                ))
            }
        };
        Ok(source)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default)]
    pub static_dir: Option<PathBuf>,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            static_dir: None,
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    pub fn from_str(yaml: &str) -> Result<Self, ConfigError> {
        // an empty document deserializes to unit, not to an empty mapping
        if yaml.trim().is_empty() {
            return Ok(Config::default());
        }
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.into()));
        let p = &self.projection;

        if p.range_long.is_degenerate() || p.range_lat.is_degenerate() || p.range_map.is_degenerate() {
            return invalid("projection ranges must have distinct end points");
        }
        if !p.height_scaling.is_finite() || !p.base_offset.is_finite() {
            return invalid("projection.height_scaling and base_offset must be finite");
        }
        if self.trail.capacity == 0 {
            return invalid("trail.capacity must be positive");
        }
        if self.liveness.hide_after >= self.liveness.evict_after {
            return invalid("liveness.hide_after must be shorter than liveness.evict_after");
        }
        if self.feed.poll_interval.is_zero() || self.motion.frame_interval.is_zero() {
            return invalid("feed.poll_interval and motion.frame_interval must be positive");
        }
        if !self.motion.speed_correction.is_finite() {
            return invalid("motion.speed_correction must be finite");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_str("").unwrap();
        assert_eq!(config.feed.poll_interval, Duration::from_secs(3));
        assert_eq!(config.trail.capacity, 600);
        assert_eq!(config.trail.policy.to_string(), "cap");
        assert_eq!(config.liveness.hide_after, Duration::from_secs(90));
        assert_eq!(config.liveness.evict_after, Duration::from_secs(300));
        assert_eq!(config.motion.speed_correction, 0.5418);
        assert_eq!(config.projection.range_map.a, 85.0);
        assert_eq!(config.web.bind, "0.0.0.0:8080");
    }

    #[test]
    fn test_full_config() {
        let yaml = r#"
feed:
  url: "http://localhost:9000/airplanes"
  poll_interval: "5s"
projection:
  range_long: { a: -100.0, b: -98.0 }
  height_scaling: 0.5555
trail:
  capacity: 120
  policy: wrap
liveness:
  hide_after: "1m"
  evict_after: "10m"
motion:
  frame_interval: "33ms"
web:
  bind: "127.0.0.1:3000"
"#;
        let config = Config::from_str(yaml).unwrap();
        assert_eq!(config.feed.poll_interval, Duration::from_secs(5));
        assert_eq!(config.feed.timeout, Duration::from_secs(10));
        assert_eq!(config.projection.range_long.b, -98.0);
        assert_eq!(config.projection.range_lat.a, 20.79720143430699);
        assert_eq!(config.trail.policy.to_string(), "wrap");
        assert_eq!(config.liveness.evict_after, Duration::from_secs(600));
        assert_eq!(config.motion.frame_interval, Duration::from_millis(33));
        assert!(config.feed.source().is_ok());
    }

    #[test]
    fn test_rejects_inverted_thresholds() {
        let yaml = "liveness:\n  hide_after: \"6m\"\n  evict_after: \"5m\"\n";
        assert!(matches!(Config::from_str(yaml), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_degenerate_range() {
        let yaml = "projection:\n  range_lat: { a: 19.0, b: 19.0 }\n";
        assert!(matches!(Config::from_str(yaml), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_bad_duration() {
        let yaml = "feed:\n  poll_interval: \"soon\"\n";
        assert!(matches!(Config::from_str(yaml), Err(ConfigError::Yaml(_))));
    }

    #[test]
    fn test_feed_source_requires_exactly_one() {
        let mut feed = FeedConfig::default();
        assert!(feed.source().is_err());
        feed.file = Some(PathBuf::from("snapshot.json"));
        assert_eq!(feed.source().unwrap().describe(), "snapshot.json");
        feed.url = Some("http://localhost".into());
        assert!(feed.source().is_err());
    }
}
