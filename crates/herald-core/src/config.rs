//! Dispatcher configuration.
//!
//! Sources, lowest to highest priority: defaults, JSON, environment.
//!
//! | env                        | field               | default |
//! |----------------------------|---------------------|---------|
//! | `HERALD_WORKERS_PER_QUEUE` | `workers_per_queue` | 1       |
//! | `HERALD_QUEUE_CAPACITY`    | `queue_capacity`    | none    |

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const ENV_WORKERS_PER_QUEUE: &str = "HERALD_WORKERS_PER_QUEUE";
pub const ENV_QUEUE_CAPACITY: &str = "HERALD_QUEUE_CAPACITY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },

    #[error("failed to parse config json: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatcherConfig {
    /// Workers started per registered queue. Values below 1 are treated as 1.
    #[serde(default = "default_workers_per_queue")]
    pub workers_per_queue: usize,

    /// Capacity for queues the application builds from this config.
    #[serde(default)]
    pub queue_capacity: Option<usize>,
}

fn default_workers_per_queue() -> usize {
    1
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            workers_per_queue: default_workers_per_queue(),
            queue_capacity: None,
        }
    }
}

impl DispatcherConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Defaults overridden by `HERALD_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().merge_env(|key| std::env::var(key).ok())
    }

    /// Override fields from a key lookup (the process environment in
    /// `from_env`, a map in tests).
    pub fn merge_env<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(n) = parse_var::<usize, _>(&lookup, ENV_WORKERS_PER_QUEUE)? {
            self.workers_per_queue = n;
        }
        if let Some(cap) = parse_var::<usize, _>(&lookup, ENV_QUEUE_CAPACITY)? {
            self.queue_capacity = Some(cap);
        }
        Ok(self)
    }

    /// `workers_per_queue` clamped to at least 1.
    pub fn effective_workers_per_queue(&self) -> usize {
        self.workers_per_queue.max(1)
    }
}

fn parse_var<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { key, value: raw }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = DispatcherConfig::default();
        assert_eq!(config.workers_per_queue, 1);
        assert_eq!(config.queue_capacity, None);
    }

    #[test]
    fn json_fills_missing_fields_with_defaults() {
        let config = DispatcherConfig::from_json_str(r#"{"queue_capacity": 64}"#).unwrap();
        assert_eq!(config.workers_per_queue, 1);
        assert_eq!(config.queue_capacity, Some(64));
    }

    #[test]
    fn env_overrides() {
        let config = DispatcherConfig::default()
            .merge_env(lookup(&[
                (ENV_WORKERS_PER_QUEUE, "4"),
                (ENV_QUEUE_CAPACITY, " 128 "),
            ]))
            .unwrap();
        assert_eq!(config.workers_per_queue, 4);
        assert_eq!(config.queue_capacity, Some(128));
    }

    #[test]
    fn invalid_env_value_is_rejected() {
        let err = DispatcherConfig::default()
            .merge_env(lookup(&[(ENV_WORKERS_PER_QUEUE, "many")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { key: ENV_WORKERS_PER_QUEUE, .. }
        ));
    }

    #[rstest]
    #[case(0, 1)]
    #[case(1, 1)]
    #[case(8, 8)]
    fn effective_workers_is_clamped(#[case] configured: usize, #[case] expected: usize) {
        let config = DispatcherConfig {
            workers_per_queue: configured,
            ..Default::default()
        };
        assert_eq!(config.effective_workers_per_queue(), expected);
    }
}
