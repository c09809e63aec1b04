//! The config file's shape: a single
//! TOML file selecting the store path, scheduler interval, and the
//! source/processor/target declarations.

use std::time::Duration;

use serde::Deserialize;

use crate::duration::{deserialize_duration, parse_duration};
use crate::error::ConfigError;

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
    #[serde(deserialize_with = "deserialize_duration")]
    pub interval: Duration,
    #[serde(default)]
    pub run_once: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedServerConfig {
    #[serde(default = "default_feed_port")]
    pub port: u16,
    #[serde(default = "default_feed_size")]
    pub feed_size: i64,
    #[serde(default = "default_max_items")]
    pub max_items: usize,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

fn default_feed_port() -> u16 {
    8080
}

fn default_feed_size() -> i64 {
    200
}

fn default_max_items() -> usize {
    50
}

fn default_per_page() -> u32 {
    20
}

impl Default for FeedServerConfig {
    fn default() -> Self {
        Self {
            port: default_feed_port(),
            feed_size: default_feed_size(),
            max_items: default_max_items(),
            per_page: default_per_page(),
        }
    }
}

/// One `[[sources]]` entry. Type-specific settings (`list_url`,
/// `webhook_url`, `window`, ...) live in `settings` and are read with
/// the typed accessors below, matching `MetadataValue`'s
/// "field not present on mismatch" probing convention.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub targets: Vec<String>,
    #[serde(flatten)]
    pub settings: toml::Table,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProcessorConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub depends_on: Vec<String>,
    #[serde(flatten)]
    pub settings: toml::Table,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TargetConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(flatten)]
    pub settings: toml::Table,
}

macro_rules! settings_accessor {
    ($name:ident, $variant:ident, $ret:ty) => {
        pub fn $name(&self, key: &str) -> Option<$ret> {
            match self.settings.get(key)? {
                toml::Value::$variant(v) => Some(v.clone().into()),
                _ => None,
            }
        }
    };
}

impl SourceConfig {
    settings_accessor!(get_str, String, String);
    settings_accessor!(get_int, Integer, i64);
    settings_accessor!(get_float, Float, f64);
    settings_accessor!(get_bool, Boolean, bool);

    pub fn get_duration(&self, key: &str) -> Option<Result<Duration, ConfigError>> {
        self.get_str(key).map(|s| parse_duration(&s))
    }
}

impl ProcessorConfig {
    settings_accessor!(get_str, String, String);
    settings_accessor!(get_int, Integer, i64);
    settings_accessor!(get_float, Float, f64);
    settings_accessor!(get_bool, Boolean, bool);

    pub fn get_duration(&self, key: &str) -> Option<Result<Duration, ConfigError>> {
        self.get_str(key).map(|s| parse_duration(&s))
    }

    pub fn get_str_list(&self, key: &str) -> Vec<String> {
        match self.settings.get(key) {
            Some(toml::Value::Array(items)) => items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        }
    }
}

impl TargetConfig {
    settings_accessor!(get_str, String, String);
    settings_accessor!(get_int, Integer, i64);
    settings_accessor!(get_float, Float, f64);
    settings_accessor!(get_bool, Boolean, bool);

    pub fn get_duration(&self, key: &str) -> Option<Result<Duration, ConfigError>> {
        self.get_str(key).map(|s| parse_duration(&s))
    }
}

/// The fully-parsed, not-yet-validated config file.
#[derive(Debug, Clone, Deserialize)]
pub struct RootConfig {
    pub store: StoreConfig,
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub feed_server: FeedServerConfig,
    #[serde(default)]
    pub sources: Vec<SourceConfig>,
    #[serde(default)]
    pub processors: Vec<ProcessorConfig>,
    #[serde(default)]
    pub targets: Vec<TargetConfig>,
}
