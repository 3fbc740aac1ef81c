use crate::error::ConfigError;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

const CONFIG_PATH_VAR: &str = "WETREMINDER_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "wetreminder.toml";
const ENV_PREFIX: &str = "WETREMINDER";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Configuration {
    pub log_level: String,
    pub pipeline: PipelineSettings,
    pub actuator: ActuatorSettings,
    pub trigger: TriggerSettings,
}

/// Window geometry, label order and decision threshold.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    pub sequence_length: usize,
    pub feature_dim: usize,
    /// Must match the order the classifier was trained against.
    pub labels: Vec<String>,
    pub threshold: f32,
    pub classifier_timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ActuatorSettings {
    /// Explicit device path. When unset the port is auto-discovered.
    pub port: Option<String>,
    pub baud_rate: u32,
    pub device_fingerprints: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct TriggerSettings {
    /// Labels allowed to fire the actuator. Empty means any label.
    pub actions: Vec<String>,
    pub min_interval_ms: Option<u64>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            pipeline: PipelineSettings::default(),
            actuator: ActuatorSettings::default(),
            trigger: TriggerSettings::default(),
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            sequence_length: 150,
            feature_dim: 1662,
            labels: vec!["doomscrolling".to_string(), "nothing".to_string()],
            threshold: 0.5,
            classifier_timeout_ms: None,
        }
    }
}

impl Default for ActuatorSettings {
    fn default() -> Self {
        Self {
            port: None,
            baud_rate: 9600,
            device_fingerprints: vec![
                "arduino".to_string(),
                "ch340".to_string(),
                "cp210".to_string(),
            ],
        }
    }
}

impl PipelineSettings {
    pub fn classifier_timeout(&self) -> Option<Duration> {
        self.classifier_timeout_ms.map(Duration::from_millis)
    }
}

impl TriggerSettings {
    pub fn min_interval(&self) -> Option<Duration> {
        self.min_interval_ms.map(Duration::from_millis)
    }
}

impl Configuration {
    /// Loads defaults, then the file named by `WETREMINDER_CONFIG` (or
    /// `wetreminder.toml`) if present, then `WETREMINDER__*` variables.
    pub fn load() -> Result<Self, ConfigError> {
        let path =
            std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(Path::new(&path))
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let configuration: Configuration = Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("pipeline.labels")
                    .with_list_parse_key("trigger.actions")
                    .with_list_parse_key("actuator.device_fingerprints"),
            )
            .build()?
            .try_deserialize()?;
        configuration.validate()?;
        Ok(configuration)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        let pipeline = &self.pipeline;
        if pipeline.sequence_length == 0 {
            return Err(ConfigError::Invalid(
                "Sequence length must be greater than 0".to_string(),
            ));
        }
        if pipeline.feature_dim == 0 {
            return Err(ConfigError::Invalid(
                "Feature dimension must be greater than 0".to_string(),
            ));
        }
        if pipeline.labels.is_empty() {
            return Err(ConfigError::Invalid(
                "At least one action label is required".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for label in &pipeline.labels {
            if !seen.insert(label.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "Duplicate action label '{}'",
                    label
                )));
            }
        }

        if !(0.0..=1.0).contains(&pipeline.threshold) {
            return Err(ConfigError::Invalid(format!(
                "Threshold must be between 0.0 and 1.0, got {}",
                pipeline.threshold
            )));
        }

        if let Some(unknown) = self
            .trigger
            .actions
            .iter()
            .find(|action| !seen.contains(action.as_str()))
        {
            return Err(ConfigError::Invalid(format!(
                "Trigger action '{}' is not a known label",
                unknown
            )));
        }

        Ok(())
    }
}
