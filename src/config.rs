use crate::engine_paths;
use crate::store::{DEFAULT_AGENT_NAME, DEFAULT_EVENT_BUFFER};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const DEFAULT_ENGINE_YAML: &str = include_str!("../engine.yaml");

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Directory of the key-value files. `None` means `<home>/data`.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    /// Name given to the personal agent at onboarding.
    #[serde(default = "default_agent_name")]
    pub agent_name: String,
    /// Capacity of the mutation notification channel.
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
    /// Whether store commands are recorded to `<home>/logs/events.jsonl`.
    #[serde(default)]
    pub structured_log: bool,
}

fn default_agent_name() -> String {
    DEFAULT_AGENT_NAME.to_string()
}

fn default_event_buffer() -> usize {
    DEFAULT_EVENT_BUFFER
}

impl EngineConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file as YAML: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// The configuration embedded from `engine.yaml`.
    pub fn default_config() -> Result<Self> {
        let config: Self = serde_yaml::from_str(DEFAULT_ENGINE_YAML)
            .context("Failed to parse embedded engine.yaml")?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `explicit` if given, else `<home>/config.yaml` if it exists,
    /// else the embedded default.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let user_config = engine_paths::config_path()?;
        if user_config.exists() {
            tracing::debug!("Using config {}", user_config.display());
            return Self::load(&user_config);
        }
        Self::default_config()
    }

    fn validate(&self) -> Result<()> {
        if self.agent_name.trim().is_empty() {
            anyhow::bail!("agent_name must not be empty");
        }
        if self.event_buffer == 0 {
            anyhow::bail!("event_buffer must be at least 1");
        }
        Ok(())
    }

    /// Key-value directory: the configured one, or `<home>/data`.
    pub fn resolve_data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => engine_paths::data_dir(),
        }
    }
}
