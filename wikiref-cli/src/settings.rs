//! The `wikiref.yml` file.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;
use wikiref_model::{ModelConfig, SymbolResolver};
use wikiref_notifications::NotificationConfig;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub model: ModelConfig,

    #[serde(default)]
    pub notifications: NotificationConfig,
}

impl Settings {
    /// Load settings, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no configuration file, using defaults");
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration {}", path.display()))?;
        serde_yaml::from_str(&contents).with_context(|| format!("Failed to parse configuration {}", path.display()))
    }

    pub fn resolver(&self) -> SymbolResolver {
        SymbolResolver::new(self.model.clone())
    }
}
