//! Notification retrieval settings.

use serde::{Deserialize, Serialize};
use std::path::Path;
use wikiref_model::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Users living in another wiki only see events of their own wiki.
    #[serde(default = "default_main_wiki")]
    pub main_wiki: String,

    /// Each batch fetches `expected_count * batch_multiplier` events.
    #[serde(default = "default_batch_multiplier")]
    pub batch_multiplier: usize,

    #[serde(default = "default_max_batches")]
    pub max_batches: usize,

    #[serde(default)]
    pub display_hidden_documents: bool,
}

fn default_enabled() -> bool {
    true
}

fn default_main_wiki() -> String {
    String::from("xwiki")
}

fn default_batch_multiplier() -> usize {
    2
}

fn default_max_batches() -> usize {
    10
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            main_wiki: default_main_wiki(),
            batch_multiplier: default_batch_multiplier(),
            max_batches: default_max_batches(),
            display_hidden_documents: false,
        }
    }
}

impl NotificationConfig {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(contents)?)
    }

    /// Get a config value by key (e.g., "max_batches" or "notifications.max_batches")
    pub fn get(&self, key: &str) -> Option<String> {
        let key = key.strip_prefix("notifications.").unwrap_or(key);
        match key {
            "enabled" => Some(self.enabled.to_string()),
            "main_wiki" => Some(self.main_wiki.clone()),
            "batch_multiplier" => Some(self.batch_multiplier.to_string()),
            "max_batches" => Some(self.max_batches.to_string()),
            "display_hidden_documents" => Some(self.display_hidden_documents.to_string()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = NotificationConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, NotificationConfig::default());
        assert_eq!(config.batch_multiplier, 2);
        assert_eq!(config.max_batches, 10);
        assert!(!config.display_hidden_documents);
    }

    #[test]
    fn test_partial_override() {
        let config = NotificationConfig::from_yaml_str("main_wiki: main\nmax_batches: 3\n").unwrap();
        assert_eq!(config.main_wiki, "main");
        assert_eq!(config.max_batches, 3);
        assert!(config.enabled);
    }

    #[test]
    fn test_get() {
        let config = NotificationConfig::default();
        assert_eq!(config.get("notifications.main_wiki").as_deref(), Some("xwiki"));
        assert_eq!(config.get("enabled").as_deref(), Some("true"));
        assert_eq!(config.get("batch_multiplier").as_deref(), Some("2"));
        assert_eq!(config.get("unknown"), None);
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notifications.yml");
        std::fs::write(&path, "display_hidden_documents: true\n").unwrap();
        assert!(NotificationConfig::from_file(&path).unwrap().display_hidden_documents);
        assert!(NotificationConfig::from_file(dir.path().join("missing.yml")).is_err());
    }
}
