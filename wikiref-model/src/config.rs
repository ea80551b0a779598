//! Configuration parsing for the reference model.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use wikiref_types::EntityType;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    ParseError(#[from] serde_yaml::Error),
}

/// Default entity names used when a reference is resolved from an
/// incomplete string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_wiki")]
    pub default_wiki: String,

    #[serde(default = "default_space")]
    pub default_space: String,

    #[serde(default = "default_document")]
    pub default_document: String,

    #[serde(default = "default_attachment")]
    pub default_attachment: String,

    #[serde(default = "default_object")]
    pub default_object: String,

    #[serde(default = "default_property")]
    pub default_object_property: String,

    #[serde(default = "default_property")]
    pub default_class_property: String,

    #[serde(default = "default_space")]
    pub default_page: String,
}

fn default_wiki() -> String {
    String::from("xwiki")
}

fn default_space() -> String {
    String::from("Main")
}

fn default_document() -> String {
    String::from("WebHome")
}

fn default_attachment() -> String {
    String::from("filename")
}

fn default_object() -> String {
    String::from("object")
}

fn default_property() -> String {
    String::from("property")
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            default_wiki: default_wiki(),
            default_space: default_space(),
            default_document: default_document(),
            default_attachment: default_attachment(),
            default_object: default_object(),
            default_object_property: default_property(),
            default_class_property: default_property(),
            default_page: default_space(),
        }
    }
}

impl ModelConfig {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(contents)?)
    }

    /// Default name for a level of the hierarchy. Page-side types share
    /// the defaults of their document-side counterparts.
    pub fn default_name(&self, entity_type: EntityType) -> &str {
        match entity_type {
            EntityType::Wiki => &self.default_wiki,
            EntityType::Space => &self.default_space,
            EntityType::Document => &self.default_document,
            EntityType::Attachment | EntityType::PageAttachment => &self.default_attachment,
            EntityType::Object | EntityType::PageObject => &self.default_object,
            EntityType::ObjectProperty | EntityType::PageObjectProperty => {
                &self.default_object_property
            }
            EntityType::ClassProperty | EntityType::PageClassProperty => {
                &self.default_class_property
            }
            EntityType::Page => &self.default_page,
        }
    }

    /// Get a config value by key (e.g., "default_wiki" or "model.default_wiki")
    pub fn get(&self, key: &str) -> Option<String> {
        let key = key.strip_prefix("model.").unwrap_or(key);
        match key {
            "default_wiki" => Some(self.default_wiki.clone()),
            "default_space" => Some(self.default_space.clone()),
            "default_document" => Some(self.default_document.clone()),
            "default_attachment" => Some(self.default_attachment.clone()),
            "default_object" => Some(self.default_object.clone()),
            "default_object_property" => Some(self.default_object_property.clone()),
            "default_class_property" => Some(self.default_class_property.clone()),
            "default_page" => Some(self.default_page.clone()),
            _ => None,
        }
    }
}
