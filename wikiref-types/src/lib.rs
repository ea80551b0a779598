//! Shared types for wikiref
//!
//! This crate provides the leaf types used across the wikiref ecosystem:
//! the ordered classification of entity kinds, locales, and the values that
//! can be attached to a reference as side-channel parameters.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Kind of entity a reference points to.
///
/// The declaration order is the natural order of the hierarchy and is relied
/// upon by reference sets to decide which level of a rule comes first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityType {
    Wiki,
    Space,
    Document,
    Attachment,
    Object,
    ObjectProperty,
    ClassProperty,
    Page,
    PageAttachment,
    PageObject,
    PageObjectProperty,
    PageClassProperty,
}

impl EntityType {
    /// All entity types in natural order.
    pub const fn all() -> &'static [EntityType] {
        &[
            EntityType::Wiki,
            EntityType::Space,
            EntityType::Document,
            EntityType::Attachment,
            EntityType::Object,
            EntityType::ObjectProperty,
            EntityType::ClassProperty,
            EntityType::Page,
            EntityType::PageAttachment,
            EntityType::PageObject,
            EntityType::PageObjectProperty,
            EntityType::PageClassProperty,
        ]
    }

    /// Types that may appear as the direct parent of this type. The first
    /// entry is the one used when a parent has to be made up.
    pub const fn allowed_parents(&self) -> &'static [EntityType] {
        match self {
            EntityType::Wiki => &[],
            EntityType::Space => &[EntityType::Wiki, EntityType::Space],
            EntityType::Document => &[EntityType::Space],
            EntityType::Attachment | EntityType::Object | EntityType::ClassProperty => {
                &[EntityType::Document]
            }
            EntityType::ObjectProperty => &[EntityType::Object],
            EntityType::Page => &[EntityType::Wiki, EntityType::Page],
            EntityType::PageAttachment
            | EntityType::PageObject
            | EntityType::PageClassProperty => &[EntityType::Page],
            EntityType::PageObjectProperty => &[EntityType::PageObject],
        }
    }

    /// Whether `ancestor` can appear somewhere above this type.
    pub fn is_allowed_ancestor(&self, ancestor: EntityType) -> bool {
        self.allowed_parents().iter().any(|parent| {
            *parent == ancestor || (*parent != *self && parent.is_allowed_ancestor(ancestor))
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Wiki => "WIKI",
            EntityType::Space => "SPACE",
            EntityType::Document => "DOCUMENT",
            EntityType::Attachment => "ATTACHMENT",
            EntityType::Object => "OBJECT",
            EntityType::ObjectProperty => "OBJECT_PROPERTY",
            EntityType::ClassProperty => "CLASS_PROPERTY",
            EntityType::Page => "PAGE",
            EntityType::PageAttachment => "PAGE_ATTACHMENT",
            EntityType::PageObject => "PAGE_OBJECT",
            EntityType::PageObjectProperty => "PAGE_OBJECT_PROPERTY",
            EntityType::PageClassProperty => "PAGE_CLASS_PROPERTY",
        }
    }

    /// Lower case form, e.g. `object_property`.
    pub fn lower_case(&self) -> String {
        self.as_str().to_lowercase()
    }

    /// Human label used when printing references, e.g. `Object_property`.
    pub fn label(&self) -> String {
        let lower = self.lower_case();
        let mut chars = lower.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => lower,
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string does not name an entity type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown entity type [{0}]")]
pub struct ParseEntityTypeError(pub String);

impl FromStr for EntityType {
    type Err = ParseEntityTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_lowercase();
        EntityType::all()
            .iter()
            .copied()
            .find(|t| t.as_str().replace('_', "").to_lowercase() == normalized)
            .ok_or_else(|| ParseEntityTypeError(s.to_string()))
    }
}

/// Language tag such as `fr` or `fr_FR`. The empty tag is the root locale.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Locale(pub String);

impl Locale {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn root() -> Self {
        Self(String::new())
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Language part of the tag (`fr` for `fr_FR`).
    pub fn language(&self) -> &str {
        self.0.split(['_', '-']).next().unwrap_or_default()
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Locale {
    fn from(tag: &str) -> Self {
        Locale::new(tag)
    }
}

/// Value stored in the parameters of a reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum ParameterValue {
    Locale(Locale),
    String(String),
    Type(EntityType),
    Integer(i64),
    Boolean(bool),
}

impl ParameterValue {
    pub fn as_locale(&self) -> Option<&Locale> {
        match self {
            ParameterValue::Locale(locale) => Some(locale),
            _ => None,
        }
    }

    pub fn as_entity_type(&self) -> Option<EntityType> {
        match self {
            ParameterValue::Type(t) => Some(*t),
            ParameterValue::String(s) => s.parse().ok(),
            _ => None,
        }
    }
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterValue::Locale(locale) => write!(f, "{locale}"),
            ParameterValue::String(s) => f.write_str(s),
            ParameterValue::Type(t) => write!(f, "{t}"),
            ParameterValue::Integer(i) => write!(f, "{i}"),
            ParameterValue::Boolean(b) => write!(f, "{b}"),
        }
    }
}

impl From<Locale> for ParameterValue {
    fn from(locale: Locale) -> Self {
        ParameterValue::Locale(locale)
    }
}

impl From<&str> for ParameterValue {
    fn from(value: &str) -> Self {
        ParameterValue::String(value.to_string())
    }
}

impl From<String> for ParameterValue {
    fn from(value: String) -> Self {
        ParameterValue::String(value)
    }
}

impl From<EntityType> for ParameterValue {
    fn from(value: EntityType) -> Self {
        ParameterValue::Type(value)
    }
}

impl From<i64> for ParameterValue {
    fn from(value: i64) -> Self {
        ParameterValue::Integer(value)
    }
}

impl From<bool> for ParameterValue {
    fn from(value: bool) -> Self {
        ParameterValue::Boolean(value)
    }
}
