//! References used as patterns.
//!
//! A pattern is a chain of (type, name constraint) levels. Matching looks
//! for each pattern level somewhere above the candidate position, so a
//! pattern may leave levels out entirely: a lone space pattern matches
//! documents of that space in every wiki.

use crate::error::Result;
use crate::reference::EntityReference;
use regex::Regex;
use std::fmt;
use wikiref_types::EntityType;

/// Something a reference can be matched against.
pub trait ReferencePattern {
    /// Type of the lowest level of the pattern.
    fn entity_type(&self) -> EntityType;

    /// Match starting at `candidate`. A missing candidate (the chain ran
    /// out) is not constrained by the pattern.
    fn matches_from(&self, candidate: Option<&EntityReference>) -> bool;

    fn matches(&self, reference: &EntityReference) -> bool {
        self.matches_from(Some(reference))
    }
}

/// First element of the chain starting at `candidate` with the given type.
fn find_level(entity_type: EntityType, candidate: Option<&EntityReference>) -> Option<&EntityReference> {
    candidate.and_then(|c| c.extract_reference(entity_type))
}

/// Pattern where each level optionally fixes a name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialEntityReference {
    name: Option<String>,
    entity_type: EntityType,
    parent: Option<Box<PartialEntityReference>>,
}

impl PartialEntityReference {
    /// `None` as name matches any name at that level.
    pub fn new(name: Option<&str>, entity_type: EntityType) -> Self {
        Self {
            name: name.map(str::to_string),
            entity_type,
            parent: None,
        }
    }

    pub fn with_parent(mut self, parent: PartialEntityReference) -> Self {
        self.parent = Some(Box::new(parent));
        self
    }

    /// Pattern fixing every level of an existing reference.
    pub fn from_reference(reference: &EntityReference) -> Self {
        Self {
            name: Some(reference.name().to_string()),
            entity_type: reference.entity_type(),
            parent: reference
                .parent()
                .map(|parent| Box::new(Self::from_reference(parent))),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn parent(&self) -> Option<&PartialEntityReference> {
        self.parent.as_deref()
    }
}

impl ReferencePattern for PartialEntityReference {
    fn entity_type(&self) -> EntityType {
        self.entity_type
    }

    fn matches_from(&self, candidate: Option<&EntityReference>) -> bool {
        let Some(found) = find_level(self.entity_type, candidate) else {
            return true;
        };
        if self.name.as_deref().is_some_and(|name| name != found.name()) {
            return false;
        }
        match &self.parent {
            None => true,
            Some(parent) => parent.matches_from(found.parent()),
        }
    }
}

/// Pattern where each level optionally constrains the name with a regular
/// expression. The expression must match the whole name.
#[derive(Debug, Clone)]
pub struct RegexEntityReference {
    pattern: Option<Regex>,
    source: Option<String>,
    entity_type: EntityType,
    parent: Option<Box<RegexEntityReference>>,
}

impl RegexEntityReference {
    pub fn new(pattern: &str, entity_type: EntityType) -> Result<Self> {
        let anchored = Regex::new(&format!("^(?:{pattern})$"))?;
        Ok(Self {
            pattern: Some(anchored),
            source: Some(pattern.to_string()),
            entity_type,
            parent: None,
        })
    }

    /// Level accepting any name.
    pub fn any(entity_type: EntityType) -> Self {
        Self {
            pattern: None,
            source: None,
            entity_type,
            parent: None,
        }
    }

    pub fn with_parent(mut self, parent: RegexEntityReference) -> Self {
        self.parent = Some(Box::new(parent));
        self
    }

    /// The expression as it was given.
    pub fn pattern(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn parent(&self) -> Option<&RegexEntityReference> {
        self.parent.as_deref()
    }
}

impl ReferencePattern for RegexEntityReference {
    fn entity_type(&self) -> EntityType {
        self.entity_type
    }

    fn matches_from(&self, candidate: Option<&EntityReference>) -> bool {
        let Some(found) = find_level(self.entity_type, candidate) else {
            return true;
        };
        if let Some(pattern) = &self.pattern {
            if !pattern.is_match(found.name()) {
                return false;
            }
        }
        match &self.parent {
            None => true,
            Some(parent) => parent.matches_from(found.parent()),
        }
    }
}

impl fmt::Display for RegexEntityReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(parent) = &self.parent {
            write!(f, "{parent} / ")?;
        }
        write!(f, "{} ~ {}", self.entity_type.label(), self.source.as_deref().unwrap_or("*"))
    }
}

impl fmt::Display for PartialEntityReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(parent) = &self.parent {
            write!(f, "{parent} / ")?;
        }
        write!(f, "{} {}", self.entity_type.label(), self.name.as_deref().unwrap_or("*"))
    }
}
