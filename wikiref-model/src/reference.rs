//! The entity reference node.
//!
//! An [`EntityReference`] is an immutable value: a name, a type, an optional
//! shared parent and a small map of side-channel parameters. Every rewrite
//! (new parent, new locale, dropped parameters) returns a fresh value and
//! leaves the original untouched. Parents are shared through `Arc`, so
//! building many children of the same space is cheap.

use crate::error::{ReferenceError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use wikiref_types::{EntityType, Locale, ParameterValue};

/// Parameter key holding the locale of a reference.
pub const LOCALE_PARAMETER: &str = "locale";

/// Parameter key giving the type of the missing parent of a root reference.
pub const FALLBACK_PARENT_TYPE_PARAMETER: &str = "fallbackParentType";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityReference {
    name: String,
    entity_type: EntityType,
    parent: Option<Arc<EntityReference>>,
    parameters: BTreeMap<String, ParameterValue>,
}

impl EntityReference {
    /// Create a root reference.
    pub fn new(name: impl Into<String>, entity_type: EntityType) -> Result<Self> {
        Self::with_parent(name, entity_type, None)
    }

    pub fn with_parent(
        name: impl Into<String>,
        entity_type: EntityType,
        parent: Option<EntityReference>,
    ) -> Result<Self> {
        Self::with_parameters(name, entity_type, parent, BTreeMap::new())
    }

    pub fn with_parameters(
        name: impl Into<String>,
        entity_type: EntityType,
        parent: Option<EntityReference>,
        parameters: BTreeMap<String, ParameterValue>,
    ) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(ReferenceError::EmptyName);
        }

        let reference = Self {
            name,
            entity_type,
            parent: parent.map(Arc::new),
            parameters,
        };
        if let Some(value) = reference.parameters.get(FALLBACK_PARENT_TYPE_PARAMETER) {
            reference.check_fallback_parent_type(value)?;
        }
        Ok(reference)
    }

    /// Create a reference whose parent is `self`.
    pub fn child(&self, name: impl Into<String>, entity_type: EntityType) -> Result<Self> {
        Self::with_parent(name, entity_type, Some(self.clone()))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entity_type(&self) -> EntityType {
        self.entity_type
    }

    pub fn parent(&self) -> Option<&EntityReference> {
        self.parent.as_deref()
    }

    pub fn parameters(&self) -> &BTreeMap<String, ParameterValue> {
        &self.parameters
    }

    pub fn parameter(&self, key: &str) -> Option<&ParameterValue> {
        self.parameters.get(key)
    }

    /// Copy of this reference with one parameter set.
    pub fn with_parameter(&self, key: impl Into<String>, value: impl Into<ParameterValue>) -> Result<Self> {
        let key = key.into();
        let value = value.into();
        if key == FALLBACK_PARENT_TYPE_PARAMETER {
            self.check_fallback_parent_type(&value)?;
        }
        let mut reference = self.clone();
        reference.parameters.insert(key, value);
        Ok(reference)
    }

    pub fn without_parameter(&self, key: &str) -> Self {
        let mut reference = self.clone();
        reference.parameters.remove(key);
        reference
    }

    /// Locale parameter, if one was set.
    pub fn locale(&self) -> Option<&Locale> {
        self.parameters.get(LOCALE_PARAMETER).and_then(ParameterValue::as_locale)
    }

    /// Copy of this reference with the locale replaced (or removed with `None`).
    pub fn with_locale(&self, locale: Option<Locale>) -> Self {
        let mut reference = self.clone();
        match locale {
            Some(locale) => {
                reference
                    .parameters
                    .insert(LOCALE_PARAMETER.to_string(), ParameterValue::Locale(locale));
            }
            None => {
                reference.parameters.remove(LOCALE_PARAMETER);
            }
        }
        reference
    }

    fn check_fallback_parent_type(&self, value: &ParameterValue) -> Result<()> {
        let allowed = value
            .as_entity_type()
            .is_some_and(|t| self.entity_type.allowed_parents().contains(&t));
        if self.parent.is_some() || !allowed {
            return Err(ReferenceError::DisallowedParentType {
                parent_type: value.to_string(),
                reference: self.to_string(),
            });
        }
        Ok(())
    }

    /// Type of the parent: the actual parent, then the fallback parameter,
    /// then the first allowed parent type.
    pub fn parent_type(&self) -> Option<EntityType> {
        if let Some(parent) = self.parent() {
            return Some(parent.entity_type);
        }
        self.parameters
            .get(FALLBACK_PARENT_TYPE_PARAMETER)
            .and_then(ParameterValue::as_entity_type)
            .or_else(|| self.entity_type.allowed_parents().first().copied())
    }

    /// This reference followed by each of its ancestors.
    pub fn ancestors(&self) -> impl Iterator<Item = &EntityReference> {
        std::iter::successors(Some(self), |reference| reference.parent())
    }

    pub fn root(&self) -> &EntityReference {
        self.ancestors().last().unwrap_or(self)
    }

    /// Number of elements in the chain, this reference included.
    pub fn size(&self) -> usize {
        self.ancestors().count()
    }

    /// The chain ordered from the root down to this reference.
    pub fn reversed_chain(&self) -> Vec<&EntityReference> {
        let mut chain: Vec<&EntityReference> = self.ancestors().collect();
        chain.reverse();
        chain
    }

    /// Closest element of the chain (this reference included) with the given type.
    pub fn extract_reference(&self, entity_type: EntityType) -> Option<&EntityReference> {
        self.ancestors().find(|reference| reference.entity_type == entity_type)
    }

    /// Like [`extract_reference`](Self::extract_reference) but keeps climbing
    /// through consecutive elements of the same type (nested spaces or pages)
    /// and returns the top-most one.
    pub fn extract_first_reference(&self, entity_type: EntityType) -> Option<&EntityReference> {
        let mut found = self.extract_reference(entity_type)?;
        while let Some(parent) = found.parent() {
            if parent.entity_type != entity_type {
                break;
            }
            found = parent;
        }
        Some(found)
    }

    /// Whether `expected` is an ancestor of this reference. `None` asks
    /// whether this reference is a root.
    pub fn has_parent(&self, expected: Option<&EntityReference>) -> bool {
        let Some(expected) = expected else {
            return self.parent.is_none();
        };
        let expected_size = expected.size();
        let mut current = self.parent();
        while let Some(reference) = current {
            if reference.size() <= expected_size {
                return reference == expected;
            }
            current = reference.parent();
        }
        false
    }

    fn reparented(&self, parent: Option<Arc<EntityReference>>) -> Self {
        let mut parameters = self.parameters.clone();
        if parent.is_some() {
            parameters.remove(FALLBACK_PARENT_TYPE_PARAMETER);
        }
        Self {
            name: self.name.clone(),
            entity_type: self.entity_type,
            parent,
            parameters,
        }
    }

    fn substitute(&self, old: &EntityReference, new: &Option<Arc<EntityReference>>) -> Option<Self> {
        let parent = self.parent()?;
        if parent == old {
            Some(self.reparented(new.clone()))
        } else {
            let parent = parent.substitute(old, new)?;
            Some(self.reparented(Some(Arc::new(parent))))
        }
    }

    /// Copy of this reference where the ancestor `old` is replaced by `new`.
    /// Everything below `old` is rebuilt, everything above `new` is `new`'s
    /// own chain.
    pub fn replace_parent(&self, old: &EntityReference, new: Option<EntityReference>) -> Result<Self> {
        self.substitute(old, &new.map(Arc::new))
            .ok_or_else(|| ReferenceError::NotInParentChain {
                old: old.to_string(),
                reference: self.to_string(),
            })
    }

    pub fn replace_direct_parent(&self, new: Option<EntityReference>) -> Self {
        self.reparented(new.map(Arc::new))
    }

    /// Copy of this reference with `parent` attached above its current root.
    pub fn append_parent(&self, parent: EntityReference) -> Self {
        let parent = match self.parent() {
            Some(current) => current.append_parent(parent),
            None => parent,
        };
        self.reparented(Some(Arc::new(parent)))
    }

    /// Copy of this reference with the ancestor `parent` cut out of the chain.
    pub fn remove_parent(&self, parent: &EntityReference) -> Result<Self> {
        self.replace_parent(parent, parent.parent().cloned())
    }

    pub fn remove_parameters(&self, recursive: bool) -> Self {
        let parent = match (&self.parent, recursive) {
            (Some(parent), true) => Some(Arc::new(parent.remove_parameters(true))),
            (parent, _) => parent.clone(),
        };
        Self {
            name: self.name.clone(),
            entity_type: self.entity_type,
            parent,
            parameters: BTreeMap::new(),
        }
    }

    /// Compare name, type and parameters, ignoring parents.
    pub fn equals_non_recursive(&self, other: &EntityReference) -> bool {
        self.name == other.name
            && self.entity_type == other.entity_type
            && self.parameters == other.parameters
    }

    /// Compare both chains element by element up to (and including) the
    /// first element of type `to`.
    pub fn equals_to(&self, other: &EntityReference, to: EntityType) -> bool {
        equal_chains(Some(self), Some(other), to)
    }

    /// Same as [`equals_to`](Self::equals_to) but both chains are first
    /// climbed up to their first element of type `from`.
    pub fn equals_from_to(&self, other: &EntityReference, from: EntityType, to: EntityType) -> bool {
        equal_chains(self.extract_reference(from), other.extract_reference(from), to)
    }
}

fn equal_chains(mut left: Option<&EntityReference>, mut right: Option<&EntityReference>, to: EntityType) -> bool {
    while let (Some(l), Some(r)) = (left, right) {
        if !l.equals_non_recursive(r) {
            return false;
        }
        if l.entity_type == to {
            return true;
        }
        left = l.parent();
        right = r.parent();
    }
    left.is_none() && right.is_none()
}

impl Ord for EntityReference {
    fn cmp(&self, other: &Self) -> Ordering {
        let left = self.reversed_chain();
        let right = other.reversed_chain();

        for (l, r) in left.iter().zip(right.iter()) {
            let ordering = l.name.cmp(&r.name).then_with(|| l.parameters.cmp(&r.parameters));
            if ordering != Ordering::Equal {
                return ordering;
            }
        }

        left.len().cmp(&right.len()).then_with(|| {
            left.iter()
                .map(|r| r.entity_type)
                .cmp(right.iter().map(|r| r.entity_type))
        })
    }
}

impl PartialOrd for EntityReference {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for EntityReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.entity_type.label(), crate::symbol::serialize(self))
    }
}

/// Stable wire form: the serialized chain, the leaf type and the parameters
/// of every level. Ancestor parameters are keyed by their depth, root first.
#[derive(Serialize, Deserialize)]
struct SerializedReference {
    #[serde(rename = "type")]
    entity_type: EntityType,
    reference: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    parameters: BTreeMap<String, ParameterValue>,
    #[serde(default, rename = "ancestorParameters", skip_serializing_if = "BTreeMap::is_empty")]
    ancestor_parameters: BTreeMap<usize, BTreeMap<String, ParameterValue>>,
}

impl Serialize for EntityReference {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let chain = self.reversed_chain();
        let ancestors = chain.split_last().map_or(&[][..], |(_, ancestors)| ancestors);
        SerializedReference {
            entity_type: self.entity_type,
            reference: crate::symbol::serialize(self),
            parameters: self.parameters.clone(),
            ancestor_parameters: ancestors
                .iter()
                .enumerate()
                .filter(|(_, level)| !level.parameters.is_empty())
                .map(|(depth, level)| (depth, level.parameters.clone()))
                .collect(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for EntityReference {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let mut serialized = SerializedReference::deserialize(deserializer)?;
        let resolved = crate::symbol::RELATIVE_RESOLVER
            .resolve(&serialized.reference, serialized.entity_type, None)
            .map_err(serde::de::Error::custom)?;
        if serialized.parameters.is_empty() && serialized.ancestor_parameters.is_empty() {
            return Ok(resolved);
        }

        let chain = resolved.reversed_chain();
        let leaf = chain.len() - 1;
        let mut rebuilt: Option<EntityReference> = None;
        for (depth, level) in chain.iter().enumerate() {
            let parameters = if depth == leaf {
                std::mem::take(&mut serialized.parameters)
            } else {
                serialized.ancestor_parameters.remove(&depth).unwrap_or_default()
            };
            rebuilt = Some(
                EntityReference::with_parameters(level.name.clone(), level.entity_type, rebuilt, parameters)
                    .map_err(serde::de::Error::custom)?,
            );
        }
        rebuilt.ok_or_else(|| serde::de::Error::custom("empty reference chain"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(wiki: &str, space: &str, page: &str) -> EntityReference {
        EntityReference::new(wiki, EntityType::Wiki)
            .and_then(|w| w.child(space, EntityType::Space))
            .and_then(|s| s.child(page, EntityType::Document))
            .unwrap()
    }

    #[test]
    fn test_empty_name_rejected() {
        let err = EntityReference::new("", EntityType::Document).unwrap_err();
        assert_eq!(err.to_string(), "An Entity Reference name cannot be null or empty");
    }

    #[test]
    fn test_structural_equality() {
        assert_eq!(document("wiki", "Space", "Page"), document("wiki", "Space", "Page"));
        assert_ne!(document("wiki", "Space", "Page"), document("wiki2", "Space", "Page"));
        assert_ne!(
            document("wiki", "Space", "Page"),
            document("wiki", "Space", "Page").with_locale(Some(Locale::new("fr")))
        );
    }

    #[test]
    fn test_clone_independence() {
        let original = document("wiki", "Space", "Page");
        let copy = original.with_parameter("key", "value").unwrap();
        assert!(original.parameter("key").is_none());
        assert_eq!(copy.parameter("key"), Some(&ParameterValue::from("value")));
    }

    #[test]
    fn test_chain_navigation() {
        let reference = document("wiki", "Space", "Page");
        assert_eq!(reference.size(), 3);
        assert_eq!(reference.root().name(), "wiki");
        let names: Vec<&str> = reference.reversed_chain().iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["wiki", "Space", "Page"]);
        assert_eq!(reference.extract_reference(EntityType::Space).map(|r| r.name()), Some("Space"));
        assert!(reference.extract_reference(EntityType::Object).is_none());
    }

    #[test]
    fn test_extract_first_reference() {
        let reference = EntityReference::new("wiki", EntityType::Wiki)
            .and_then(|w| w.child("A", EntityType::Space))
            .and_then(|s| s.child("B", EntityType::Space))
            .and_then(|s| s.child("Page", EntityType::Document))
            .unwrap();
        assert_eq!(reference.extract_reference(EntityType::Space).map(|r| r.name()), Some("B"));
        assert_eq!(
            reference.extract_first_reference(EntityType::Space).map(|r| r.name()),
            Some("A")
        );
    }

    #[test]
    fn test_replace_parent() {
        let reference = document("wiki", "Space", "Page");
        let old = reference.root().clone();
        let new = EntityReference::new("other", EntityType::Wiki).unwrap();
        let moved = reference.replace_parent(&old, Some(new)).unwrap();
        assert_eq!(moved, document("other", "Space", "Page"));
        assert_eq!(reference, document("wiki", "Space", "Page"));
    }

    #[test]
    fn test_replace_parent_not_in_chain() {
        let reference = document("wiki", "Space", "Page");
        let stranger = EntityReference::new("stranger", EntityType::Wiki).unwrap();
        let err = reference.replace_parent(&stranger, None).unwrap_err();
        assert_eq!(
            err.to_string(),
            "The old reference [Wiki stranger] does not belong to the parents chain of the reference [Document wiki:Space.Page]"
        );
    }

    #[test]
    fn test_append_and_remove_parent() {
        let local = EntityReference::new("Space", EntityType::Space)
            .and_then(|s| s.child("Page", EntityType::Document))
            .unwrap();
        let wiki = EntityReference::new("wiki", EntityType::Wiki).unwrap();
        let absolute = local.append_parent(wiki.clone());
        assert_eq!(absolute, document("wiki", "Space", "Page"));
        assert_eq!(absolute.remove_parent(&wiki).unwrap(), local);
    }

    #[test]
    fn test_has_parent() {
        let reference = document("wiki", "Space", "Page");
        let wiki = EntityReference::new("wiki", EntityType::Wiki).unwrap();
        let other = EntityReference::new("other", EntityType::Wiki).unwrap();
        assert!(reference.has_parent(Some(&wiki)));
        assert!(!reference.has_parent(Some(&other)));
        assert!(!reference.has_parent(None));
        assert!(wiki.has_parent(None));
    }

    #[test]
    fn test_fallback_parent_type() {
        let page = EntityReference::new("Page", EntityType::Page).unwrap();
        assert_eq!(page.parent_type(), Some(EntityType::Wiki));

        let nested = page
            .with_parameter(FALLBACK_PARENT_TYPE_PARAMETER, EntityType::Page)
            .unwrap();
        assert_eq!(nested.parent_type(), Some(EntityType::Page));

        assert!(matches!(
            page.with_parameter(FALLBACK_PARENT_TYPE_PARAMETER, EntityType::Space),
            Err(ReferenceError::DisallowedParentType { .. })
        ));

        let attached = document("wiki", "Space", "Page");
        assert!(attached
            .with_parameter(FALLBACK_PARENT_TYPE_PARAMETER, EntityType::Space)
            .is_err());
    }

    #[test]
    fn test_locale_absent() {
        let reference = document("wiki", "Space", "Page");
        assert!(reference.locale().is_none());
        let french = reference.with_locale(Some(Locale::new("fr")));
        assert_eq!(french.locale(), Some(&Locale::new("fr")));
        assert!(french.with_locale(None).locale().is_none());
    }

    #[test]
    fn test_ranged_equality() {
        let absolute = document("wiki", "Space", "Page");
        let local = EntityReference::new("Space", EntityType::Space)
            .and_then(|s| s.child("Page", EntityType::Document))
            .unwrap();
        assert!(absolute.equals_to(&local, EntityType::Space));
        assert!(!absolute.equals_to(&local, EntityType::Wiki));
        assert!(absolute.equals_from_to(&document("wiki", "Space", "Other"), EntityType::Space, EntityType::Wiki));
    }

    #[test]
    fn test_ordering_root_first() {
        let mut references = vec![
            document("b", "A", "Page"),
            document("a", "B", "Page"),
            document("a", "A", "Page"),
        ];
        references.sort();
        let printed: Vec<String> = references.iter().map(|r| r.to_string()).collect();
        assert_eq!(
            printed,
            vec!["Document a:A.Page", "Document a:B.Page", "Document b:A.Page"]
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(document("wiki", "space", "page").to_string(), "Document wiki:space.page");
    }

    #[test]
    fn test_serde_round_trip() {
        let reference = document("wiki", "Space", "Page").with_locale(Some(Locale::new("fr")));
        let json = serde_json::to_string(&reference).unwrap();
        let back: EntityReference = serde_json::from_str(&json).unwrap();
        assert_eq!(back, reference);
    }

    #[test]
    fn test_serde_keeps_ancestor_parameters() {
        let space = document("wiki", "Space", "Page")
            .parent()
            .unwrap()
            .with_locale(Some(Locale::new("fr")));
        let reference = space.child("Page", EntityType::Document).unwrap();

        let json = serde_json::to_value(&reference).unwrap();
        assert!(json["ancestorParameters"]["1"]["locale"].is_object());
        assert!(json["ancestorParameters"].get("0").is_none());

        let back: EntityReference = serde_json::from_value(json).unwrap();
        assert_eq!(back, reference);
        assert_eq!(back.parent().and_then(|p| p.locale()), Some(&Locale::new("fr")));
    }
}
