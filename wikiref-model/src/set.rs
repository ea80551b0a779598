//! Include/exclude rule sets over reference chains.

use crate::reference::EntityReference;
use std::collections::BTreeMap;
use tracing::debug;
use wikiref_types::EntityType;

/// One level of a rule trie. All children of an entry share one type;
/// the `None` key is the wildcard child used to step over a level the
/// rules do not constrain.
#[derive(Debug, Clone, Default)]
struct Entry {
    children_type: Option<EntityType>,
    children: BTreeMap<Option<String>, Entry>,
    terminal: bool,
}

impl Entry {
    fn is_empty(&self) -> bool {
        self.children.is_empty() && !self.terminal
    }

    fn insert(&mut self, chain: &[&EntityReference]) {
        let Some((element, rest)) = chain.split_first() else {
            self.terminal = true;
            return;
        };
        let element_type = element.entity_type();

        match self.children_type {
            Some(children_type) if children_type < element_type => {
                self.children.entry(None).or_default().insert(chain);
                return;
            }
            Some(children_type) if children_type > element_type => {
                debug!(
                    from = %children_type,
                    to = %element_type,
                    "Splitting reference set entry"
                );
                let previous = Entry {
                    children_type: self.children_type.take(),
                    children: std::mem::take(&mut self.children),
                    terminal: false,
                };
                self.children.insert(None, previous);
            }
            _ => {}
        }

        self.children_type = Some(element_type);
        self.children
            .entry(Some(element.name().to_string()))
            .or_default()
            .insert(rest);
    }

    /// Levels whose type the entry does not constrain are skipped, and a
    /// chain that runs out before the rules do still matches.
    fn matches(&self, chain: &[&EntityReference]) -> bool {
        if self.terminal || self.children.is_empty() {
            return true;
        }
        let Some((element, rest)) = chain.split_first() else {
            return true;
        };
        if self.children_type != Some(element.entity_type()) {
            return self.matches(rest);
        }

        let named = self.children.get(&Some(element.name().to_string()));
        let wildcard = self.children.get(&None);
        named.is_some_and(|entry| entry.matches(rest)) || wildcard.is_some_and(|entry| entry.matches(rest))
    }
}

/// A set of references described by what it includes minus what it
/// excludes. Including a reference includes everything below it.
///
/// Rules only need to name the levels they care about: including the space
/// `Blog` alone (no wiki) includes `Blog` in every wiki.
#[derive(Debug, Clone, Default)]
pub struct EntityReferenceSet {
    includes: Entry,
    excludes: Entry,
}

impl EntityReferenceSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn includes(&mut self, reference: &EntityReference) -> &mut Self {
        self.includes.insert(&reference.reversed_chain());
        self
    }

    pub fn excludes(&mut self, reference: &EntityReference) -> &mut Self {
        self.excludes.insert(&reference.reversed_chain());
        self
    }

    /// True when the reference is included (or nothing is explicitly
    /// included) and not excluded.
    pub fn matches(&self, reference: &EntityReference) -> bool {
        let chain = reference.reversed_chain();
        let included = self.includes.is_empty() || self.includes.matches(&chain);
        included && (self.excludes.is_empty() || !self.excludes.matches(&chain))
    }

    pub fn is_empty(&self) -> bool {
        self.includes.is_empty() && self.excludes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typed::{DocumentReference, SpaceReference, WikiReference};

    fn document(wiki: &str, space: &str, page: &str) -> DocumentReference {
        DocumentReference::new(wiki, space, page).unwrap()
    }

    #[test]
    fn test_empty_set_matches_everything() {
        let set = EntityReferenceSet::new();
        assert!(set.is_empty());
        assert!(set.matches(&document("w1", "Space", "Page")));
    }

    #[test]
    fn test_include_minus_exclude() {
        let mut set = EntityReferenceSet::new();
        set.includes(&SpaceReference::new("Blog", WikiReference::new("w1").unwrap()).unwrap())
            .excludes(&document("w1", "Blog", "Secret"));

        assert!(set.matches(&document("w1", "Blog", "Public")));
        assert!(!set.matches(&document("w1", "Blog", "Secret")));
        assert!(!set.matches(&document("w2", "Blog", "Public")));
        assert!(!set.matches(&document("w1", "Other", "Public")));
    }

    #[test]
    fn test_space_rule_without_wiki() {
        let blog = EntityReference::new("Blog", EntityType::Space).unwrap();
        let mut set = EntityReferenceSet::new();
        set.includes(&blog);

        assert!(set.matches(&document("w1", "Blog", "Page")));
        assert!(set.matches(&document("w2", "Blog", "Page")));
        assert!(!set.matches(&document("w2", "News", "Page")));
    }

    #[test]
    fn test_mixed_depth_rules() {
        let mut set = EntityReferenceSet::new();
        set.includes(&document("w1", "Space", "Page"));
        set.includes(&EntityReference::new("Blog", EntityType::Space).unwrap());

        assert!(set.matches(&document("w1", "Space", "Page")));
        assert!(!set.matches(&document("w1", "Space", "Other")));
        assert!(set.matches(&document("w3", "Blog", "Any")));
        assert!(!set.matches(&document("w3", "News", "Any")));
    }

    #[test]
    fn test_exclude_only() {
        let mut set = EntityReferenceSet::new();
        set.excludes(&WikiReference::new("private").unwrap());

        assert!(set.matches(&document("public", "Space", "Page")));
        assert!(!set.matches(&document("private", "Space", "Page")));
    }

    #[test]
    fn test_parent_of_included_reference_matches() {
        let mut set = EntityReferenceSet::new();
        set.includes(&document("w1", "Space", "Page"));

        let space = SpaceReference::new("Space", WikiReference::new("w1").unwrap()).unwrap();
        assert!(set.matches(&space));
        assert!(!set.matches(&SpaceReference::new("Other", WikiReference::new("w1").unwrap()).unwrap()));
    }

    #[test]
    fn test_levels_of_other_types_are_skipped() {
        let mut set = EntityReferenceSet::new();
        set.includes(&document("w1", "Space", "Page"));

        let local = EntityReference::new("Space", EntityType::Space)
            .and_then(|space| space.child("Page", EntityType::Document))
            .unwrap();
        assert!(set.matches(&local));
    }

    #[test]
    fn test_parent_of_excluded_reference_is_excluded() {
        let mut set = EntityReferenceSet::new();
        set.excludes(&document("w1", "Blog", "Secret"));

        let blog = SpaceReference::new("Blog", WikiReference::new("w1").unwrap()).unwrap();
        assert!(!set.matches(&blog));
        assert!(set.matches(&document("w1", "Blog", "Public")));
    }

    #[test]
    fn test_parameters_ignored() {
        let mut set = EntityReferenceSet::new();
        set.includes(&document("w1", "Space", "Page"));
        let french = document("w1", "Space", "Page").with_locale(Some(wikiref_types::Locale::new("fr")));
        assert!(set.matches(&french));
    }
}
