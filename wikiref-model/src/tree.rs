//! Tree view over a flat collection of references.

use crate::error::{ReferenceError, Result};
use crate::reference::EntityReference;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;
use tracing::warn;
use wikiref_types::{EntityType, Locale};

/// Ordering used between sibling names.
pub type NameComparator = Arc<dyn Fn(&str, &str) -> Ordering + Send + Sync>;

fn default_comparator() -> NameComparator {
    Arc::new(|left: &str, right: &str| left.cmp(right))
}

/// A node of an [`EntityReferenceTree`]. Children are kept sorted by name
/// (with the configured comparator) and then by type, so a nested space and
/// a document with the same name are distinct children.
pub struct EntityReferenceTreeNode {
    reference: Option<EntityReference>,
    depth: usize,
    children: Vec<EntityReferenceTreeNode>,
    locales: BTreeSet<Locale>,
    comparator: NameComparator,
}

impl EntityReferenceTreeNode {
    fn new(reference: Option<EntityReference>, depth: usize, comparator: NameComparator) -> Self {
        Self {
            reference,
            depth,
            children: Vec::new(),
            locales: BTreeSet::new(),
            comparator,
        }
    }

    fn position(&self, name: &str, entity_type: EntityType) -> std::result::Result<usize, usize> {
        self.children.binary_search_by(|child| {
            let child_reference = child.reference.as_ref();
            let child_name = child_reference.map_or("", |r| r.name());
            (self.comparator)(child_name, name).then_with(|| {
                child_reference
                    .map(|r| r.entity_type())
                    .cmp(&Some(entity_type))
            })
        })
    }

    fn add_child(&mut self, chain: &[&EntityReference]) {
        let Some(element) = chain.get(self.depth) else {
            return;
        };
        let index = match self.position(element.name(), element.entity_type()) {
            Ok(index) => index,
            Err(index) => {
                let snapshot = element.remove_parameters(true);
                let node = EntityReferenceTreeNode::new(
                    Some(snapshot),
                    self.depth + 1,
                    Arc::clone(&self.comparator),
                );
                self.children.insert(index, node);
                index
            }
        };

        let child = &mut self.children[index];
        if chain.len() > child.depth {
            child.add_child(chain);
        } else if let Some(locale) = element.locale() {
            child.locales.insert(locale.clone());
        }
    }

    /// Reference of this node, without parameters. `None` for the tree root.
    pub fn reference(&self) -> Option<&EntityReference> {
        self.reference.as_ref()
    }

    pub fn name(&self) -> Option<&str> {
        self.reference.as_ref().map(|r| r.name())
    }

    pub fn entity_type(&self) -> Option<EntityType> {
        self.reference.as_ref().map(|r| r.entity_type())
    }

    /// Number of chain elements down to this node.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Locales added for this exact reference.
    pub fn locales(&self) -> &BTreeSet<Locale> {
        &self.locales
    }

    pub fn children(&self) -> &[EntityReferenceTreeNode] {
        &self.children
    }

    pub fn children_by_type(&self, entity_type: EntityType) -> Vec<&EntityReferenceTreeNode> {
        self.children
            .iter()
            .filter(|child| child.entity_type() == Some(entity_type))
            .collect()
    }

    /// First child with the given name, whatever its type.
    pub fn get(&self, name: &str) -> Option<&EntityReferenceTreeNode> {
        self.children
            .iter()
            .find(|child| (self.comparator)(child.name().unwrap_or(""), name) == Ordering::Equal)
    }

    pub fn get_typed(&self, name: &str, entity_type: EntityType) -> Option<&EntityReferenceTreeNode> {
        self.position(name, entity_type)
            .ok()
            .map(|index| &self.children[index])
    }

    /// All nodes below this one, depth first.
    pub fn descendants(&self) -> Vec<&EntityReferenceTreeNode> {
        let mut nodes = Vec::new();
        for child in &self.children {
            nodes.push(child);
            nodes.extend(child.descendants());
        }
        nodes
    }
}

impl fmt::Debug for EntityReferenceTreeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityReferenceTreeNode")
            .field("reference", &self.reference)
            .field("locales", &self.locales)
            .field("children", &self.children)
            .finish()
    }
}

/// Tree grouping references by their shared prefixes.
///
/// All references must start at the same level (same root type); building
/// a tree from, say, absolute and local documents fails.
#[derive(Debug)]
pub struct EntityReferenceTree {
    root: EntityReferenceTreeNode,
}

impl EntityReferenceTree {
    pub fn new<'a, I>(references: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a EntityReference>,
    {
        Self::with_comparator(default_comparator(), references)
    }

    pub fn with_comparator<'a, I>(comparator: NameComparator, references: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a EntityReference>,
    {
        let mut root = EntityReferenceTreeNode::new(None, 0, comparator);
        let mut root_type: Option<EntityType> = None;

        for reference in references {
            let actual = reference.root().entity_type();
            match root_type {
                Some(expected) if expected != actual => {
                    warn!(reference = %reference, "Reference does not start at the tree level");
                    return Err(ReferenceError::MixedTreeRoots { expected, actual });
                }
                _ => root_type = Some(actual),
            }
            root.add_child(&reference.reversed_chain());
        }

        Ok(Self { root })
    }

    pub fn root(&self) -> &EntityReferenceTreeNode {
        &self.root
    }
}

impl Deref for EntityReferenceTree {
    type Target = EntityReferenceTreeNode;

    fn deref(&self) -> &EntityReferenceTreeNode {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typed::{DocumentReference, LocalDocumentReference};

    fn names(node: &EntityReferenceTreeNode) -> Vec<&str> {
        node.children().iter().filter_map(|c| c.name()).collect()
    }

    #[test]
    fn test_groups_by_prefix() {
        let references = [
            DocumentReference::new("w1", "A", "Page2").unwrap(),
            DocumentReference::new("w1", "B", "Page1").unwrap(),
            DocumentReference::new("w1", "A", "Page1").unwrap(),
        ];
        let tree = EntityReferenceTree::new(references.iter().map(|r| r.reference())).unwrap();

        assert_eq!(names(&tree), vec!["w1"]);
        let wiki = tree.get("w1").unwrap();
        assert_eq!(names(wiki), vec!["A", "B"]);
        assert_eq!(names(wiki.get("A").unwrap()), vec!["Page1", "Page2"]);
        assert_eq!(names(wiki.get("B").unwrap()), vec!["Page1"]);
        assert_eq!(tree.descendants().len(), 6);
    }

    #[test]
    fn test_space_and_document_with_same_name() {
        let references = [
            DocumentReference::with_spaces("w1", &["A"], "B").unwrap(),
            DocumentReference::with_spaces("w1", &["A", "B"], "WebHome").unwrap(),
        ];
        let tree = EntityReferenceTree::new(references.iter().map(|r| r.reference())).unwrap();
        let space = tree.get("w1").and_then(|w| w.get("A")).unwrap();
        assert_eq!(space.children().len(), 2);
        assert!(space.get_typed("B", EntityType::Document).is_some());
        assert!(space.get_typed("B", EntityType::Space).is_some());
        assert_eq!(space.children_by_type(EntityType::Space).len(), 1);
    }

    #[test]
    fn test_locales_registered_on_node() {
        let page = DocumentReference::new("w1", "A", "Page").unwrap();
        let french = page.with_locale(Some(Locale::new("fr")));
        let german = page.with_locale(Some(Locale::new("de")));
        let tree = EntityReferenceTree::new([&french, &german, page.reference()]).unwrap();

        let node = tree
            .get("w1")
            .and_then(|w| w.get("A"))
            .and_then(|s| s.get("Page"))
            .unwrap();
        let locales: Vec<&str> = node.locales().iter().map(|l| l.as_str()).collect();
        assert_eq!(locales, vec!["de", "fr"]);
        assert!(node.reference().unwrap().locale().is_none());
    }

    #[test]
    fn test_mixed_roots_rejected() {
        let absolute = DocumentReference::new("w1", "A", "Page").unwrap();
        let local = LocalDocumentReference::new("A", "Page").unwrap();
        let result = EntityReferenceTree::new([absolute.reference(), local.reference()]);
        assert!(matches!(result, Err(ReferenceError::MixedTreeRoots { .. })));
    }

    #[test]
    fn test_custom_comparator() {
        let references = [
            DocumentReference::new("w1", "b", "Page").unwrap(),
            DocumentReference::new("w1", "A", "Page").unwrap(),
        ];
        let comparator: NameComparator =
            Arc::new(|l: &str, r: &str| l.to_lowercase().cmp(&r.to_lowercase()));
        let tree = EntityReferenceTree::with_comparator(
            comparator,
            references.iter().map(|r| r.reference()),
        )
        .unwrap();
        assert_eq!(names(tree.get("w1").unwrap()), vec!["A", "b"]);
        assert!(tree.get("w1").and_then(|w| w.get("B")).is_some());
    }
}
