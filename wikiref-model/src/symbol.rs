//! String form of references.
//!
//! Each (parent type, child type) pair has a separator character. Names are
//! escaped with `\` so that a name may contain the separators of its own
//! level, e.g. `wiki:Space\.With\.Dots.Page`.

use crate::config::ModelConfig;
use crate::error::{ReferenceError, Result};
use crate::reference::EntityReference;
use once_cell::sync::Lazy;
use wikiref_types::EntityType;

pub const ESCAPE: char = '\\';

/// Separators that may precede a name of `entity_type`, with the parent
/// type each one introduces.
pub fn parent_separators(entity_type: EntityType) -> &'static [(EntityType, char)] {
    match entity_type {
        EntityType::Wiki => &[],
        EntityType::Space => &[(EntityType::Wiki, ':'), (EntityType::Space, '.')],
        EntityType::Document => &[(EntityType::Space, '.')],
        EntityType::Attachment => &[(EntityType::Document, '@')],
        EntityType::Object | EntityType::ClassProperty => &[(EntityType::Document, '^')],
        EntityType::ObjectProperty => &[(EntityType::Object, '.')],
        EntityType::Page => &[(EntityType::Wiki, ':'), (EntityType::Page, '/')],
        EntityType::PageAttachment => &[(EntityType::Page, '@')],
        EntityType::PageObject | EntityType::PageClassProperty => &[(EntityType::Page, '^')],
        EntityType::PageObjectProperty => &[(EntityType::PageObject, '.')],
    }
}

fn separator(parent: EntityType, child: EntityType) -> Option<char> {
    parent_separators(child)
        .iter()
        .find(|(t, _)| *t == parent)
        .map(|(_, c)| *c)
}

fn escape_into(out: &mut String, name: &str, entity_type: EntityType) {
    let separators = parent_separators(entity_type);
    for c in name.chars() {
        if c == ESCAPE || separators.iter().any(|(_, s)| *s == c) {
            out.push(ESCAPE);
        }
        out.push(c);
    }
}

/// Serialize the whole chain, root first. Parameters are not part of the
/// string form.
pub fn serialize(reference: &EntityReference) -> String {
    let mut out = String::new();
    let mut previous: Option<EntityType> = None;
    for element in reference.reversed_chain() {
        if let Some(parent_type) = previous {
            // Chains built by hand may pair types that have no separator.
            out.push(separator(parent_type, element.entity_type()).unwrap_or('.'));
        }
        escape_into(&mut out, element.name(), element.entity_type());
        previous = Some(element.entity_type());
    }
    out
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == ESCAPE {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

fn is_escaped(text: &str, index: usize) -> bool {
    let backslashes = text[..index]
        .chars()
        .rev()
        .take_while(|c| *c == ESCAPE)
        .count();
    backslashes % 2 == 1
}

/// Byte index and parent type of the right-most unescaped separator.
fn last_separator(text: &str, entity_type: EntityType) -> Option<(usize, EntityType)> {
    let separators = parent_separators(entity_type);
    text.char_indices().rev().find_map(|(index, c)| {
        separators
            .iter()
            .find(|(_, s)| *s == c)
            .filter(|_| !is_escaped(text, index))
            .map(|(parent_type, _)| (index, *parent_type))
    })
}

/// Resolver with the built-in default names.
pub static DEFAULT_RESOLVER: Lazy<SymbolResolver> = Lazy::new(SymbolResolver::default);

/// Resolver that never fills in missing levels.
pub static RELATIVE_RESOLVER: Lazy<SymbolResolver> = Lazy::new(SymbolResolver::relative);

/// Parses the string form back into a reference.
#[derive(Debug, Clone)]
pub struct SymbolResolver {
    config: ModelConfig,
    fill_missing: bool,
}

impl Default for SymbolResolver {
    fn default() -> Self {
        Self::new(ModelConfig::default())
    }
}

impl SymbolResolver {
    /// Resolver completing missing levels from the base reference and the
    /// configured default names.
    pub fn new(config: ModelConfig) -> Self {
        Self {
            config,
            fill_missing: true,
        }
    }

    /// Resolver keeping only what the text contains. `space.page` resolves
    /// to a document whose chain stops at the space.
    pub fn relative() -> Self {
        Self {
            config: ModelConfig::default(),
            fill_missing: false,
        }
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    fn element_name(
        &self,
        raw: &str,
        entity_type: EntityType,
        base: Option<&EntityReference>,
    ) -> Result<String> {
        let name = unescape(raw);
        if !name.is_empty() {
            return Ok(name);
        }
        if !self.fill_missing {
            return Err(ReferenceError::EmptyName);
        }
        Ok(base
            .and_then(|b| b.extract_reference(entity_type))
            .map(|r| r.name().to_string())
            .unwrap_or_else(|| self.config.default_name(entity_type).to_string()))
    }

    pub fn resolve(
        &self,
        text: &str,
        entity_type: EntityType,
        base: Option<&EntityReference>,
    ) -> Result<EntityReference> {
        // Leaf first; rebuilt root first once the text is consumed.
        let mut elements: Vec<(String, EntityType)> = Vec::new();
        let mut top: Option<EntityReference> = None;
        let mut remaining = text;
        let mut current = Some(entity_type);

        while let Some(current_type) = current {
            match last_separator(remaining, current_type) {
                Some((index, parent_type)) => {
                    let raw = &remaining[index + 1..];
                    elements.push((self.element_name(raw, current_type, base)?, current_type));
                    remaining = &remaining[..index];
                    current = Some(parent_type);
                }
                None => {
                    elements.push((self.element_name(remaining, current_type, base)?, current_type));
                    remaining = "";
                    current = None;
                    if self.fill_missing {
                        if let Some(parent_type) = current_type.allowed_parents().first() {
                            match base.and_then(|b| b.extract_reference(*parent_type)) {
                                Some(from_base) => top = Some(from_base.clone()),
                                None => current = Some(*parent_type),
                            }
                        }
                    }
                }
            }
        }

        let mut reference = top;
        for (name, element_type) in elements.into_iter().rev() {
            reference = Some(EntityReference::with_parent(name, element_type, reference)?);
        }
        reference.ok_or(ReferenceError::EmptyName)
    }

    /// Resolve and convert into one of the typed wrappers.
    pub fn resolve_as<T>(&self, text: &str, entity_type: EntityType, base: Option<&EntityReference>) -> Result<T>
    where
        T: TryFrom<EntityReference, Error = ReferenceError>,
    {
        T::try_from(self.resolve(text, entity_type, base)?)
    }
}
