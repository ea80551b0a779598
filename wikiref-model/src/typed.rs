//! Typed references.
//!
//! Each wrapper checks its type and parent constraints once, when it is
//! built from an [`EntityReference`], and then dereferences to the
//! underlying reference. [`TypedReference`] is the closed sum over all of
//! them, dispatching on [`EntityType`].

use crate::error::{ReferenceError, Result};
use crate::reference::EntityReference;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;
use wikiref_types::{EntityType, Locale};

fn expect_type(reference: &EntityReference, label: &'static str, expected: EntityType) -> Result<()> {
    if reference.entity_type() != expected {
        return Err(ReferenceError::InvalidType {
            expected: label,
            actual: reference.entity_type(),
        });
    }
    Ok(())
}

fn invalid_parent(label: &'static str, parent: Option<&EntityReference>) -> ReferenceError {
    ReferenceError::InvalidParent {
        expected: label,
        parent: parent.map_or_else(|| String::from("null"), |p| p.to_string()),
    }
}

/// Check the parent type and hand the parent to `validate` for the rest of
/// the chain.
fn expect_parent(
    reference: &EntityReference,
    label: &'static str,
    validate: impl Fn(&EntityReference) -> Option<Result<()>>,
) -> Result<()> {
    let parent = reference.parent();
    match parent.and_then(&validate) {
        Some(result) => result,
        None => Err(invalid_parent(label, parent)),
    }
}

fn validate_wiki(reference: &EntityReference) -> Result<()> {
    expect_type(reference, "wiki", EntityType::Wiki)?;
    if reference.parent().is_some() {
        return Err(invalid_parent("wiki", reference.parent()));
    }
    Ok(())
}

fn validate_space(reference: &EntityReference) -> Result<()> {
    expect_type(reference, "space", EntityType::Space)?;
    expect_parent(reference, "space", |parent| match parent.entity_type() {
        EntityType::Wiki => Some(validate_wiki(parent)),
        EntityType::Space => Some(validate_space(parent)),
        _ => None,
    })
}

fn validate_document(reference: &EntityReference) -> Result<()> {
    expect_type(reference, "document", EntityType::Document)?;
    expect_parent(reference, "document", |parent| {
        (parent.entity_type() == EntityType::Space).then(|| validate_space(parent))
    })
}

fn validate_document_child(reference: &EntityReference, label: &'static str, expected: EntityType) -> Result<()> {
    expect_type(reference, label, expected)?;
    expect_parent(reference, label, |parent| {
        (parent.entity_type() == EntityType::Document).then(|| validate_document(parent))
    })
}

fn validate_attachment(reference: &EntityReference) -> Result<()> {
    validate_document_child(reference, "attachment", EntityType::Attachment)
}

fn validate_object(reference: &EntityReference) -> Result<()> {
    validate_document_child(reference, "object", EntityType::Object)
}

fn validate_class_property(reference: &EntityReference) -> Result<()> {
    validate_document_child(reference, "class property", EntityType::ClassProperty)
}

fn validate_object_property(reference: &EntityReference) -> Result<()> {
    expect_type(reference, "object property", EntityType::ObjectProperty)?;
    expect_parent(reference, "object property", |parent| {
        (parent.entity_type() == EntityType::Object).then(|| validate_object(parent))
    })
}

fn validate_page(reference: &EntityReference) -> Result<()> {
    expect_type(reference, "page", EntityType::Page)?;
    expect_parent(reference, "page", |parent| match parent.entity_type() {
        EntityType::Wiki => Some(validate_wiki(parent)),
        EntityType::Page => Some(validate_page(parent)),
        _ => None,
    })
}

fn validate_page_child(reference: &EntityReference, label: &'static str, expected: EntityType) -> Result<()> {
    expect_type(reference, label, expected)?;
    expect_parent(reference, label, |parent| {
        (parent.entity_type() == EntityType::Page).then(|| validate_page(parent))
    })
}

fn validate_page_attachment(reference: &EntityReference) -> Result<()> {
    validate_page_child(reference, "page attachment", EntityType::PageAttachment)
}

fn validate_page_object(reference: &EntityReference) -> Result<()> {
    validate_page_child(reference, "page object", EntityType::PageObject)
}

fn validate_page_class_property(reference: &EntityReference) -> Result<()> {
    validate_page_child(reference, "page class property", EntityType::PageClassProperty)
}

fn validate_page_object_property(reference: &EntityReference) -> Result<()> {
    expect_type(reference, "page object property", EntityType::PageObjectProperty)?;
    expect_parent(reference, "page object property", |parent| {
        (parent.entity_type() == EntityType::PageObject).then(|| validate_page_object(parent))
    })
}

fn validate_local_space(reference: &EntityReference) -> Result<()> {
    expect_type(reference, "local space", EntityType::Space)?;
    match reference.parent() {
        None => Ok(()),
        Some(parent) if parent.entity_type() == EntityType::Space => validate_local_space(parent),
        Some(parent) => Err(invalid_parent("local space", Some(parent))),
    }
}

fn validate_local_document(reference: &EntityReference) -> Result<()> {
    expect_type(reference, "local document", EntityType::Document)?;
    expect_parent(reference, "local document", |parent| {
        (parent.entity_type() == EntityType::Space).then(|| validate_local_space(parent))
    })
}

fn validate_local_page(reference: &EntityReference) -> Result<()> {
    expect_type(reference, "local page", EntityType::Page)?;
    match reference.parent() {
        None => Ok(()),
        Some(parent) if parent.entity_type() == EntityType::Page => validate_local_page(parent),
        Some(parent) => Err(invalid_parent("local page", Some(parent))),
    }
}

macro_rules! typed_reference {
    ($(#[$meta:meta])* $name:ident, $validate:path) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "EntityReference", into = "EntityReference")]
        pub struct $name(EntityReference);

        impl $name {
            /// Wrap a reference already known to satisfy the constraints.
            #[allow(dead_code)]
            fn unchecked(reference: EntityReference) -> Self {
                Self(reference)
            }

            pub fn reference(&self) -> &EntityReference {
                &self.0
            }

            pub fn into_inner(self) -> EntityReference {
                self.0
            }
        }

        impl TryFrom<EntityReference> for $name {
            type Error = ReferenceError;

            fn try_from(reference: EntityReference) -> Result<Self> {
                $validate(&reference)?;
                Ok(Self(reference))
            }
        }

        impl TryFrom<&EntityReference> for $name {
            type Error = ReferenceError;

            fn try_from(reference: &EntityReference) -> Result<Self> {
                Self::try_from(reference.clone())
            }
        }

        impl From<$name> for EntityReference {
            fn from(reference: $name) -> Self {
                reference.0
            }
        }

        impl Deref for $name {
            type Target = EntityReference;

            fn deref(&self) -> &EntityReference {
                &self.0
            }
        }

        impl AsRef<EntityReference> for $name {
            fn as_ref(&self) -> &EntityReference {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

typed_reference!(
    /// Root of the hierarchy.
    WikiReference,
    validate_wiki
);
typed_reference!(
    /// A space, nested under a wiki or another space.
    SpaceReference,
    validate_space
);
typed_reference!(DocumentReference, validate_document);
typed_reference!(AttachmentReference, validate_attachment);
typed_reference!(ObjectReference, validate_object);
typed_reference!(ObjectPropertyReference, validate_object_property);
typed_reference!(ClassPropertyReference, validate_class_property);
typed_reference!(
    /// A page, nested under a wiki or another page.
    PageReference,
    validate_page
);
typed_reference!(PageAttachmentReference, validate_page_attachment);
typed_reference!(PageObjectReference, validate_page_object);
typed_reference!(PageObjectPropertyReference, validate_page_object_property);
typed_reference!(PageClassPropertyReference, validate_page_class_property);
typed_reference!(
    /// A document addressed without its wiki: the chain starts at a space.
    LocalDocumentReference,
    validate_local_document
);
typed_reference!(
    /// A page addressed without its wiki.
    LocalPageReference,
    validate_local_page
);

fn space_chain(parent: EntityReference, spaces: &[&str]) -> Result<EntityReference> {
    if spaces.is_empty() {
        return Err(ReferenceError::EmptyName);
    }
    spaces
        .iter()
        .try_fold(parent, |parent, space| parent.child(*space, EntityType::Space))
}

/// Every space of a chain, root first.
fn spaces_of(reference: &EntityReference) -> Vec<SpaceReference> {
    reference
        .reversed_chain()
        .into_iter()
        .filter(|r| r.entity_type() == EntityType::Space)
        .map(|r| SpaceReference::unchecked(r.clone()))
        .collect()
}

fn parent_of(reference: &EntityReference) -> EntityReference {
    reference.parent().cloned().unwrap_or_else(|| reference.clone())
}

impl WikiReference {
    pub fn new(name: impl Into<String>) -> Result<Self> {
        Ok(Self(EntityReference::new(name, EntityType::Wiki)?))
    }
}

impl SpaceReference {
    /// Space directly under a wiki or a space.
    pub fn new(name: impl Into<String>, parent: impl Into<EntityReference>) -> Result<Self> {
        Self::try_from(EntityReference::with_parent(name, EntityType::Space, Some(parent.into()))?)
    }

    /// Nested spaces under a wiki, outermost first.
    pub fn from_path(wiki: &str, spaces: &[&str]) -> Result<Self> {
        Self::try_from(space_chain(EntityReference::new(wiki, EntityType::Wiki)?, spaces)?)
    }

    pub fn wiki_reference(&self) -> WikiReference {
        WikiReference::unchecked(self.root().clone())
    }

    pub fn replace_wiki(&self, wiki: WikiReference) -> Result<Self> {
        Self::try_from(self.replace_parent(self.root(), Some(wiki.into_inner()))?)
    }
}

impl DocumentReference {
    pub fn new(wiki: &str, space: &str, page: &str) -> Result<Self> {
        Self::with_spaces(wiki, &[space], page)
    }

    pub fn with_spaces(wiki: &str, spaces: &[&str], page: &str) -> Result<Self> {
        let parent = space_chain(EntityReference::new(wiki, EntityType::Wiki)?, spaces)?;
        Self::try_from(parent.child(page, EntityType::Document)?)
    }

    pub fn from_space(name: impl Into<String>, space: SpaceReference) -> Result<Self> {
        Self::try_from(EntityReference::with_parent(
            name,
            EntityType::Document,
            Some(space.into_inner()),
        )?)
    }

    /// Attach a local document to a wiki.
    pub fn from_local(local: &LocalDocumentReference, wiki: WikiReference) -> Result<Self> {
        Self::try_from(local.append_parent(wiki.into_inner()))
    }

    pub fn wiki_reference(&self) -> WikiReference {
        WikiReference::unchecked(self.root().clone())
    }

    pub fn space_references(&self) -> Vec<SpaceReference> {
        spaces_of(self)
    }

    pub fn last_space_reference(&self) -> SpaceReference {
        SpaceReference::unchecked(parent_of(self))
    }

    pub fn replace_wiki(&self, wiki: WikiReference) -> Result<Self> {
        Self::try_from(self.replace_parent(self.root(), Some(wiki.into_inner()))?)
    }

    /// The same document without its wiki.
    pub fn local_document_reference(&self) -> Result<LocalDocumentReference> {
        LocalDocumentReference::try_from(self.remove_parent(self.root())?)
    }
}

impl AttachmentReference {
    pub fn new(name: impl Into<String>, document: DocumentReference) -> Result<Self> {
        Self::try_from(document.into_inner().child(name, EntityType::Attachment)?)
    }

    pub fn document_reference(&self) -> DocumentReference {
        DocumentReference::unchecked(parent_of(self))
    }
}

impl ObjectReference {
    pub fn new(name: impl Into<String>, document: DocumentReference) -> Result<Self> {
        Self::try_from(document.into_inner().child(name, EntityType::Object)?)
    }

    pub fn document_reference(&self) -> DocumentReference {
        DocumentReference::unchecked(parent_of(self))
    }
}

impl ObjectPropertyReference {
    pub fn new(name: impl Into<String>, object: ObjectReference) -> Result<Self> {
        Self::try_from(object.into_inner().child(name, EntityType::ObjectProperty)?)
    }

    pub fn object_reference(&self) -> ObjectReference {
        ObjectReference::unchecked(parent_of(self))
    }

    pub fn document_reference(&self) -> DocumentReference {
        self.object_reference().document_reference()
    }
}

impl ClassPropertyReference {
    pub fn new(name: impl Into<String>, document: DocumentReference) -> Result<Self> {
        Self::try_from(document.into_inner().child(name, EntityType::ClassProperty)?)
    }

    pub fn document_reference(&self) -> DocumentReference {
        DocumentReference::unchecked(parent_of(self))
    }
}

impl PageReference {
    /// Nested pages under a wiki, outermost first.
    pub fn new(wiki: &str, pages: &[&str]) -> Result<Self> {
        if pages.is_empty() {
            return Err(ReferenceError::EmptyName);
        }
        let reference = pages
            .iter()
            .try_fold(EntityReference::new(wiki, EntityType::Wiki)?, |parent, page| {
                parent.child(*page, EntityType::Page)
            })?;
        Self::try_from(reference)
    }

    /// Page directly under a wiki or a page.
    pub fn from_parent(name: impl Into<String>, parent: impl Into<EntityReference>) -> Result<Self> {
        Self::try_from(EntityReference::with_parent(name, EntityType::Page, Some(parent.into()))?)
    }

    pub fn wiki_reference(&self) -> WikiReference {
        WikiReference::unchecked(self.root().clone())
    }

    pub fn replace_wiki(&self, wiki: WikiReference) -> Result<Self> {
        Self::try_from(self.replace_parent(self.root(), Some(wiki.into_inner()))?)
    }

    /// The same page without its wiki.
    pub fn local_page_reference(&self) -> Result<LocalPageReference> {
        LocalPageReference::try_from(self.remove_parent(self.root())?)
    }
}

impl PageAttachmentReference {
    pub fn new(name: impl Into<String>, page: PageReference) -> Result<Self> {
        Self::try_from(page.into_inner().child(name, EntityType::PageAttachment)?)
    }

    pub fn page_reference(&self) -> PageReference {
        PageReference::unchecked(parent_of(self))
    }
}

impl PageObjectReference {
    pub fn new(name: impl Into<String>, page: PageReference) -> Result<Self> {
        Self::try_from(page.into_inner().child(name, EntityType::PageObject)?)
    }

    pub fn page_reference(&self) -> PageReference {
        PageReference::unchecked(parent_of(self))
    }
}

impl PageObjectPropertyReference {
    pub fn new(name: impl Into<String>, object: PageObjectReference) -> Result<Self> {
        Self::try_from(object.into_inner().child(name, EntityType::PageObjectProperty)?)
    }

    pub fn object_reference(&self) -> PageObjectReference {
        PageObjectReference::unchecked(parent_of(self))
    }

    pub fn page_reference(&self) -> PageReference {
        self.object_reference().page_reference()
    }
}

impl PageClassPropertyReference {
    pub fn new(name: impl Into<String>, page: PageReference) -> Result<Self> {
        Self::try_from(page.into_inner().child(name, EntityType::PageClassProperty)?)
    }

    pub fn page_reference(&self) -> PageReference {
        PageReference::unchecked(parent_of(self))
    }
}

impl LocalDocumentReference {
    pub fn new(space: &str, page: &str) -> Result<Self> {
        Self::with_spaces(&[space], page)
    }

    pub fn with_spaces(spaces: &[&str], page: &str) -> Result<Self> {
        let (first, rest) = spaces.split_first().ok_or(ReferenceError::EmptyName)?;
        let root = EntityReference::new(*first, EntityType::Space)?;
        let parent = rest
            .iter()
            .try_fold(root, |parent, space| parent.child(*space, EntityType::Space))?;
        Self::try_from(parent.child(page, EntityType::Document)?)
    }

    /// Spaces of the chain, root first. They carry no wiki, so they stay
    /// plain references.
    pub fn space_references(&self) -> Vec<EntityReference> {
        self.reversed_chain()
            .into_iter()
            .filter(|r| r.entity_type() == EntityType::Space)
            .cloned()
            .collect()
    }
}

impl LocalPageReference {
    pub fn new(pages: &[&str]) -> Result<Self> {
        let (first, rest) = pages.split_first().ok_or(ReferenceError::EmptyName)?;
        let root = EntityReference::new(*first, EntityType::Page)?;
        let reference = rest
            .iter()
            .try_fold(root, |parent, page| parent.child(*page, EntityType::Page))?;
        Self::try_from(reference)
    }
}

/// References carrying a locale parameter.
pub trait LocalizedReference: Deref<Target = EntityReference> + Sized {
    fn locale(&self) -> Option<&Locale> {
        self.deref().locale()
    }

    /// Copy with the locale replaced; `None` removes it.
    fn with_locale(&self, locale: Option<Locale>) -> Self;
}

macro_rules! localized_reference {
    ($($name:ident),*) => {
        $(
            impl LocalizedReference for $name {
                fn with_locale(&self, locale: Option<Locale>) -> Self {
                    Self::unchecked(self.0.with_locale(locale))
                }
            }
        )*
    };
}

localized_reference!(DocumentReference, PageReference, LocalDocumentReference, LocalPageReference);

/// Any absolute reference, validated according to its type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypedReference {
    Wiki(WikiReference),
    Space(SpaceReference),
    Document(DocumentReference),
    Attachment(AttachmentReference),
    Object(ObjectReference),
    ObjectProperty(ObjectPropertyReference),
    ClassProperty(ClassPropertyReference),
    Page(PageReference),
    PageAttachment(PageAttachmentReference),
    PageObject(PageObjectReference),
    PageObjectProperty(PageObjectPropertyReference),
    PageClassProperty(PageClassPropertyReference),
}

impl TypedReference {
    pub fn reference(&self) -> &EntityReference {
        match self {
            TypedReference::Wiki(r) => r,
            TypedReference::Space(r) => r,
            TypedReference::Document(r) => r,
            TypedReference::Attachment(r) => r,
            TypedReference::Object(r) => r,
            TypedReference::ObjectProperty(r) => r,
            TypedReference::ClassProperty(r) => r,
            TypedReference::Page(r) => r,
            TypedReference::PageAttachment(r) => r,
            TypedReference::PageObject(r) => r,
            TypedReference::PageObjectProperty(r) => r,
            TypedReference::PageClassProperty(r) => r,
        }
    }

    pub fn entity_type(&self) -> EntityType {
        self.reference().entity_type()
    }

    /// The wiki every absolute reference hangs from.
    pub fn wiki_reference(&self) -> WikiReference {
        WikiReference::unchecked(self.reference().root().clone())
    }
}

impl TryFrom<EntityReference> for TypedReference {
    type Error = ReferenceError;

    fn try_from(reference: EntityReference) -> Result<Self> {
        Ok(match reference.entity_type() {
            EntityType::Wiki => TypedReference::Wiki(reference.try_into()?),
            EntityType::Space => TypedReference::Space(reference.try_into()?),
            EntityType::Document => TypedReference::Document(reference.try_into()?),
            EntityType::Attachment => TypedReference::Attachment(reference.try_into()?),
            EntityType::Object => TypedReference::Object(reference.try_into()?),
            EntityType::ObjectProperty => TypedReference::ObjectProperty(reference.try_into()?),
            EntityType::ClassProperty => TypedReference::ClassProperty(reference.try_into()?),
            EntityType::Page => TypedReference::Page(reference.try_into()?),
            EntityType::PageAttachment => TypedReference::PageAttachment(reference.try_into()?),
            EntityType::PageObject => TypedReference::PageObject(reference.try_into()?),
            EntityType::PageObjectProperty => {
                TypedReference::PageObjectProperty(reference.try_into()?)
            }
            EntityType::PageClassProperty => {
                TypedReference::PageClassProperty(reference.try_into()?)
            }
        })
    }
}

impl From<TypedReference> for EntityReference {
    fn from(reference: TypedReference) -> Self {
        reference.reference().clone()
    }
}

impl fmt::Display for TypedReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.reference().fmt(f)
    }
}
