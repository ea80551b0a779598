//! Entity reference model for wikiref.
//!
//! References address every entity of a multi-wiki deployment: wikis,
//! (nested) spaces, documents, their attachments, objects and properties,
//! and the page-based equivalents. This crate provides:
//!
//! - [`EntityReference`]: the immutable, structurally compared node
//! - typed wrappers validating parent constraints ([`DocumentReference`], ...)
//! - patterns matching references with holes ([`RegexEntityReference`],
//!   [`PartialEntityReference`])
//! - [`EntityReferenceSet`] and [`EntityReferenceTree`] aggregations
//! - the string form ([`symbol::serialize`], [`SymbolResolver`])

pub mod config;
pub mod error;
pub mod pattern;
pub mod reference;
pub mod set;
pub mod symbol;
pub mod tree;
pub mod typed;

pub use config::{ConfigError, ModelConfig};
pub use error::{ReferenceError, Result};
pub use pattern::{PartialEntityReference, ReferencePattern, RegexEntityReference};
pub use reference::{EntityReference, FALLBACK_PARENT_TYPE_PARAMETER, LOCALE_PARAMETER};
pub use set::EntityReferenceSet;
pub use symbol::{serialize, SymbolResolver};
pub use tree::{EntityReferenceTree, EntityReferenceTreeNode, NameComparator};
pub use typed::{
    AttachmentReference, ClassPropertyReference, DocumentReference, LocalDocumentReference,
    LocalPageReference, LocalizedReference, ObjectPropertyReference, ObjectReference,
    PageAttachmentReference, PageClassPropertyReference, PageObjectPropertyReference,
    PageObjectReference, PageReference, SpaceReference, TypedReference, WikiReference,
};
pub use wikiref_types::{EntityType, Locale, ParameterValue};
