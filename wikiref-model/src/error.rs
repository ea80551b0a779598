//! Error types for the reference model

use thiserror::Error;
use wikiref_types::{EntityType, ParseEntityTypeError};

/// Structural violation raised while building or rewriting a reference.
#[derive(Debug, Error)]
pub enum ReferenceError {
    /// Name was empty
    #[error("An Entity Reference name cannot be null or empty")]
    EmptyName,

    /// Reference has the wrong type for the wrapper it is converted into
    #[error("Invalid type [{actual}] for a {expected} reference")]
    InvalidType {
        expected: &'static str,
        actual: EntityType,
    },

    /// Parent is missing, unexpected or of the wrong type
    #[error("Invalid parent reference [{parent}] in a {expected} reference")]
    InvalidParent {
        expected: &'static str,
        parent: String,
    },

    /// `replace_parent` was given an ancestor that is not in the chain
    #[error("The old reference [{old}] does not belong to the parents chain of the reference [{reference}]")]
    NotInParentChain { old: String, reference: String },

    /// Fallback parent type is not usable for this reference
    #[error("The parent type [{parent_type}] is not allowed for the reference [{reference}]")]
    DisallowedParentType {
        parent_type: String,
        reference: String,
    },

    #[error("Invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error(transparent)]
    UnknownEntityType(#[from] ParseEntityTypeError),

    /// Tree input whose chains do not start at the same level
    #[error("References must share the same root type: expected [{expected}], got [{actual}]")]
    MixedTreeRoots {
        expected: EntityType,
        actual: EntityType,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

/// Result type using ReferenceError
pub type Result<T> = std::result::Result<T, ReferenceError>;
