//! CLI command implementations.

pub mod group;
pub mod matching;
pub mod resolve;
pub mod tree;

pub use group::{group, GroupOptions};
pub use matching::match_reference;
pub use resolve::resolve;
pub use tree::print_tree;

use anyhow::{anyhow, Result};
use wikiref_model::EntityType;

/// Split a `TYPE=TEXT` argument.
pub(crate) fn parse_typed(argument: &str) -> Result<(EntityType, &str)> {
    let (entity_type, text) = argument
        .split_once('=')
        .ok_or_else(|| anyhow!("Expected TYPE=TEXT, got [{argument}]"))?;
    Ok((entity_type.parse()?, text))
}
