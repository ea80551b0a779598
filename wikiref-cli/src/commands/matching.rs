//! Match command implementation

use anyhow::{Context, Result};
use std::path::Path;
use tracing::debug;
use wikiref_model::symbol::RELATIVE_RESOLVER;
use wikiref_model::{serialize, EntityReferenceSet, EntityType};

use super::parse_typed;
use crate::output::{print_json, MatchData};
use crate::settings::Settings;

/// Check a reference against location rules. Rules keep the levels they
/// name: `space=Blog` matches a `Blog` space in every wiki.
pub fn match_reference(
    config_path: &Path,
    entity_type: EntityType,
    text: &str,
    includes: &[String],
    excludes: &[String],
    json: bool,
) -> Result<()> {
    let settings = Settings::load(config_path)?;
    let reference = settings
        .resolver()
        .resolve(text, entity_type, None)
        .with_context(|| format!("Failed to resolve [{text}] as {entity_type}"))?;

    let mut set = EntityReferenceSet::new();
    for rule in includes {
        let (rule_type, rule_text) = parse_typed(rule)?;
        let location = RELATIVE_RESOLVER
            .resolve(rule_text, rule_type, None)
            .with_context(|| format!("Invalid include rule [{rule}]"))?;
        debug!(rule = %location, "include");
        set.includes(&location);
    }
    for rule in excludes {
        let (rule_type, rule_text) = parse_typed(rule)?;
        let location = RELATIVE_RESOLVER
            .resolve(rule_text, rule_type, None)
            .with_context(|| format!("Invalid exclude rule [{rule}]"))?;
        debug!(rule = %location, "exclude");
        set.excludes(&location);
    }

    let matches = set.matches(&reference);
    if json {
        return print_json(
            "reference.matched",
            MatchData {
                reference: serialize(&reference),
                matches,
            },
        );
    }

    if matches {
        println!("match: {reference}");
    } else {
        println!("no match: {reference}");
    }
    Ok(())
}
