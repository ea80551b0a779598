//! Resolve command implementation

use anyhow::{Context, Result};
use std::path::Path;
use wikiref_model::EntityType;

use super::parse_typed;
use crate::output::{print_json, ResolvedData};
use crate::settings::Settings;

pub fn resolve(config_path: &Path, entity_type: EntityType, text: &str, base: Option<&str>, json: bool) -> Result<()> {
    let settings = Settings::load(config_path)?;
    let resolver = settings.resolver();

    let base = base
        .map(|argument| {
            let (base_type, base_text) = parse_typed(argument)?;
            resolver
                .resolve(base_text, base_type, None)
                .with_context(|| format!("Invalid base reference [{argument}]"))
        })
        .transpose()?;

    let reference = resolver
        .resolve(text, entity_type, base.as_ref())
        .with_context(|| format!("Failed to resolve [{text}] as {entity_type}"))?;

    if json {
        return print_json("reference.resolved", ResolvedData::new(&reference));
    }

    println!("{reference}");
    for level in reference.reversed_chain() {
        println!("  {:<12} {}", level.entity_type().lower_case(), level.name());
    }
    Ok(())
}
