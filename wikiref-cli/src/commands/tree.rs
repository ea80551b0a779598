//! Tree command implementation

use anyhow::{Context, Result};
use std::path::Path;
use wikiref_model::{EntityReferenceTree, EntityReferenceTreeNode, EntityType};

use crate::output::{print_json, TreeNodeData};
use crate::settings::Settings;

pub fn print_tree(config_path: &Path, entity_type: EntityType, texts: &[String], json: bool) -> Result<()> {
    let settings = Settings::load(config_path)?;
    let resolver = settings.resolver();

    let references = texts
        .iter()
        .map(|text| {
            resolver
                .resolve(text, entity_type, None)
                .with_context(|| format!("Failed to resolve [{text}] as {entity_type}"))
        })
        .collect::<Result<Vec<_>>>()?;
    let tree = EntityReferenceTree::new(references.iter()).context("Failed to build the reference tree")?;

    if json {
        return print_json("reference.tree", TreeNodeData::children_of(tree.root()));
    }

    print_children(tree.root());
    Ok(())
}

fn print_children(node: &EntityReferenceTreeNode) {
    for child in node.children() {
        let indent = "  ".repeat(child.depth().saturating_sub(1));
        let entity_type = child.entity_type().map(|t| t.lower_case()).unwrap_or_default();
        let locales: Vec<String> = child.locales().iter().map(|l| l.to_string()).collect();
        if locales.is_empty() {
            println!("{indent}{} ({entity_type})", child.name().unwrap_or_default());
        } else {
            println!(
                "{indent}{} ({entity_type}) [{}]",
                child.name().unwrap_or_default(),
                locales.join(", ")
            );
        }
        print_children(child);
    }
}
