//! JSON shapes printed by the commands.

use serde::Serialize;
use wikiref_model::{serialize, EntityReference, EntityReferenceTreeNode};
use wikiref_notifications::CompositeEvent;

pub const SCHEMA_VERSION: &str = "wikiref-v1";

/// Standard envelope for machine-consumable responses.
#[derive(Serialize)]
pub struct Envelope<T> {
    pub schema_version: &'static str,
    pub kind: &'static str,
    pub data: T,
}

pub fn envelope<T>(kind: &'static str, data: T) -> Envelope<T> {
    Envelope {
        schema_version: SCHEMA_VERSION,
        kind,
        data,
    }
}

pub fn print_json<T: Serialize>(kind: &'static str, data: T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(&envelope(kind, data))?;
    println!("{json}");
    Ok(())
}

#[derive(Serialize)]
pub struct ChainEntry {
    #[serde(rename = "type")]
    pub entity_type: String,
    pub name: String,
}

#[derive(Serialize)]
pub struct ResolvedData {
    #[serde(rename = "type")]
    pub entity_type: String,
    pub reference: String,
    pub chain: Vec<ChainEntry>,
}

impl ResolvedData {
    pub fn new(reference: &EntityReference) -> Self {
        Self {
            entity_type: reference.entity_type().to_string(),
            reference: serialize(reference),
            chain: reference
                .reversed_chain()
                .iter()
                .map(|level| ChainEntry {
                    entity_type: level.entity_type().to_string(),
                    name: level.name().to_string(),
                })
                .collect(),
        }
    }
}

#[derive(Serialize)]
pub struct MatchData {
    pub reference: String,
    pub matches: bool,
}

#[derive(Serialize)]
pub struct TreeNodeData {
    #[serde(rename = "type")]
    pub entity_type: String,
    pub name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub locales: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNodeData>,
}

impl TreeNodeData {
    pub fn children_of(node: &EntityReferenceTreeNode) -> Vec<TreeNodeData> {
        node.children()
            .iter()
            .map(|child| TreeNodeData {
                entity_type: child.entity_type().map(|t| t.to_string()).unwrap_or_default(),
                name: child.name().unwrap_or_default().to_string(),
                locales: child.locales().iter().map(|l| l.to_string()).collect(),
                children: Self::children_of(child),
            })
            .collect()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationData {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
    pub similarity_between_events: i32,
    pub events: Vec<String>,
}

impl NotificationData {
    pub fn new(composite: &CompositeEvent) -> Self {
        Self {
            event_type: composite.event_type().to_string(),
            document: composite.document().map(|d| serialize(d)),
            similarity_between_events: composite.similarity_between_events(),
            events: composite.event_ids().into_iter().map(String::from).collect(),
        }
    }
}
