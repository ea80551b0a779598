//! Group command implementation

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use wikiref_model::{serialize, DocumentReference, EntityType};
use wikiref_notifications::{
    Event, InMemoryEventSource, NotificationFormat, NotificationParameters, NotificationPreference,
    ParametrizedNotificationManager,
};

use crate::output::{print_json, NotificationData};
use crate::settings::Settings;

#[derive(Debug, Clone)]
pub struct GroupOptions {
    pub user: Option<String>,
    pub types: Vec<String>,
    pub limit: usize,
    pub json: bool,
}

/// Run an event file through notification retrieval, as an alert for `user`.
pub fn group(config_path: &Path, events_path: &Path, opts: GroupOptions) -> Result<()> {
    let settings = Settings::load(config_path)?;

    let contents = std::fs::read_to_string(events_path)
        .with_context(|| format!("Failed to read events {}", events_path.display()))?;
    let events: Vec<Event> = serde_json::from_str(&contents).context("Failed to parse events")?;
    info!(count = events.len(), "loaded events");

    let user = opts
        .user
        .as_deref()
        .map(|text| {
            settings
                .resolver()
                .resolve_as::<DocumentReference>(text, EntityType::Document, None)
                .with_context(|| format!("Invalid user [{text}]"))
        })
        .transpose()?;

    let mut types = opts.types.clone();
    if types.is_empty() {
        for event in &events {
            if !types.contains(&event.event_type) {
                types.push(event.event_type.clone());
            }
        }
    }

    let mut parameters = NotificationParameters::new(user, NotificationFormat::Alert, opts.limit);
    parameters.preferences = types
        .into_iter()
        .map(|event_type| NotificationPreference::new(event_type, NotificationFormat::Alert))
        .collect();

    let manager = ParametrizedNotificationManager::new(
        Arc::new(InMemoryEventSource::new(events)),
        settings.notifications.clone(),
    );
    let composites = manager.get_events(&parameters)?;

    if opts.json {
        let data: Vec<NotificationData> = composites.iter().map(NotificationData::new).collect();
        return print_json("events.grouped", data);
    }

    if composites.is_empty() {
        println!("No notifications");
        return Ok(());
    }
    for composite in &composites {
        let location = composite
            .document()
            .map(|d| format!(" on {}", serialize(d)))
            .unwrap_or_default();
        println!(
            "[{}]{location}: {}",
            composite.event_type(),
            composite.event_ids().join(", ")
        );
    }
    Ok(())
}
