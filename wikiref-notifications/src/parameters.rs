//! What a user asks for when retrieving notifications.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use wikiref_model::DocumentReference;

use crate::filter::NotificationFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationFormat {
    #[default]
    Alert,
    Email,
}

impl fmt::Display for NotificationFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationFormat::Alert => write!(f, "alert"),
            NotificationFormat::Email => write!(f, "email"),
        }
    }
}

/// A user's subscription to one event type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPreference {
    pub event_type: String,

    #[serde(default)]
    pub format: NotificationFormat,

    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Events older than the subscription are not reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
}

fn default_enabled() -> bool {
    true
}

impl NotificationPreference {
    pub fn new(event_type: impl Into<String>, format: NotificationFormat) -> Self {
        Self {
            event_type: event_type.into(),
            format,
            enabled: true,
            start_date: None,
        }
    }

    pub fn with_start_date(mut self, start_date: DateTime<Utc>) -> Self {
        self.start_date = Some(start_date);
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// Parameters of one retrieval.
#[derive(Clone, Default)]
pub struct NotificationParameters {
    pub user: Option<DocumentReference>,
    pub format: NotificationFormat,
    pub from_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    /// Ids of events the user already dismissed.
    pub blacklist: Vec<String>,
    pub expected_count: usize,
    pub preferences: Vec<NotificationPreference>,
    pub filters: Vec<Arc<dyn NotificationFilter>>,
    /// Overrides the configured default when set.
    pub display_hidden_documents: Option<bool>,
}

impl NotificationParameters {
    pub fn new(user: Option<DocumentReference>, format: NotificationFormat, expected_count: usize) -> Self {
        Self {
            user,
            format,
            expected_count,
            ..Self::default()
        }
    }

    /// Preferences that apply to this retrieval.
    pub fn enabled_preferences(&self) -> impl Iterator<Item = &NotificationPreference> {
        self.preferences
            .iter()
            .filter(move |p| p.enabled && p.format == self.format)
    }
}

impl fmt::Debug for NotificationParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let filters: Vec<&str> = self.filters.iter().map(|filter| filter.name()).collect();
        f.debug_struct("NotificationParameters")
            .field("user", &self.user)
            .field("format", &self.format)
            .field("from_date", &self.from_date)
            .field("end_date", &self.end_date)
            .field("blacklist", &self.blacklist)
            .field("expected_count", &self.expected_count)
            .field("preferences", &self.preferences)
            .field("filters", &filters)
            .field("display_hidden_documents", &self.display_hidden_documents)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enabled_preferences() {
        let mut parameters = NotificationParameters::new(None, NotificationFormat::Alert, 10);
        parameters.preferences = vec![
            NotificationPreference::new("create", NotificationFormat::Alert),
            NotificationPreference::new("update", NotificationFormat::Alert).disabled(),
            NotificationPreference::new("delete", NotificationFormat::Email),
        ];
        let types: Vec<&str> = parameters
            .enabled_preferences()
            .map(|p| p.event_type.as_str())
            .collect();
        assert_eq!(types, vec!["create"]);
    }

    #[test]
    fn test_preference_json() {
        let preference: NotificationPreference =
            serde_json::from_str(r#"{"eventType": "create", "format": "email"}"#).unwrap();
        assert!(preference.enabled);
        assert_eq!(preference.format, NotificationFormat::Email);
        assert_eq!(preference.start_date, None);
    }
}
