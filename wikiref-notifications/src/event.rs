//! Recorded wiki activity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use wikiref_model::{serialize, DocumentReference, SpaceReference, WikiReference};

use crate::query::QueryValue;

/// Something that happened in the wiki, as stored by the event stream.
///
/// Documents and users serialize as their canonical string form so event
/// fixtures stay readable (`"document": "xwiki:Main.WebHome"`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,

    #[serde(rename = "type")]
    pub event_type: String,

    #[serde(default, with = "document_text", skip_serializing_if = "Option::is_none")]
    pub document: Option<DocumentReference>,

    #[serde(default, with = "document_text", skip_serializing_if = "Option::is_none")]
    pub user: Option<DocumentReference>,

    #[serde(default)]
    pub date: DateTime<Utc>,

    #[serde(default)]
    pub hidden: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub importance: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_version: Option<String>,
}

impl Event {
    pub fn new(id: impl Into<String>, event_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            event_type: event_type.into(),
            ..Self::default()
        }
    }

    pub fn with_group_id(mut self, group_id: impl Into<String>) -> Self {
        self.group_id = Some(group_id.into());
        self
    }

    pub fn with_document(mut self, document: DocumentReference) -> Self {
        self.document = Some(document);
        self
    }

    pub fn with_user(mut self, user: DocumentReference) -> Self {
        self.user = Some(user);
        self
    }

    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.date = date;
        self
    }

    pub fn with_hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    pub fn wiki(&self) -> Option<WikiReference> {
        self.document.as_ref().map(|d| d.wiki_reference())
    }

    pub fn space(&self) -> Option<SpaceReference> {
        self.document.as_ref().map(|d| d.last_space_reference())
    }

    /// Value of a stored field, by its event stream name.
    pub fn field(&self, name: &str) -> Option<QueryValue> {
        let text = |value: &Option<String>| value.clone().map(QueryValue::String);
        match name {
            "id" => Some(QueryValue::String(self.id.clone())),
            "groupId" => text(&self.group_id),
            "stream" => text(&self.stream),
            "date" => Some(QueryValue::Date(self.date)),
            "importance" => text(&self.importance),
            "type" => Some(QueryValue::String(self.event_type.clone())),
            "application" => text(&self.application),
            "user" => self.user.as_ref().map(|u| QueryValue::String(serialize(u))),
            "wiki" => self.wiki().map(|w| QueryValue::String(w.name().to_string())),
            "space" => self.space().map(|s| QueryValue::String(serialize(&s))),
            "document" => self.document.as_ref().map(|d| QueryValue::String(serialize(d))),
            "hidden" => Some(QueryValue::Boolean(self.hidden)),
            "url" => text(&self.url),
            "title" => text(&self.title),
            "body" => text(&self.body),
            "documentVersion" => text(&self.document_version),
            _ => None,
        }
    }
}

mod document_text {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};
    use wikiref_model::symbol::DEFAULT_RESOLVER;
    use wikiref_model::{DocumentReference, EntityType};

    pub fn serialize<S: Serializer>(value: &Option<DocumentReference>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(reference) => serializer.serialize_some(&wikiref_model::serialize(reference)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<DocumentReference>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|text| {
                DEFAULT_RESOLVER
                    .resolve_as::<DocumentReference>(&text, EntityType::Document, None)
                    .map_err(D::Error::custom)
            })
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bike() -> DocumentReference {
        DocumentReference::new("xwiki", "Main", "Bike").unwrap()
    }

    #[test]
    fn test_derived_locations() {
        let event = Event::new("e1", "update").with_document(bike());
        assert_eq!(event.wiki().unwrap().name(), "xwiki");
        assert_eq!(event.space().unwrap().name(), "Main");
        assert!(Event::new("e2", "update").wiki().is_none());
    }

    #[test]
    fn test_fields() {
        let event = Event::new("e1", "update")
            .with_document(bike())
            .with_user(DocumentReference::new("xwiki", "XWiki", "Alice").unwrap())
            .with_group_id("g1");
        assert_eq!(event.field("type"), Some(QueryValue::String("update".into())));
        assert_eq!(event.field("groupId"), Some(QueryValue::String("g1".into())));
        assert_eq!(event.field("wiki"), Some(QueryValue::String("xwiki".into())));
        assert_eq!(event.field("space"), Some(QueryValue::String("xwiki:Main".into())));
        assert_eq!(event.field("document"), Some(QueryValue::String("xwiki:Main.Bike".into())));
        assert_eq!(event.field("user"), Some(QueryValue::String("xwiki:XWiki.Alice".into())));
        assert_eq!(event.field("hidden"), Some(QueryValue::Boolean(false)));
        assert_eq!(event.field("title"), None);
        assert_eq!(event.field("unknown"), None);
    }

    #[test]
    fn test_json_uses_reference_strings() {
        let json = r#"{"id": "e1", "type": "addComment", "groupId": "g1", "document": "wiki:A.B.Page"}"#;
        let event: Event = serde_json::from_str(json).unwrap();
        assert_eq!(event.document, Some(DocumentReference::with_spaces("wiki", &["A", "B"], "Page").unwrap()));
        assert_eq!(event.group_id.as_deref(), Some("g1"));

        let back = serde_json::to_value(&event).unwrap();
        assert_eq!(back["document"], "wiki:A.B.Page");
        assert_eq!(back["type"], "addComment");
        assert!(back.get("user").is_none());
    }

    #[test]
    fn test_user_written_as_reference_string() {
        let event = Event::new("e1", "update").with_user(DocumentReference::new("xwiki", "XWiki", "Alice").unwrap());
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["user"], "xwiki:XWiki.Alice");

        let back: Event = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }
}
