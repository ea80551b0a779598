//! Where events come from.

use std::collections::BTreeSet;
use tracing::debug;

use crate::error::EventSourceError;
use crate::event::Event;
use crate::query::{EventQuery, EventStatusLookup};

pub trait EventSource: Send + Sync {
    /// One page of the events matching `query`, in query order.
    fn search_events(&self, query: &EventQuery, offset: usize, limit: usize) -> Result<Vec<Event>, EventSourceError>;
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct StatusRecord {
    event_id: String,
    entity: String,
    read: bool,
}

/// Event store kept in memory, with read and mail records.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEventSource {
    events: Vec<Event>,
    statuses: BTreeSet<StatusRecord>,
    mail_entities: BTreeSet<(String, String)>,
}

impl InMemoryEventSource {
    pub fn new(events: impl IntoIterator<Item = Event>) -> Self {
        Self {
            events: events.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn push(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Record that `entity` was notified of the event.
    pub fn set_status(&mut self, event_id: impl Into<String>, entity: impl Into<String>, read: bool) {
        let event_id = event_id.into();
        let entity = entity.into();
        self.statuses
            .retain(|s| !(s.event_id == event_id && s.entity == entity));
        self.statuses.insert(StatusRecord { event_id, entity, read });
    }

    /// Record that the event still has to be mailed to `entity`.
    pub fn add_mail_entity(&mut self, event_id: impl Into<String>, entity: impl Into<String>) {
        self.mail_entities.insert((event_id.into(), entity.into()));
    }
}

impl EventStatusLookup for InMemoryEventSource {
    fn has_status(&self, event_id: &str, entity: Option<&str>, read: Option<bool>) -> bool {
        self.statuses.iter().any(|s| {
            s.event_id == event_id
                && entity.map_or(true, |e| s.entity == e)
                && read.map_or(true, |r| s.read == r)
        })
    }

    fn has_mail_entity(&self, event_id: &str, entity: Option<&str>) -> bool {
        self.mail_entities
            .iter()
            .any(|(id, e)| id == event_id && entity.map_or(true, |entity| e == entity))
    }
}

impl EventSource for InMemoryEventSource {
    fn search_events(&self, query: &EventQuery, offset: usize, limit: usize) -> Result<Vec<Event>, EventSourceError> {
        let mut matching: Vec<&Event> = self
            .events
            .iter()
            .filter(|event| query.matches_in(event, self))
            .collect();
        matching.sort_by(|a, b| query.compare_events(a, b));
        debug!(matching = matching.len(), offset, limit, "search events");

        Ok(matching.into_iter().skip(offset).take(limit).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{CompareType, QueryCondition, QueryValue, SortClause, SortOrder};
    use chrono::DateTime;

    fn source() -> InMemoryEventSource {
        InMemoryEventSource::new((0..5).map(|i| {
            Event::new(format!("e{i}"), if i % 2 == 0 { "update" } else { "create" })
                .with_date(DateTime::from_timestamp(i * 10, 0).unwrap())
        }))
    }

    fn ids(events: &[Event]) -> Vec<&str> {
        events.iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn test_filters_sorts_and_pages() {
        let mut query = EventQuery::new();
        query
            .add(QueryCondition::compare("type", QueryValue::String("update".into()), CompareType::Equals))
            .sort_by(SortClause::new("date", SortOrder::Desc));

        let source = source();
        assert_eq!(ids(&source.search_events(&query, 0, 10).unwrap()), vec!["e4", "e2", "e0"]);
        assert_eq!(ids(&source.search_events(&query, 1, 1).unwrap()), vec!["e2"]);
        assert!(source.search_events(&query, 5, 1).unwrap().is_empty());
    }

    #[test]
    fn test_status_conditions() {
        let mut source = source();
        source.set_status("e1", "xwiki:XWiki.Alice", false);
        source.set_status("e3", "xwiki:XWiki.Alice", true);
        source.set_status("e3", "xwiki:XWiki.Alice", false);
        source.add_mail_entity("e1", "xwiki:XWiki.Alice");

        let mut unread = EventQuery::new();
        unread.add(QueryCondition::Status {
            entity: Some("xwiki:XWiki.Alice".into()),
            read: Some(false),
            reversed: false,
        });
        assert_eq!(ids(&source.search_events(&unread, 0, 10).unwrap()), vec!["e1", "e3"]);

        let mut mail = EventQuery::new();
        mail.add(QueryCondition::MailEntity {
            entity: None,
            reversed: false,
        });
        assert_eq!(ids(&source.search_events(&mail, 0, 10).unwrap()), vec!["e1"]);
    }
}
