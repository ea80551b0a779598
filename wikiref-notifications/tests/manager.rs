//! Batch retrieval through the notification manager.

use std::error::Error;
use std::sync::{Arc, Mutex};
use wikiref_model::{DocumentReference, EntityReference, EntityType};
use wikiref_notifications::{
    Event, EventQuery, EventSource, EventSourceError, FilterPolicy, InMemoryEventSource, NotificationConfig,
    NotificationFilter, NotificationFormat, NotificationParameters, NotificationPreference,
    ParametrizedNotificationManager, ScopeNotificationFilter,
};

/// Serves a fixed list page by page, whatever the query, and records the
/// requested pages.
struct ScriptedSource {
    events: Vec<Event>,
    requests: Mutex<Vec<(usize, usize)>>,
}

impl ScriptedSource {
    fn new(events: Vec<Event>) -> Self {
        Self {
            events,
            requests: Mutex::new(Vec::new()),
        }
    }
}

impl EventSource for ScriptedSource {
    fn search_events(&self, _query: &EventQuery, offset: usize, limit: usize) -> Result<Vec<Event>, EventSourceError> {
        self.requests.lock().unwrap().push((offset, limit));
        Ok(self.events.iter().skip(offset).take(limit).cloned().collect())
    }
}

struct BrokenSource;

impl EventSource for BrokenSource {
    fn search_events(&self, _: &EventQuery, _: usize, _: usize) -> Result<Vec<Event>, EventSourceError> {
        Err(EventSourceError::Unavailable("connection refused".to_string()))
    }
}

/// Hides the given events, as missing view rights would.
struct NoAccess(Vec<&'static str>);

impl NotificationFilter for NoAccess {
    fn name(&self) -> &str {
        "noAccess"
    }

    fn filter_event(&self, event: &Event, _: Option<&DocumentReference>, _: NotificationFormat) -> FilterPolicy {
        if self.0.contains(&event.id.as_str()) {
            FilterPolicy::Filter
        } else {
            FilterPolicy::NoEffect
        }
    }
}

fn alice() -> DocumentReference {
    DocumentReference::new("xwiki", "XWiki", "Alice").unwrap()
}

fn parameters(expected: usize) -> NotificationParameters {
    let mut parameters = NotificationParameters::new(Some(alice()), NotificationFormat::Alert, expected);
    parameters.preferences = vec![
        NotificationPreference::new("create", NotificationFormat::Alert),
        NotificationPreference::new("update", NotificationFormat::Alert),
    ];
    parameters
}

#[test]
fn test_fetches_a_second_batch_when_events_are_filtered() {
    let events = vec![
        Event::new("1", "type1").with_document(DocumentReference::new("xwiki", "Main", "Doc1").unwrap()),
        Event::new("2", "type2"),
        Event::new("3", "type3"),
        Event::new("4", "type4"),
        Event::new("5", "type5"),
        Event::new("6", "type6"),
    ];
    let source = Arc::new(ScriptedSource::new(events));
    let manager = ParametrizedNotificationManager::new(source.clone(), NotificationConfig::default());

    let mut parameters = parameters(2);
    parameters.filters = vec![Arc::new(NoAccess(vec!["2", "3", "4"]))];

    let results = manager.get_events(&parameters).unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].event_ids(), vec!["1"]);
    assert_eq!(results[1].event_ids(), vec!["5"]);
    assert_eq!(*source.requests.lock().unwrap(), vec![(0, 4), (4, 4)]);
}

#[test]
fn test_stops_when_source_is_exhausted() {
    let source = Arc::new(ScriptedSource::new(vec![Event::new("1", "create")]));
    let manager = ParametrizedNotificationManager::new(source.clone(), NotificationConfig::default());

    assert_eq!(manager.get_events_count(&parameters(5)).unwrap(), 1);
    assert_eq!(source.requests.lock().unwrap().len(), 1);
}

#[test]
fn test_batches_are_bounded() {
    // Every event folds into a single composite, so two are never reached.
    let events: Vec<Event> = (0..100).map(|i| Event::new(i.to_string(), "update")).collect();
    let source = Arc::new(ScriptedSource::new(events));
    let config = NotificationConfig::from_yaml_str("max_batches: 3\n").unwrap();
    let manager = ParametrizedNotificationManager::new(source.clone(), config);

    assert_eq!(manager.get_events_count(&parameters(2)).unwrap(), 1);
    assert_eq!(*source.requests.lock().unwrap(), vec![(0, 4), (4, 4), (8, 4)]);
}

#[test]
fn test_no_enabled_preference() {
    let source = Arc::new(ScriptedSource::new(vec![Event::new("1", "create")]));
    let manager = ParametrizedNotificationManager::new(source.clone(), NotificationConfig::default());

    let mut parameters = parameters(10);
    for preference in &mut parameters.preferences {
        preference.enabled = false;
    }
    assert!(manager.get_events(&parameters).unwrap().is_empty());
    assert!(source.requests.lock().unwrap().is_empty());
}

#[test]
fn test_disabled_notifications() {
    let source = Arc::new(ScriptedSource::new(vec![Event::new("1", "create")]));
    let config = NotificationConfig::from_yaml_str("enabled: false\n").unwrap();
    let manager = ParametrizedNotificationManager::new(source, config);
    assert_eq!(manager.get_events_count(&parameters(10)).unwrap(), 0);
}

#[test]
fn test_source_failure_is_wrapped() {
    let manager = ParametrizedNotificationManager::new(Arc::new(BrokenSource), NotificationConfig::default());
    let error = manager.get_events(&parameters(10)).unwrap_err();

    assert_eq!(error.to_string(), "Fail to get the list of notifications.");
    assert_eq!(
        error.source().map(|cause| cause.to_string()),
        Some("Event store unavailable: connection refused".to_string())
    );
}

#[test]
fn test_in_memory_store_end_to_end() {
    let bike = DocumentReference::new("xwiki", "Main", "Bike").unwrap();
    let secret = DocumentReference::new("xwiki", "Secret", "Plans").unwrap();
    let mut source = InMemoryEventSource::default();
    source.push(Event::new("1", "update").with_document(bike.clone()).with_group_id("g1"));
    source.push(Event::new("2", "addComment").with_document(bike.clone()).with_group_id("g2"));
    source.push(Event::new("3", "update").with_document(bike).with_group_id("g2"));
    source.push(Event::new("4", "update").with_document(secret).with_group_id("g4"));
    source.push(Event::new("5", "delete"));

    let manager = ParametrizedNotificationManager::new(Arc::new(source), NotificationConfig::default());
    let mut parameters = parameters(10);
    parameters.preferences.push(NotificationPreference::new("addComment", NotificationFormat::Alert));
    parameters.filters = vec![Arc::new(
        ScopeNotificationFilter::new("scope")
            .exclude(&EntityReference::new("Secret", EntityType::Space).unwrap()),
    )];

    let results = manager.get_events(&parameters).unwrap();
    let ids: Vec<Vec<&str>> = results.iter().map(|c| c.event_ids()).collect();
    assert_eq!(ids, vec![vec!["1"], vec!["2", "3"]]);
}

#[test]
fn test_huge_expected_count_saturates_batch_size() {
    let source = Arc::new(ScriptedSource::new(vec![Event::new("1", "create"), Event::new("2", "delete")]));
    let manager = ParametrizedNotificationManager::new(source.clone(), NotificationConfig::default());

    assert_eq!(manager.get_events_count(&parameters(usize::MAX)).unwrap(), 2);
    assert_eq!(*source.requests.lock().unwrap(), vec![(0, usize::MAX)]);
}
