//! Grouping of event streams into composite events.

use proptest::prelude::*;
use wikiref_model::DocumentReference;
use wikiref_notifications::{group_events, CompositeEvent, Event};

fn page(name: &str) -> DocumentReference {
    DocumentReference::new("xwiki", "Main", name).unwrap()
}

fn event(id: &str, event_type: &str, document: &str, group: Option<&str>) -> Event {
    let event = Event::new(id, event_type).with_document(page(document));
    match group {
        Some(group) => event.with_group_id(group),
        None => event,
    }
}

fn ids(composites: &[CompositeEvent]) -> Vec<Vec<&str>> {
    composites.iter().map(|c| c.event_ids()).collect()
}

#[test]
fn test_two_updates_on_same_document() {
    let composites = group_events(vec![
        event("1", "update", "Bike", None),
        event("2", "update", "Bike", None),
    ]);
    assert_eq!(ids(&composites), vec![vec!["1", "2"]]);
}

#[test]
fn test_comment_and_its_update() {
    let composites = group_events(vec![
        event("1", "addComment", "Bike", Some("g1")),
        event("2", "update", "Bike", Some("g1")),
    ]);
    assert_eq!(ids(&composites), vec![vec!["1", "2"]]);
    assert_eq!(composites[0].event_type(), "addComment");
    assert_eq!(composites[0].similarity_between_events(), 1000);
}

#[test]
fn test_update_then_comment_with_update() {
    let composites = group_events(vec![
        event("1", "update", "Bike", Some("g1")),
        event("2", "addComment", "Bike", Some("g2")),
        event("3", "update", "Bike", Some("g2")),
    ]);
    assert_eq!(ids(&composites), vec![vec!["1"], vec!["2", "3"]]);
}

#[test]
fn test_updates_of_different_groups() {
    let composites = group_events(vec![
        event("1", "update", "Bike", Some("g1")),
        event("2", "update", "Bike", Some("g2")),
    ]);
    assert_eq!(ids(&composites), vec![vec!["1", "2"]]);
}

#[test]
fn test_interleaved_comments_and_updates() {
    let composites = group_events(vec![
        event("1", "update", "Bike", Some("g1")),
        event("2", "update", "Bike", Some("g2")),
        event("3", "addComment", "Bike", Some("g3")),
        event("4", "update", "Bike", Some("g3")),
        event("5", "update", "Bike", Some("g5")),
        event("6", "addComment", "Bike", Some("g5")),
        event("7", "update", "Guitar", Some("g7")),
        event("8", "addComment", "Guitar", Some("g7")),
    ]);
    assert_eq!(
        ids(&composites),
        vec![vec!["1", "2"], vec!["3", "4", "5", "6"], vec!["7", "8"]]
    );
    assert_eq!(composites[1].event_type(), "addComment");
    assert_eq!(composites[1].group_ids(), vec!["g3", "g5"]);
}

#[test]
fn test_evicted_member_pairs_with_newcomer() {
    // 1 and 2 are loose (same type), 3 is tied to 2 by group id.
    let composites = group_events(vec![
        event("1", "update", "Bike", Some("g1")),
        event("2", "update", "Bike", Some("g2")),
        event("3", "addComment", "Bike", Some("g2")),
    ]);
    assert_eq!(ids(&composites), vec![vec!["1"], vec!["2", "3"]]);
    assert_eq!(composites[1].similarity_between_events(), 1000);
}

fn any_event() -> impl Strategy<Value = Event> {
    (
        0u32..1000,
        prop::sample::select(vec!["update", "addComment", "create", "delete"]),
        prop::sample::select(vec!["Bike", "Guitar", "Piano"]),
        prop::option::of(prop::sample::select(vec!["g1", "g2", "g3"])),
    )
        .prop_map(|(id, event_type, document, group)| event(&id.to_string(), event_type, document, group))
}

proptest! {
    #[test]
    fn grouping_is_deterministic(events in prop::collection::vec(any_event(), 0..20)) {
        let first = group_events(events.clone());
        let second = group_events(events.clone());
        prop_assert_eq!(&first, &second);

        let members: usize = first.iter().map(|c| c.len()).sum();
        prop_assert_eq!(members, events.len());
        prop_assert!(first.iter().all(|c| !c.is_empty()));
    }
}
