//! Composite events and the online grouping of a stream of events.
//!
//! Events are clustered greedily, in arrival order. Each cluster keeps the
//! lowest similarity between its members as a threshold; a new event joins
//! the cluster holding its most similar event unless that would loosen a
//! tighter cluster, in which case the closest member is pulled out to pair
//! with the new event instead.

use serde::Serialize;
use std::sync::Arc;
use tracing::debug;
use wikiref_model::DocumentReference;

use crate::event::Event;
use crate::similarity::{
    DefaultSimilarityCalculator, SimilarityCalculator, SAME_GROUP_ID_AND_DOCUMENT_BUT_DIFFERENT_TYPES,
};

/// Type of the technical event recorded alongside most user actions.
pub const UPDATE_EVENT_TYPE: &str = "update";

/// Score taken off a match that would loosen a cluster.
const LOOSENING_PENALTY: i32 = 5;

/// A cluster of similar events displayed as a single notification.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeEvent {
    events: Vec<Event>,
    similarity_between_events: i32,
}

impl CompositeEvent {
    pub fn new(event: Event) -> Self {
        Self {
            events: vec![event],
            similarity_between_events: 0,
        }
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn similarity_between_events(&self) -> i32 {
        self.similarity_between_events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// The most meaningful type among the members: `update` only when
    /// nothing else happened.
    pub fn event_type(&self) -> &str {
        self.events
            .iter()
            .map(|e| e.event_type.as_str())
            .find(|t| *t != UPDATE_EVENT_TYPE)
            .or_else(|| self.events.first().map(|e| e.event_type.as_str()))
            .unwrap_or(UPDATE_EVENT_TYPE)
    }

    pub fn document(&self) -> Option<&DocumentReference> {
        self.events.first().and_then(|e| e.document.as_ref())
    }

    pub fn event_ids(&self) -> Vec<&str> {
        self.events.iter().map(|e| e.id.as_str()).collect()
    }

    pub fn group_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = Vec::new();
        for id in self.events.iter().filter_map(|e| e.group_id.as_deref()) {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        ids
    }

    /// Add a member; the threshold becomes the lowest similarity seen.
    pub fn add(&mut self, event: Event, similarity: i32) {
        if self.events.len() == 1 {
            self.similarity_between_events = similarity;
        } else {
            self.similarity_between_events = self.similarity_between_events.min(similarity);
        }
        self.events.push(event);
    }

    pub fn add_keep_threshold(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn remove(&mut self, index: usize) -> Event {
        self.events.remove(index)
    }
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    composite: usize,
    member: usize,
    score: i32,
}

/// Groups events, in order, into composite events.
pub struct EventGrouper {
    calculator: Arc<dyn SimilarityCalculator>,
    composites: Vec<CompositeEvent>,
}

impl Default for EventGrouper {
    fn default() -> Self {
        Self::new(Arc::new(DefaultSimilarityCalculator))
    }
}

impl EventGrouper {
    pub fn new(calculator: Arc<dyn SimilarityCalculator>) -> Self {
        Self {
            calculator,
            composites: Vec::new(),
        }
    }

    pub fn composites(&self) -> &[CompositeEvent] {
        &self.composites
    }

    pub fn into_composites(self) -> Vec<CompositeEvent> {
        self.composites
    }

    pub fn len(&self) -> usize {
        self.composites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.composites.is_empty()
    }

    pub fn record_event(&mut self, event: Event) {
        let Some(best) = self.best_match(&event, None) else {
            debug!(event = %event.id, "new composite");
            self.composites.push(CompositeEvent::new(event));
            return;
        };

        let composite = &self.composites[best.composite];
        let threshold = composite.similarity_between_events();

        if best.score > threshold && composite.len() > 1 {
            self.split(best, event);
        } else if best.score >= threshold {
            debug!(event = %event.id, composite = best.composite, score = best.score, "add to composite");
            self.composites[best.composite].add(event, best.score);
        } else if is_compatible(composite, &event) {
            debug!(event = %event.id, composite = best.composite, "add compatible event");
            self.composites[best.composite].add_keep_threshold(event);
        } else {
            debug!(event = %event.id, score = best.score, "new composite");
            self.composites.push(CompositeEvent::new(event));
        }
    }

    /// The matched member is closer to `event` than to its own cluster.
    fn split(&mut self, best: Candidate, event: Event) {
        let evicted = self.composites[best.composite].remove(best.member);
        debug!(event = %event.id, evicted = %evicted.id, score = best.score, "evict from composite");

        let folded = self.best_match(&event, Some(best.composite)).filter(|second| {
            let composite = &self.composites[second.composite];
            second.score >= composite.similarity_between_events() || is_compatible(composite, &event)
        });

        match folded {
            Some(second) => {
                debug!(event = %event.id, composite = second.composite, "fold pair into composite");
                let composite = &mut self.composites[second.composite];
                composite.add(evicted, best.score);
                composite.add(event, best.score);
            }
            None => {
                let mut pair = CompositeEvent::new(evicted);
                pair.add(event, best.score);
                self.composites.push(pair);
            }
        }
    }

    /// Highest penalized score over every member of every composite; the
    /// first one found wins ties, and nothing scoring zero or less counts.
    fn best_match(&self, event: &Event, skip: Option<usize>) -> Option<Candidate> {
        let mut best: Option<Candidate> = None;
        for (index, composite) in self.composites.iter().enumerate() {
            if skip == Some(index) {
                continue;
            }
            for (member, other) in composite.events().iter().enumerate() {
                let mut score = self.calculator.compute_similarity(event, other);
                if score < composite.similarity_between_events() {
                    score -= LOOSENING_PENALTY;
                }
                if score > best.map_or(0, |b| b.score) {
                    best = Some(Candidate {
                        composite: index,
                        member,
                        score,
                    });
                }
            }
        }
        best
    }
}

/// A cluster of a same action (e.g. a comment and its technical update)
/// still takes events of its own type.
fn is_compatible(composite: &CompositeEvent, event: &Event) -> bool {
    composite.similarity_between_events() >= SAME_GROUP_ID_AND_DOCUMENT_BUT_DIFFERENT_TYPES
        && composite.event_type() == event.event_type
}

/// Group a whole list of events.
pub fn group_events(events: impl IntoIterator<Item = Event>) -> Vec<CompositeEvent> {
    let mut grouper = EventGrouper::default();
    for event in events {
        grouper.record_event(event);
    }
    grouper.into_composites()
}
