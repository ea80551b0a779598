//! Notification filters.
//!
//! A filter can act twice: before the query runs, by contributing an
//! expression to each preference, and after, by judging every fetched event.

use std::sync::Arc;
use wikiref_model::{DocumentReference, EntityReference, EntityReferenceSet};

use crate::event::Event;
use crate::expression::ExpressionNode;
use crate::parameters::{NotificationFormat, NotificationPreference};

/// Verdict of a filter on a single event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterPolicy {
    /// Keep the event whatever the other filters say.
    Keep,
    Filter,
    NoEffect,
}

pub trait NotificationFilter: Send + Sync {
    fn name(&self) -> &str;

    /// Constraint added to the query for `preference`.
    fn filter_expression(
        &self,
        _user: Option<&DocumentReference>,
        _preference: &NotificationPreference,
        _format: NotificationFormat,
    ) -> ExpressionNode {
        ExpressionNode::Empty
    }

    fn filter_event(
        &self,
        _event: &Event,
        _user: Option<&DocumentReference>,
        _format: NotificationFormat,
    ) -> FilterPolicy {
        FilterPolicy::NoEffect
    }
}

/// Whether `event` survives the filters: any `Keep` wins, then any `Filter`
/// drops it.
pub fn keeps_event(
    filters: &[Arc<dyn NotificationFilter>],
    event: &Event,
    user: Option<&DocumentReference>,
    format: NotificationFormat,
) -> bool {
    let mut filtered = false;
    for filter in filters {
        match filter.filter_event(event, user, format) {
            FilterPolicy::Keep => return true,
            FilterPolicy::Filter => filtered = true,
            FilterPolicy::NoEffect => {}
        }
    }
    !filtered
}

/// Restricts events to the documents of a set of locations.
#[derive(Debug, Clone)]
pub struct ScopeNotificationFilter {
    name: String,
    scope: EntityReferenceSet,
    event_types: Vec<String>,
}

impl ScopeNotificationFilter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scope: EntityReferenceSet::new(),
            event_types: Vec::new(),
        }
    }

    pub fn include(mut self, location: &EntityReference) -> Self {
        self.scope.includes(location);
        self
    }

    pub fn exclude(mut self, location: &EntityReference) -> Self {
        self.scope.excludes(location);
        self
    }

    /// Only judge events of this type. All types are judged by default.
    pub fn for_event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_types.push(event_type.into());
        self
    }

    fn applies_to(&self, event: &Event) -> bool {
        self.event_types.is_empty() || self.event_types.contains(&event.event_type)
    }
}

impl NotificationFilter for ScopeNotificationFilter {
    fn name(&self) -> &str {
        &self.name
    }

    fn filter_event(&self, event: &Event, _user: Option<&DocumentReference>, _format: NotificationFormat) -> FilterPolicy {
        match &event.document {
            Some(document) if self.applies_to(event) && !self.scope.matches(document) => FilterPolicy::Filter,
            _ => FilterPolicy::NoEffect,
        }
    }
}
