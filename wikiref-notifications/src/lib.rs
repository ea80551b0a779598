//! Notification retrieval for wikiref.
//!
//! Builds the event stream query for a user's preferences and filters,
//! fetches matching events batch by batch, and groups them into
//! [`CompositeEvent`]s ready for display.
//!
//! ```
//! use std::sync::Arc;
//! use wikiref_notifications::{
//!     Event, InMemoryEventSource, NotificationConfig, NotificationFormat, NotificationParameters,
//!     NotificationPreference, ParametrizedNotificationManager,
//! };
//!
//! let source = InMemoryEventSource::new(vec![Event::new("e1", "create")]);
//! let manager = ParametrizedNotificationManager::new(Arc::new(source), NotificationConfig::default());
//!
//! let mut parameters = NotificationParameters::new(None, NotificationFormat::Alert, 10);
//! parameters.preferences = vec![NotificationPreference::new("create", NotificationFormat::Alert)];
//! assert_eq!(manager.get_events_count(&parameters).unwrap(), 1);
//! ```

pub mod composite;
pub mod config;
pub mod error;
pub mod event;
pub mod expression;
pub mod filter;
pub mod generator;
pub mod manager;
pub mod parameters;
pub mod query;
pub mod similarity;
pub mod source;

pub use composite::{group_events, CompositeEvent, EventGrouper};
pub use config::NotificationConfig;
pub use error::{EventSourceError, NotificationError, QueryTranslationError, Result};
pub use event::Event;
pub use expression::{value, EventProperty, ExpressionNode, ValueNode};
pub use filter::{FilterPolicy, NotificationFilter, ScopeNotificationFilter};
pub use generator::EventQueryGenerator;
pub use manager::ParametrizedNotificationManager;
pub use parameters::{NotificationFormat, NotificationParameters, NotificationPreference};
pub use query::{
    CompareType, EventQuery, EventStatusLookup, ExpressionNodeToEventQueryConverter, QueryCondition, QueryValue,
    SortClause, SortOrder,
};
pub use similarity::{DefaultSimilarityCalculator, SimilarityCalculator};
pub use source::{EventSource, InMemoryEventSource};
