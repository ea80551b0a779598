//! Builds the event stream query for a notification retrieval.

use tracing::debug;

use crate::config::NotificationConfig;
use crate::error::QueryTranslationError;
use crate::expression::EventProperty;
use crate::parameters::NotificationParameters;
use crate::query::{
    CompareType, EventQuery, ExpressionNodeToEventQueryConverter, QueryCondition, QueryValue, SortClause,
    SortOrder,
};

#[derive(Debug, Clone, Default)]
pub struct EventQueryGenerator {
    config: NotificationConfig,
    converter: ExpressionNodeToEventQueryConverter,
}

impl EventQueryGenerator {
    pub fn new(config: NotificationConfig) -> Self {
        Self {
            config,
            converter: ExpressionNodeToEventQueryConverter,
        }
    }

    pub fn config(&self) -> &NotificationConfig {
        &self.config
    }

    /// `None` when the user subscribed to nothing in the requested format.
    pub fn generate(&self, parameters: &NotificationParameters) -> Result<Option<EventQuery>, QueryTranslationError> {
        let mut groups = Vec::new();
        for preference in parameters.enabled_preferences() {
            let mut conditions = vec![QueryCondition::compare(
                EventProperty::Type.field(),
                QueryValue::String(preference.event_type.clone()),
                CompareType::Equals,
            )];
            if let Some(start_date) = preference.start_date {
                conditions.push(QueryCondition::compare(
                    EventProperty::Date.field(),
                    QueryValue::Date(start_date),
                    CompareType::GreaterOrEquals,
                ));
            }
            for filter in &parameters.filters {
                let expression = filter.filter_expression(parameters.user.as_ref(), preference, parameters.format);
                match self.converter.convert(&expression)? {
                    None | Some(QueryCondition::Constant(true)) => {}
                    Some(QueryCondition::Group {
                        or: false,
                        reversed: false,
                        conditions: nested,
                    }) => conditions.extend(nested),
                    Some(condition) => conditions.push(condition),
                }
            }
            groups.push(QueryCondition::and(conditions));
        }

        if groups.is_empty() {
            debug!(format = %parameters.format, "no enabled preference");
            return Ok(None);
        }

        let mut query = EventQuery::new();
        if let Some(from_date) = parameters.from_date {
            query.add(QueryCondition::compare(
                EventProperty::Date.field(),
                QueryValue::Date(from_date),
                CompareType::GreaterOrEquals,
            ));
        }

        if groups.len() == 1 {
            query.add(groups.remove(0));
        } else {
            query.add(QueryCondition::or(groups));
        }

        if !parameters.blacklist.is_empty() {
            query.add(QueryCondition::In {
                reversed: true,
                property: EventProperty::Id.field().to_string(),
                values: parameters.blacklist.iter().cloned().map(QueryValue::String).collect(),
            });
        }

        if let Some(end_date) = parameters.end_date {
            query.add(QueryCondition::compare(
                EventProperty::Date.field(),
                QueryValue::Date(end_date),
                CompareType::LessOrEquals,
            ));
        }

        let display_hidden = parameters
            .display_hidden_documents
            .unwrap_or(self.config.display_hidden_documents);
        if !display_hidden {
            query.add(
                QueryCondition::compare(EventProperty::Hidden.field(), QueryValue::Boolean(true), CompareType::Equals)
                    .reversed(),
            );
        }

        if let Some(wiki) = parameters.user.as_ref().map(|u| u.wiki_reference()) {
            if wiki.name() != self.config.main_wiki {
                query.add(QueryCondition::compare(
                    EventProperty::Wiki.field(),
                    QueryValue::String(wiki.name().to_string()),
                    CompareType::Equals,
                ));
            }
        }

        query.sort_by(SortClause::new(EventProperty::Date.field(), SortOrder::Desc));
        Ok(Some(query))
    }
}
