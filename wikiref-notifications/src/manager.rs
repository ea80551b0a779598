//! Retrieval of a user's notifications.

use std::sync::Arc;
use tracing::{debug, info};

use crate::composite::{CompositeEvent, EventGrouper};
use crate::config::NotificationConfig;
use crate::error::{NotificationError, Result};
use crate::filter::keeps_event;
use crate::generator::EventQueryGenerator;
use crate::parameters::NotificationParameters;
use crate::similarity::{DefaultSimilarityCalculator, SimilarityCalculator};
use crate::source::EventSource;

/// Fetches events batch by batch until enough composite events exist.
pub struct ParametrizedNotificationManager {
    source: Arc<dyn EventSource>,
    generator: EventQueryGenerator,
    calculator: Arc<dyn SimilarityCalculator>,
}

impl ParametrizedNotificationManager {
    pub fn new(source: Arc<dyn EventSource>, config: NotificationConfig) -> Self {
        Self {
            source,
            generator: EventQueryGenerator::new(config),
            calculator: Arc::new(DefaultSimilarityCalculator),
        }
    }

    pub fn with_calculator(mut self, calculator: Arc<dyn SimilarityCalculator>) -> Self {
        self.calculator = calculator;
        self
    }

    pub fn config(&self) -> &NotificationConfig {
        self.generator.config()
    }

    pub fn get_events(&self, parameters: &NotificationParameters) -> Result<Vec<CompositeEvent>> {
        let config = self.generator.config();
        if !config.enabled || parameters.expected_count == 0 {
            return Ok(Vec::new());
        }

        let Some(query) = self.generator.generate(parameters).map_err(NotificationError::retrieval)? else {
            return Ok(Vec::new());
        };

        let batch_size = parameters
            .expected_count
            .saturating_mul(config.batch_multiplier.max(1));
        let mut grouper = EventGrouper::new(Arc::clone(&self.calculator));
        let mut offset = 0;

        'batches: for batch in 0..config.max_batches {
            let events = self
                .source
                .search_events(&query, offset, batch_size)
                .map_err(NotificationError::retrieval)?;
            let fetched = events.len();
            offset += fetched;
            debug!(batch, fetched, offset, "fetched events");

            for event in events {
                if grouper.len() >= parameters.expected_count {
                    break 'batches;
                }
                if keeps_event(&parameters.filters, &event, parameters.user.as_ref(), parameters.format) {
                    grouper.record_event(event);
                }
            }

            if fetched < batch_size {
                break;
            }
        }

        info!(composites = grouper.len(), "notifications retrieved");
        Ok(grouper.into_composites())
    }

    pub fn get_events_count(&self, parameters: &NotificationParameters) -> Result<usize> {
        Ok(self.get_events(parameters)?.len())
    }
}
