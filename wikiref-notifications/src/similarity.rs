//! Similarity scores between two events.

use crate::event::Event;

pub const SAME_GROUP_ID_AND_DOCUMENT_BUT_DIFFERENT_TYPES: i32 = 1000;
pub const SAME_DOCUMENT_AND_TYPE: i32 = 100;
pub const SAME_TYPE_BUT_DIFFERENT_DOCUMENT: i32 = 10;
pub const NO_SIMILARITY: i32 = 0;

pub trait SimilarityCalculator: Send + Sync {
    fn compute_similarity(&self, first: &Event, second: &Event) -> i32;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultSimilarityCalculator;

impl SimilarityCalculator for DefaultSimilarityCalculator {
    fn compute_similarity(&self, first: &Event, second: &Event) -> i32 {
        let same_document = first.document.is_some() && first.document == second.document;
        let same_type = first.event_type == second.event_type;

        if same_document && !same_type && first.group_id == second.group_id {
            SAME_GROUP_ID_AND_DOCUMENT_BUT_DIFFERENT_TYPES
        } else if same_document && same_type {
            SAME_DOCUMENT_AND_TYPE
        } else if same_type {
            SAME_TYPE_BUT_DIFFERENT_DOCUMENT
        } else {
            NO_SIMILARITY
        }
    }
}
