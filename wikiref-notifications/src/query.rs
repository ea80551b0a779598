//! Event stream queries and their construction from filter expressions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use wikiref_model::serialize;

use crate::error::QueryTranslationError;
use crate::event::Event;
use crate::expression::{ExpressionNode, ValueNode};
use crate::parameters::NotificationFormat;

/// A literal compared against a stored event field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum QueryValue {
    String(String),
    Boolean(bool),
    Date(DateTime<Utc>),
}

impl QueryValue {
    /// Values of different kinds are not comparable.
    pub fn compare(&self, other: &QueryValue) -> Option<Ordering> {
        match (self, other) {
            (QueryValue::String(a), QueryValue::String(b)) => Some(a.cmp(b)),
            (QueryValue::Boolean(a), QueryValue::Boolean(b)) => Some(a.cmp(b)),
            (QueryValue::Date(a), QueryValue::Date(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            QueryValue::String(text) => Some(text),
            _ => None,
        }
    }
}

impl fmt::Display for QueryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryValue::String(text) => write!(f, "\"{text}\""),
            QueryValue::Boolean(flag) => write!(f, "{flag}"),
            QueryValue::Date(date) => write!(f, "{}", date.to_rfc3339()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompareType {
    Greater,
    Less,
    GreaterOrEquals,
    LessOrEquals,
    Equals,
    StartsWith,
    EndsWith,
    Contains,
}

impl CompareType {
    /// Whether `field <op> value` holds.
    pub fn evaluate(self, field: &QueryValue, value: &QueryValue) -> bool {
        let text = || field.as_str().zip(value.as_str());
        match self {
            CompareType::Greater => field.compare(value) == Some(Ordering::Greater),
            CompareType::Less => field.compare(value) == Some(Ordering::Less),
            CompareType::GreaterOrEquals => {
                matches!(field.compare(value), Some(Ordering::Greater | Ordering::Equal))
            }
            CompareType::LessOrEquals => {
                matches!(field.compare(value), Some(Ordering::Less | Ordering::Equal))
            }
            CompareType::Equals => field == value,
            CompareType::StartsWith => text().is_some_and(|(f, v)| f.starts_with(v)),
            CompareType::EndsWith => text().is_some_and(|(f, v)| f.ends_with(v)),
            CompareType::Contains => text().is_some_and(|(f, v)| f.contains(v)),
        }
    }

    /// The operator to use once both operands are swapped.
    pub fn mirrored(self) -> Option<CompareType> {
        match self {
            CompareType::Greater => Some(CompareType::Less),
            CompareType::Less => Some(CompareType::Greater),
            CompareType::GreaterOrEquals => Some(CompareType::LessOrEquals),
            CompareType::LessOrEquals => Some(CompareType::GreaterOrEquals),
            CompareType::Equals => Some(CompareType::Equals),
            CompareType::StartsWith | CompareType::EndsWith | CompareType::Contains => None,
        }
    }
}

/// Read and mail records kept next to the events.
pub trait EventStatusLookup {
    /// Whether `entity` (anyone when `None`) has a status for the event,
    /// with the given read flag (any when `None`).
    fn has_status(&self, event_id: &str, entity: Option<&str>, read: Option<bool>) -> bool;

    fn has_mail_entity(&self, event_id: &str, entity: Option<&str>) -> bool;
}

/// Lookup for a store without status records.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoStatus;

impl EventStatusLookup for NoStatus {
    fn has_status(&self, _event_id: &str, _entity: Option<&str>, _read: Option<bool>) -> bool {
        false
    }

    fn has_mail_entity(&self, _event_id: &str, _entity: Option<&str>) -> bool {
        false
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum QueryCondition {
    Compare {
        property: String,
        value: QueryValue,
        compare_type: CompareType,
        reversed: bool,
    },
    In {
        reversed: bool,
        property: String,
        values: Vec<QueryValue>,
    },
    Group {
        or: bool,
        reversed: bool,
        conditions: Vec<QueryCondition>,
    },
    Status {
        entity: Option<String>,
        read: Option<bool>,
        reversed: bool,
    },
    MailEntity {
        entity: Option<String>,
        reversed: bool,
    },
    Constant(bool),
}

impl QueryCondition {
    pub fn compare(property: impl Into<String>, value: QueryValue, compare_type: CompareType) -> Self {
        QueryCondition::Compare {
            property: property.into(),
            value,
            compare_type,
            reversed: false,
        }
    }

    pub fn and(conditions: Vec<QueryCondition>) -> Self {
        QueryCondition::Group {
            or: false,
            reversed: false,
            conditions,
        }
    }

    pub fn or(conditions: Vec<QueryCondition>) -> Self {
        QueryCondition::Group {
            or: true,
            reversed: false,
            conditions,
        }
    }

    /// The negated condition.
    pub fn reversed(self) -> Self {
        match self {
            QueryCondition::Compare {
                property,
                value,
                compare_type,
                reversed,
            } => QueryCondition::Compare {
                property,
                value,
                compare_type,
                reversed: !reversed,
            },
            QueryCondition::In {
                reversed,
                property,
                values,
            } => QueryCondition::In {
                reversed: !reversed,
                property,
                values,
            },
            QueryCondition::Group {
                or,
                reversed,
                conditions,
            } => QueryCondition::Group {
                or,
                reversed: !reversed,
                conditions,
            },
            QueryCondition::Status { entity, read, reversed } => QueryCondition::Status {
                entity,
                read,
                reversed: !reversed,
            },
            QueryCondition::MailEntity { entity, reversed } => QueryCondition::MailEntity {
                entity,
                reversed: !reversed,
            },
            QueryCondition::Constant(value) => QueryCondition::Constant(!value),
        }
    }

    pub fn matches(&self, event: &Event) -> bool {
        self.matches_in(event, &NoStatus)
    }

    /// Evaluate against an event; a missing field never matches before
    /// negation.
    pub fn matches_in(&self, event: &Event, lookup: &dyn EventStatusLookup) -> bool {
        match self {
            QueryCondition::Compare {
                property,
                value,
                compare_type,
                reversed,
            } => {
                let holds = event
                    .field(property)
                    .is_some_and(|field| compare_type.evaluate(&field, value));
                holds != *reversed
            }
            QueryCondition::In {
                reversed,
                property,
                values,
            } => {
                let holds = event.field(property).is_some_and(|field| values.contains(&field));
                holds != *reversed
            }
            QueryCondition::Group {
                or,
                reversed,
                conditions,
            } => {
                let holds = if *or {
                    conditions.iter().any(|c| c.matches_in(event, lookup))
                } else {
                    conditions.iter().all(|c| c.matches_in(event, lookup))
                };
                holds != *reversed
            }
            QueryCondition::Status { entity, read, reversed } => {
                lookup.has_status(&event.id, entity.as_deref(), *read) != *reversed
            }
            QueryCondition::MailEntity { entity, reversed } => {
                lookup.has_mail_entity(&event.id, entity.as_deref()) != *reversed
            }
            QueryCondition::Constant(value) => *value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortClause {
    pub property: String,
    pub order: SortOrder,
}

impl SortClause {
    pub fn new(property: impl Into<String>, order: SortOrder) -> Self {
        Self {
            property: property.into(),
            order,
        }
    }
}

/// Conditions joined by AND, plus an ordering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventQuery {
    pub conditions: Vec<QueryCondition>,
    pub sorts: Vec<SortClause>,
}

impl EventQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a condition. Plain AND groups are flattened and `true`
    /// constants dropped.
    pub fn add(&mut self, condition: QueryCondition) -> &mut Self {
        match condition {
            QueryCondition::Constant(true) => {}
            QueryCondition::Group {
                or: false,
                reversed: false,
                conditions,
            } => {
                for condition in conditions {
                    self.add(condition);
                }
            }
            condition => self.conditions.push(condition),
        }
        self
    }

    pub fn sort_by(&mut self, clause: SortClause) -> &mut Self {
        self.sorts.push(clause);
        self
    }

    pub fn matches(&self, event: &Event) -> bool {
        self.matches_in(event, &NoStatus)
    }

    pub fn matches_in(&self, event: &Event, lookup: &dyn EventStatusLookup) -> bool {
        self.conditions.iter().all(|c| c.matches_in(event, lookup))
    }

    /// Order events by the sort clauses. Missing fields come first.
    pub fn compare_events(&self, left: &Event, right: &Event) -> Ordering {
        for clause in &self.sorts {
            let ordering = match (left.field(&clause.property), right.field(&clause.property)) {
                (Some(a), Some(b)) => a.compare(&b).unwrap_or(Ordering::Equal),
                (None, Some(_)) => Ordering::Less,
                (Some(_), None) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
            let ordering = match clause.order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }
}

/// Translates filter expressions into query conditions.
///
/// `None` stands for "no constraint".
#[derive(Debug, Clone, Copy, Default)]
pub struct ExpressionNodeToEventQueryConverter;

type Converted = Result<Option<QueryCondition>, QueryTranslationError>;

impl ExpressionNodeToEventQueryConverter {
    pub fn convert(&self, node: &ExpressionNode) -> Converted {
        match node {
            ExpressionNode::Empty => Ok(None),
            ExpressionNode::And(left, right) => self.convert_and(left, right),
            ExpressionNode::Or(left, right) => self.convert_or(left, right),
            ExpressionNode::Not(inner) => Ok(self.convert(inner)?.map(QueryCondition::reversed)),
            ExpressionNode::Equals(left, right) => compare(left, right, CompareType::Equals, false),
            ExpressionNode::NotEquals(left, right) => compare(left, right, CompareType::Equals, true),
            ExpressionNode::GreaterThan(left, right) => compare(left, right, CompareType::Greater, false),
            ExpressionNode::LesserThan(left, right) => compare(left, right, CompareType::Less, false),
            ExpressionNode::StartsWith(left, right) => compare(left, right, CompareType::StartsWith, false),
            ExpressionNode::EndsWith(left, right) => compare(left, right, CompareType::EndsWith, false),
            ExpressionNode::Like(left, right) => like(node, left, right),
            ExpressionNode::In(left, values) => in_list(node, left, values),
            ExpressionNode::ForUser { user, read, format } => {
                let entity = user.as_ref().map(|u| serialize(u));
                let status = QueryCondition::Status {
                    entity: entity.clone(),
                    read: *read,
                    reversed: false,
                };
                Ok(Some(match format {
                    Some(NotificationFormat::Email) => QueryCondition::and(vec![
                        QueryCondition::MailEntity {
                            entity,
                            reversed: false,
                        },
                        status,
                    ]),
                    _ => status,
                }))
            }
            ExpressionNode::Value(ValueNode::Boolean(value)) => Ok(Some(QueryCondition::Constant(*value))),
            ExpressionNode::Value(_) => Err(unsupported(node)),
        }
    }

    fn convert_and(&self, left: &ExpressionNode, right: &ExpressionNode) -> Converted {
        let mut conditions = Vec::new();
        for operand in [left, right] {
            match self.convert(operand)? {
                None | Some(QueryCondition::Constant(true)) => {}
                Some(QueryCondition::Constant(false)) => return Ok(Some(QueryCondition::Constant(false))),
                Some(QueryCondition::Group {
                    or: false,
                    reversed: false,
                    conditions: nested,
                }) => conditions.extend(nested),
                Some(condition) => conditions.push(condition),
            }
        }
        Ok(match conditions.len() {
            0 => None,
            1 => conditions.pop(),
            _ => Some(QueryCondition::and(conditions)),
        })
    }

    fn convert_or(&self, left: &ExpressionNode, right: &ExpressionNode) -> Converted {
        let mut conditions = Vec::new();
        for operand in [left, right] {
            match self.convert(operand)? {
                None | Some(QueryCondition::Constant(true)) => return Ok(None),
                Some(QueryCondition::Constant(false)) => {}
                Some(QueryCondition::Group {
                    or: true,
                    reversed: false,
                    conditions: nested,
                }) => conditions.extend(nested),
                Some(condition) => conditions.push(condition),
            }
        }
        Ok(match conditions.len() {
            0 => Some(QueryCondition::Constant(false)),
            1 => conditions.pop(),
            _ => Some(QueryCondition::or(conditions)),
        })
    }
}

fn unsupported(node: &ExpressionNode) -> QueryTranslationError {
    QueryTranslationError::UnsupportedNode(node.to_string())
}

fn literal(value: &ValueNode) -> Option<QueryValue> {
    match value {
        ValueNode::Property(_) => None,
        ValueNode::String(text) => Some(QueryValue::String(text.clone())),
        ValueNode::Boolean(flag) => Some(QueryValue::Boolean(*flag)),
        ValueNode::Date(date) => Some(QueryValue::Date(*date)),
        ValueNode::Reference(reference) => Some(QueryValue::String(serialize(reference))),
    }
}

fn compare(left: &ValueNode, right: &ValueNode, compare_type: CompareType, reversed: bool) -> Converted {
    let node = || match (compare_type, reversed) {
        (CompareType::Equals, true) => ExpressionNode::NotEquals(left.clone(), right.clone()),
        (CompareType::Equals, false) => ExpressionNode::Equals(left.clone(), right.clone()),
        (CompareType::Greater, _) => ExpressionNode::GreaterThan(left.clone(), right.clone()),
        (CompareType::Less, _) => ExpressionNode::LesserThan(left.clone(), right.clone()),
        (CompareType::EndsWith, _) => ExpressionNode::EndsWith(left.clone(), right.clone()),
        _ => ExpressionNode::StartsWith(left.clone(), right.clone()),
    };
    let condition = match (left, right) {
        (ValueNode::Property(_), ValueNode::Property(_)) => return Err(unsupported(&node())),
        (ValueNode::Property(property), value) => QueryCondition::Compare {
            property: property.field().to_string(),
            value: literal(value).ok_or_else(|| unsupported(&node()))?,
            compare_type,
            reversed,
        },
        (value, ValueNode::Property(property)) => QueryCondition::Compare {
            property: property.field().to_string(),
            value: literal(value).ok_or_else(|| unsupported(&node()))?,
            compare_type: compare_type.mirrored().ok_or_else(|| unsupported(&node()))?,
            reversed,
        },
        (left, right) => match (literal(left), literal(right)) {
            (Some(a), Some(b)) => QueryCondition::Constant(compare_type.evaluate(&a, &b) != reversed),
            _ => return Err(unsupported(&node())),
        },
    };
    Ok(Some(condition))
}

/// `%x%` is a contains test, `x%` a prefix test and `%x` a suffix test.
fn like(node: &ExpressionNode, left: &ValueNode, right: &ValueNode) -> Converted {
    let ValueNode::String(pattern) = right else {
        return Err(unsupported(node));
    };
    let (compare_type, text) = match (pattern.strip_prefix('%'), pattern.strip_suffix('%')) {
        (Some(rest), Some(_)) => (CompareType::Contains, rest.strip_suffix('%').unwrap_or(rest)),
        (None, Some(prefix)) => (CompareType::StartsWith, prefix),
        (Some(suffix), None) => (CompareType::EndsWith, suffix),
        _ => (CompareType::Equals, pattern.as_str()),
    };
    let text = ValueNode::String(text.to_string());
    match left {
        ValueNode::Property(_) => compare(left, &text, compare_type, false),
        _ => match (literal(left), literal(&text)) {
            (Some(a), Some(b)) => Ok(Some(QueryCondition::Constant(compare_type.evaluate(&a, &b)))),
            _ => Err(unsupported(node)),
        },
    }
}

fn in_list(node: &ExpressionNode, left: &ValueNode, values: &[ValueNode]) -> Converted {
    let ValueNode::Property(property) = left else {
        return Err(unsupported(node));
    };
    let values = values
        .iter()
        .map(|value| literal(value).ok_or_else(|| unsupported(node)))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Some(QueryCondition::In {
        reversed: false,
        property: property.field().to_string(),
        values,
    }))
}
