//! Filter expressions over event properties.
//!
//! Filters describe the events they keep as a small expression tree, built
//! with [`value`]:
//!
//! ```
//! use wikiref_notifications::expression::{value, EventProperty};
//!
//! let expression = value(EventProperty::Type)
//!     .equals(value("update"))
//!     .and(!value(EventProperty::Hidden).equals(value(true)));
//! ```
//!
//! The tree is translated to query conditions by
//! [`ExpressionNodeToEventQueryConverter`](crate::query::ExpressionNodeToEventQueryConverter).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use wikiref_model::{DocumentReference, EntityReference};

use crate::parameters::NotificationFormat;

/// Event properties usable in expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventProperty {
    Id,
    GroupId,
    Stream,
    Date,
    Importance,
    Type,
    Application,
    User,
    Wiki,
    Space,
    Page,
    Hidden,
    Url,
    Title,
    Body,
    DocumentVersion,
}

impl EventProperty {
    /// Name of the stored event field.
    pub fn field(self) -> &'static str {
        match self {
            EventProperty::Id => "id",
            EventProperty::GroupId => "groupId",
            EventProperty::Stream => "stream",
            EventProperty::Date => "date",
            EventProperty::Importance => "importance",
            EventProperty::Type => "type",
            EventProperty::Application => "application",
            EventProperty::User => "user",
            EventProperty::Wiki => "wiki",
            EventProperty::Space => "space",
            EventProperty::Page => "document",
            EventProperty::Hidden => "hidden",
            EventProperty::Url => "url",
            EventProperty::Title => "title",
            EventProperty::Body => "body",
            EventProperty::DocumentVersion => "documentVersion",
        }
    }
}

/// Leaf of an expression.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueNode {
    Property(EventProperty),
    String(String),
    Boolean(bool),
    Date(DateTime<Utc>),
    Reference(EntityReference),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionNode {
    /// No constraint at all.
    Empty,
    And(Box<ExpressionNode>, Box<ExpressionNode>),
    Or(Box<ExpressionNode>, Box<ExpressionNode>),
    Not(Box<ExpressionNode>),
    Equals(ValueNode, ValueNode),
    NotEquals(ValueNode, ValueNode),
    GreaterThan(ValueNode, ValueNode),
    LesserThan(ValueNode, ValueNode),
    StartsWith(ValueNode, ValueNode),
    EndsWith(ValueNode, ValueNode),
    /// SQL-like pattern where `%` matches anything at either end.
    Like(ValueNode, ValueNode),
    In(ValueNode, Vec<ValueNode>),
    /// Events recorded for a user, optionally by read status. With the
    /// email format, only events still waiting to be mailed.
    ForUser {
        user: Option<DocumentReference>,
        read: Option<bool>,
        format: Option<NotificationFormat>,
    },
    Value(ValueNode),
}

/// Start a comparison.
pub fn value(value: impl Into<ValueNode>) -> ValueNode {
    value.into()
}

impl ValueNode {
    pub fn equals(self, other: ValueNode) -> ExpressionNode {
        ExpressionNode::Equals(self, other)
    }

    pub fn not_equals(self, other: ValueNode) -> ExpressionNode {
        ExpressionNode::NotEquals(self, other)
    }

    pub fn greater_than(self, other: ValueNode) -> ExpressionNode {
        ExpressionNode::GreaterThan(self, other)
    }

    pub fn lesser_than(self, other: ValueNode) -> ExpressionNode {
        ExpressionNode::LesserThan(self, other)
    }

    pub fn starts_with(self, other: ValueNode) -> ExpressionNode {
        ExpressionNode::StartsWith(self, other)
    }

    pub fn ends_with(self, other: ValueNode) -> ExpressionNode {
        ExpressionNode::EndsWith(self, other)
    }

    pub fn like(self, other: ValueNode) -> ExpressionNode {
        ExpressionNode::Like(self, other)
    }

    pub fn in_list(self, values: impl IntoIterator<Item = ValueNode>) -> ExpressionNode {
        ExpressionNode::In(self, values.into_iter().collect())
    }
}

impl ExpressionNode {
    pub fn and(self, other: ExpressionNode) -> ExpressionNode {
        ExpressionNode::And(Box::new(self), Box::new(other))
    }

    pub fn or(self, other: ExpressionNode) -> ExpressionNode {
        ExpressionNode::Or(Box::new(self), Box::new(other))
    }

    pub fn for_user(user: Option<DocumentReference>, read: Option<bool>, format: Option<NotificationFormat>) -> Self {
        ExpressionNode::ForUser { user, read, format }
    }
}

impl std::ops::Not for ExpressionNode {
    type Output = ExpressionNode;

    fn not(self) -> ExpressionNode {
        ExpressionNode::Not(Box::new(self))
    }
}

impl From<EventProperty> for ValueNode {
    fn from(property: EventProperty) -> Self {
        ValueNode::Property(property)
    }
}

impl From<&str> for ValueNode {
    fn from(text: &str) -> Self {
        ValueNode::String(text.to_string())
    }
}

impl From<String> for ValueNode {
    fn from(text: String) -> Self {
        ValueNode::String(text)
    }
}

impl From<bool> for ValueNode {
    fn from(flag: bool) -> Self {
        ValueNode::Boolean(flag)
    }
}

impl From<DateTime<Utc>> for ValueNode {
    fn from(date: DateTime<Utc>) -> Self {
        ValueNode::Date(date)
    }
}

impl From<EntityReference> for ValueNode {
    fn from(reference: EntityReference) -> Self {
        ValueNode::Reference(reference)
    }
}

impl From<DocumentReference> for ValueNode {
    fn from(reference: DocumentReference) -> Self {
        ValueNode::Reference(reference.into_inner())
    }
}

impl fmt::Display for ValueNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueNode::Property(property) => write!(f, "{}", property.field()),
            ValueNode::String(text) => write!(f, "\"{text}\""),
            ValueNode::Boolean(flag) => write!(f, "{flag}"),
            ValueNode::Date(date) => write!(f, "{}", date.to_rfc3339()),
            ValueNode::Reference(reference) => write!(f, "{reference}"),
        }
    }
}

impl fmt::Display for ExpressionNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpressionNode::Empty => write!(f, "EMPTY"),
            ExpressionNode::And(left, right) => write!(f, "({left} AND {right})"),
            ExpressionNode::Or(left, right) => write!(f, "({left} OR {right})"),
            ExpressionNode::Not(node) => write!(f, "NOT ({node})"),
            ExpressionNode::Equals(left, right) => write!(f, "{left} = {right}"),
            ExpressionNode::NotEquals(left, right) => write!(f, "{left} <> {right}"),
            ExpressionNode::GreaterThan(left, right) => write!(f, "{left} > {right}"),
            ExpressionNode::LesserThan(left, right) => write!(f, "{left} < {right}"),
            ExpressionNode::StartsWith(left, right) => write!(f, "{left} STARTS WITH {right}"),
            ExpressionNode::EndsWith(left, right) => write!(f, "{left} ENDS WITH {right}"),
            ExpressionNode::Like(left, right) => write!(f, "{left} LIKE {right}"),
            ExpressionNode::In(left, values) => {
                let values: Vec<String> = values.iter().map(ToString::to_string).collect();
                write!(f, "{left} IN ({})", values.join(", "))
            }
            ExpressionNode::ForUser { user, read, format } => {
                write!(f, "FOR USER ")?;
                match user {
                    Some(user) => write!(f, "{user}")?,
                    None => write!(f, "ANY")?,
                }
                if let Some(read) = read {
                    write!(f, " READ {read}")?;
                }
                if let Some(format) = format {
                    write!(f, " FORMAT {format}")?;
                }
                Ok(())
            }
            ExpressionNode::Value(node) => write!(f, "{node}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_names() {
        assert_eq!(EventProperty::Page.field(), "document");
        assert_eq!(EventProperty::GroupId.field(), "groupId");
        assert_eq!(EventProperty::DocumentVersion.field(), "documentVersion");
        assert_eq!(EventProperty::Type.field(), "type");
    }

    #[test]
    fn test_builder() {
        let expression = value(EventProperty::Type)
            .equals(value("update"))
            .and(!value(EventProperty::Hidden).equals(value(true)));
        assert_eq!(
            expression,
            ExpressionNode::And(
                Box::new(ExpressionNode::Equals(
                    ValueNode::Property(EventProperty::Type),
                    ValueNode::String("update".into())
                )),
                Box::new(ExpressionNode::Not(Box::new(ExpressionNode::Equals(
                    ValueNode::Property(EventProperty::Hidden),
                    ValueNode::Boolean(true)
                ))))
            )
        );
    }

    #[test]
    fn test_display() {
        let expression = value(EventProperty::Page)
            .starts_with(value("xwiki:Main."))
            .or(value(EventProperty::Id).in_list([value("1"), value("2")]));
        assert_eq!(
            expression.to_string(),
            "(document STARTS WITH \"xwiki:Main.\" OR id IN (\"1\", \"2\"))"
        );
    }
}
