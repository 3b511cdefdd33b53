// Query predicates and ordering shared by the gateway adapters and the views.
//
// Responsibilities
// - Evaluate a predicate against a row (in-memory gateway, realtime filters, local reconcile).
// - Render a predicate as PostgREST query parameters (HTTP gateway).
// - Reject malformed predicates as a whole, never apply part of one.

use crate::shared::core::row::{Row, compare_values, values_equal};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    Eq(String, Value),
    Neq(String, Value),
    In(String, Vec<Value>),
    Gte(String, Value),
    Lte(String, Value),
    /// Case-insensitive substring match.
    Ilike(String, String),
    And(Vec<Predicate>),
}

impl Predicate {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Eq(field.into(), value.into())
    }

    pub fn neq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Neq(field.into(), value.into())
    }

    pub fn is_in(field: impl Into<String>, values: Vec<Value>) -> Self {
        Self::In(field.into(), values)
    }

    pub fn gte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Gte(field.into(), value.into())
    }

    pub fn lte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Lte(field.into(), value.into())
    }

    pub fn ilike(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::Ilike(field.into(), pattern.into())
    }

    pub fn and(self, other: Predicate) -> Self {
        match self {
            Self::And(mut parts) => {
                parts.push(other);
                Self::And(parts)
            }
            first => Self::And(vec![first, other]),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        match self {
            Self::Eq(field, _)
            | Self::Neq(field, _)
            | Self::In(field, _)
            | Self::Gte(field, _)
            | Self::Lte(field, _)
            | Self::Ilike(field, _) => {
                if field.trim().is_empty() {
                    Err("predicate field name must not be empty".to_string())
                } else {
                    Ok(())
                }
            }
            Self::And(parts) => parts.iter().try_for_each(Predicate::validate),
        }
    }

    pub fn matches(&self, row: &Row) -> bool {
        let field_value = |field: &str| row.get(field).unwrap_or(&Value::Null);
        match self {
            Self::Eq(field, value) => values_equal(field_value(field), value),
            Self::Neq(field, value) => !values_equal(field_value(field), value),
            Self::In(field, values) => {
                let actual = field_value(field);
                values.iter().any(|candidate| values_equal(actual, candidate))
            }
            Self::Gte(field, value) => {
                let actual = field_value(field);
                !actual.is_null() && compare_values(actual, value) != Ordering::Less
            }
            Self::Lte(field, value) => {
                let actual = field_value(field);
                !actual.is_null() && compare_values(actual, value) != Ordering::Greater
            }
            Self::Ilike(field, pattern) => match field_value(field) {
                Value::String(text) => text.to_lowercase().contains(&pattern.to_lowercase()),
                _ => false,
            },
            Self::And(parts) => parts.iter().all(|part| part.matches(row)),
        }
    }

    /// PostgREST filter parameters, one pair per leaf predicate.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        match self {
            Self::Eq(field, value) => vec![(field.clone(), format!("eq.{}", render(value)))],
            Self::Neq(field, value) => vec![(field.clone(), format!("neq.{}", render(value)))],
            Self::In(field, values) => {
                let joined = values.iter().map(render).collect::<Vec<_>>().join(",");
                vec![(field.clone(), format!("in.({joined})"))]
            }
            Self::Gte(field, value) => vec![(field.clone(), format!("gte.{}", render(value)))],
            Self::Lte(field, value) => vec![(field.clone(), format!("lte.{}", render(value)))],
            Self::Ilike(field, pattern) => vec![(field.clone(), format!("ilike.*{pattern}*"))],
            Self::And(parts) => parts.iter().flat_map(Predicate::to_query_pairs).collect(),
        }
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    pub field: String,
    pub descending: bool,
}

impl OrderBy {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: false,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: true,
        }
    }

    pub fn compare_values(&self, left: &Value, right: &Value) -> Ordering {
        let ordering = compare_values(left, right);
        if self.descending {
            ordering.reverse()
        } else {
            ordering
        }
    }

    pub fn compare(&self, left: &Row, right: &Row) -> Ordering {
        self.compare_values(
            left.get(&self.field).unwrap_or(&Value::Null),
            right.get(&self.field).unwrap_or(&Value::Null),
        )
    }

    /// PostgREST `order` parameter value.
    pub fn to_query_value(&self) -> String {
        let direction = if self.descending { "desc" } else { "asc" };
        format!("{}.{direction}", self.field)
    }
}

/// What a view asks the backend for: filter, order and page size.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuerySpec {
    pub predicate: Option<Predicate>,
    pub order_by: Option<OrderBy>,
    pub limit: Option<usize>,
}

impl QuerySpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.predicate = Some(match self.predicate.take() {
            Some(existing) => existing.and(predicate),
            None => predicate,
        });
        self
    }

    pub fn order_by(mut self, order_by: OrderBy) -> Self {
        self.order_by = Some(order_by);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}
