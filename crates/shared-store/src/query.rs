//! # Queries
//!
//! Field-equality filters and paging options, passed through to the backend
//! untouched. Field names are the entity's JSON field names.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Conjunction of `field == value` conditions. An empty query matches all.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Query {
    conditions: Vec<(String, Value)>,
}

impl Query {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push((field.into(), value.into()));
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn conditions(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.conditions.iter().map(|(f, v)| (f.as_str(), v))
    }

    /// Evaluate against a JSON document.
    #[must_use]
    pub fn matches(&self, doc: &Value) -> bool {
        self.conditions
            .iter()
            .all(|(field, expected)| doc.get(field) == Some(expected))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ListOptions {
    pub skip: usize,
    /// `None` returns every match after `skip`.
    pub limit: Option<usize>,
}

impl ListOptions {
    #[must_use]
    pub fn page(skip: usize, limit: usize) -> Self {
        Self {
            skip,
            limit: Some(limit),
        }
    }
}
