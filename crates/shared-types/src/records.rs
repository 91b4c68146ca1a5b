//! # Result Records
//!
//! A result row scraped by a task. Rows are schemaless JSON objects; the only
//! field the cluster interprets is the task-record identifier, which may be
//! promoted to a native [`ObjectId`] before persistence.

use crate::object_id::ObjectId;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Value of a single field in a result row.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Json(Value),
    ObjectId(ObjectId),
}

impl FieldValue {
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Json(Value::String(s)) => Some(s),
            _ => None,
        }
    }

    /// JSON rendering. Native ids use the extended-JSON `{"$oid": ...}` form.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Json(v) => v.clone(),
            Self::ObjectId(id) => {
                let mut map = Map::new();
                map.insert("$oid".to_string(), Value::String(id.to_hex()));
                Value::Object(map)
            }
        }
    }
}

/// One result row.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultRecord(BTreeMap<String, FieldValue>);

impl ResultRecord {
    #[must_use]
    pub fn from_json(map: Map<String, Value>) -> Self {
        Self(
            map.into_iter()
                .map(|(k, v)| (k, FieldValue::Json(v)))
                .collect(),
        )
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.0.get(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: FieldValue) -> Option<FieldValue> {
        self.0.insert(field.into(), value)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.0.iter()
    }

    #[must_use]
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.0
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }
}
