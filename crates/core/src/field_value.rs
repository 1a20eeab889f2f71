use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A document body: field name to value.
pub type Document = BTreeMap<String, FieldValue>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FieldValue {
    Null,
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    /// Milliseconds since Unix epoch.
    Timestamp(i64),
}

impl PartialEq for FieldValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a.total_cmp(b).is_eq(),
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::Timestamp(a), Self::Timestamp(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for FieldValue {}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            FieldValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Numeric reading of the value: integers, floats and numeric text.
    /// Never non-finite.
    pub fn as_number(&self) -> Option<f64> {
        let n = match self {
            FieldValue::Integer(n) => *n as f64,
            FieldValue::Float(f) => *f,
            FieldValue::Text(s) => s.trim().parse().ok()?,
            _ => return None,
        };
        n.is_finite().then_some(n)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Integer(n)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Boolean(b)
    }
}

pub fn document_to_msgpack(doc: &Document) -> Result<Vec<u8>, CoreError> {
    rmp_serde::to_vec(doc).map_err(|e| CoreError::Serialization(e.to_string()))
}

pub fn document_from_msgpack(bytes: &[u8]) -> Result<Document, CoreError> {
    rmp_serde::from_slice(bytes).map_err(|e| CoreError::Serialization(e.to_string()))
}
