//! Sparse field-map to `SET` clause translation.
//!
//! Only column names from a developer-authored [`UpdateColumns`] table are
//! ever written into the statement text. Every value travels as a
//! positional parameter, in the order the fields were supplied.

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UpdateError {
    #[error("No data")]
    NoData,

    #[error("unrecognized field: {0}")]
    UnrecognizedField(String),

    #[error("duplicate field: {0}")]
    DuplicateField(String),

    #[error("Request body must be a JSON object")]
    NotAnObject,
}

/// Which fields of an entity may be updated, and how logical (API) names
/// map to physical column names.
#[derive(Debug, Clone, Copy)]
pub struct UpdateColumns {
    /// Fields whose logical name equals the column name.
    pub columns: &'static [&'static str],
    /// Logical to physical renames.
    pub remap: &'static [(&'static str, &'static str)],
}

impl UpdateColumns {
    pub fn physical_name(&self, field: &str) -> Option<&'static str> {
        self.remap
            .iter()
            .find(|(logical, _)| *logical == field)
            .map(|(_, physical)| *physical)
            .or_else(|| self.columns.iter().find(|c| **c == field).copied())
    }
}

/// Ordered (field, value) pairs describing a partial update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateSpec {
    fields: Vec<(String, Value)>,
}

impl UpdateSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// A repeated field overwrites the earlier value and keeps its position.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        let field = field.into();
        let value = value.into();
        if self.replace(&field, value.clone()).is_none() {
            self.fields.push((field, value));
        }
        self
    }

    /// Keeps the object's key order (serde_json is built with `preserve_order`).
    pub fn from_json(body: Value) -> Result<Self, UpdateError> {
        match body {
            Value::Object(map) => Ok(Self { fields: map.into_iter().collect() }),
            _ => Err(UpdateError::NotAnObject),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.iter().find(|(k, _)| k == field).map(|(_, v)| v)
    }

    /// Swaps a value in place, keeping its position.
    pub fn replace(&mut self, field: &str, value: Value) -> Option<Value> {
        self.fields
            .iter_mut()
            .find(|(k, _)| k == field)
            .map(|(_, v)| std::mem::replace(v, value))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PartialUpdate {
    /// `col1 = $1, col2 = $2, ...`
    pub set_clause: String,
    pub params: Vec<Value>,
}

impl PartialUpdate {
    /// Placeholder for the first parameter after the assignments, used for
    /// the caller's key predicate.
    pub fn next_placeholder(&self) -> String {
        format!("${}", self.params.len() + 1)
    }
}

pub fn sql_for_partial_update(spec: &UpdateSpec, target: &UpdateColumns) -> Result<PartialUpdate, UpdateError> {
    if spec.is_empty() {
        return Err(UpdateError::NoData);
    }

    // Resolve every name before building anything
    let mut columns: Vec<&'static str> = Vec::with_capacity(spec.len());
    for (field, _) in spec.iter() {
        let column = target
            .physical_name(field)
            .ok_or_else(|| UpdateError::UnrecognizedField(field.to_string()))?;
        if columns.contains(&column) {
            return Err(UpdateError::DuplicateField(field.to_string()));
        }
        columns.push(column);
    }

    let set_clause = columns
        .iter()
        .enumerate()
        .map(|(idx, column)| format!("{} = ${}", column, idx + 1))
        .collect::<Vec<_>>()
        .join(", ");
    let params = spec.iter().map(|(_, value)| value.clone()).collect();

    Ok(PartialUpdate { set_clause, params })
}
