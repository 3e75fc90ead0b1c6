//! Record type for dynamic rows

use std::collections::HashMap;

use serde::Deserialize;
use serde::Serialize;

use super::RowData;
use super::Value;

/// A row of named values, with optional child records.
///
/// `Record` is the ready-made [`RowData`] for callers without a typed row
/// struct. Children are only turned into sub-rows when the table is given a
/// `get_sub_rows` accessor that returns them.
///
/// # Example
///
/// ```
/// use tabula::{Record, Value};
///
/// let parent = Record::new()
///     .with("name", "Team A")
///     .with_children(vec![Record::new().with("name", "Ada")]);
///
/// assert_eq!(parent.get("name"), Some(&Value::from("Team A")));
/// assert_eq!(parent.children().len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    // =========================================================================
    // Data
    // =========================================================================
    /// Field values by name.
    #[serde(flatten)]
    fields: HashMap<String, Value>,

    // =========================================================================
    // Hierarchy
    // =========================================================================
    /// Nested records.
    #[serde(default, skip_serializing_if = "Vec::is_empty", rename = "subRows")]
    children: Vec<Record>,
}

impl Record {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field, builder style.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Sets the nested records, builder style.
    pub fn with_children(mut self, children: Vec<Record>) -> Self {
        self.children = children;
        self
    }

    /// Sets a field.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Returns a field value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Returns the nested records.
    pub fn children(&self) -> &[Record] {
        &self.children
    }

    /// Returns the number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl RowData for Record {
    fn field(&self, key: &str) -> Option<Value> {
        self.fields.get(key).cloned()
    }
}
