//! The row data trait

use super::Value;

/// A source record the table can read column values from.
///
/// Accessor keys (`ColumnDef::accessor("address.city")`) resolve their first
/// segment through [`field`](RowData::field); later segments walk nested
/// [`Value::Map`]s. Columns built with an accessor function read the record
/// directly and never call `field`.
pub trait RowData: Clone + 'static {
    /// Returns the value stored under `key`, or `None` if there is none.
    fn field(&self, key: &str) -> Option<Value>;
}

impl RowData for serde_json::Value {
    fn field(&self, key: &str) -> Option<Value> {
        self.as_object()
            .and_then(|map| map.get(key))
            .map(Value::from)
    }
}
