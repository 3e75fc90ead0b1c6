//! Cells

use std::fmt;
use std::rc::Rc;

use super::Column;
use super::Row;
use super::Table;
use crate::extensions::Extensions;
use crate::model::RowData;
use crate::model::Value;

/// The intersection of a row and a leaf column.
pub struct Cell<T: RowData> {
    /// `"{row_id}_{column_id}"`.
    pub id: String,
    pub row: Rc<Row<T>>,
    pub column: Rc<Column<T>>,
    pub extensions: Extensions,
}

impl<T: RowData> Cell<T> {
    pub(crate) fn new(row: Rc<Row<T>>, column: Rc<Column<T>>) -> Self {
        Self {
            id: format!("{}_{}", row.id, column.id),
            row,
            column,
            extensions: Extensions::new(),
        }
    }

    pub fn value(&self, table: &Table<T>) -> Value {
        self.row.value(table, &self.column.id)
    }

    pub fn render_value(&self, table: &Table<T>) -> Value {
        self.row.render_value(table, &self.column.id)
    }
}

impl<T: RowData> fmt::Debug for Cell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cell").field("id", &self.id).finish_non_exhaustive()
    }
}
